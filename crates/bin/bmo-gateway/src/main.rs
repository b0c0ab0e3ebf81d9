//! Gateway entry point for bmo-assistant.
//!
//! Spawns the MCP tool host on first use and answers `POST /api/mcp` queries
//! through the configured model.

mod config;

use std::sync::Arc;

use bmo_core::observability::init_tracing;
use bmo_http::HttpServer;
use bmo_query::mcp::ChildProcessConnector;
use bmo_query::provider::GenaiGenerator;
use bmo_query::{QueryHandler, QueryHandlerConfig, ToolHostConnection};
use tracing::info;

use crate::config::GatewayConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let config = GatewayConfig::from_args()?;
    info!(
        model = %config.model,
        max_steps = config.max_steps,
        tool_host = %config.tool_host_command,
        "bmo-gateway starting"
    );

    let connector = Arc::new(ChildProcessConnector::new(
        config.tool_host_command,
        config.tool_host_args,
    ));
    let connection = Arc::new(ToolHostConnection::new(connector));
    let generator = Arc::new(
        GenaiGenerator::new(config.model, config.api_key).with_max_steps(config.max_steps),
    );
    let handler = QueryHandler::with_config(
        connection,
        generator,
        QueryHandlerConfig {
            prompt_guidance: config.prompt_guidance,
        },
    );

    HttpServer::new(Arc::new(handler), config.http).serve().await
}
