//! Daemon entry point for the bmo MCP server.
//!
//! Loads configuration from the environment and serves the MCP protocol over
//! stdio, streamable HTTP, or both.

mod config;

use bmo_core::BackendClient;
use bmo_core::observability::init_tracing;
use bmo_mcp::BmoMcp;
use bmo_mcp::server::{serve_stdio, serve_streamable_http};
use tracing::{error, info};

use crate::config::McpdConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let config = McpdConfig::from_args()?;
    info!(backend = %config.backend.base_url, "bmo-mcpd starting");
    let service = BmoMcp::new(BackendClient::new(config.backend));

    let http = config.mcp_serve.then(|| {
        let service = service.clone();
        let http_config = config.mcp_http;
        tokio::spawn(async move {
            if let Err(err) = serve_streamable_http(service, http_config).await {
                error!(error = %err, "streamable HTTP server stopped");
            }
        })
    });

    if config.enable_stdio {
        serve_stdio(service).await?;
    } else if let Some(http) = http {
        http.await?;
    }
    Ok(())
}
