//! MCP server runners for bmo-mcp.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::BmoMcp;

pub const DEFAULT_MCP_HTTP_ADDR: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4020);
pub const DEFAULT_SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);
pub const DEFAULT_SSE_RETRY: Duration = Duration::from_secs(3);

/// Streamable HTTP settings. `None` durations disable the SSE keep-alive
/// pings or the client retry hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(DEFAULT_SSE_KEEP_ALIVE),
            sse_retry: Some(DEFAULT_SSE_RETRY),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }

    fn transport_config(&self) -> StreamableHttpServerConfig {
        StreamableHttpServerConfig {
            sse_keep_alive: self.sse_keep_alive,
            sse_retry: self.sse_retry,
            stateful_mode: self.stateful_mode,
            ..Default::default()
        }
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MCP_HTTP_ADDR)
    }
}

/// Serves `service` over stdio until the peer disconnects.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(service: BmoMcp) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("bmo-mcp serving on stdio");
    let running = serve_server(service, stdio()).await?;
    let reason = running.waiting().await?;
    info!(?reason, "stdio peer disconnected");
    Ok(())
}

/// Router with `/health` and the MCP endpoint at `/mcp`. Every session gets
/// a clone of `service`, so they all share its backend client.
#[must_use]
pub fn streamable_http_router(service: BmoMcp, config: &McpHttpServerConfig) -> Router {
    let mcp: StreamableHttpService<BmoMcp, LocalSessionManager> = StreamableHttpService::new(
        move || Ok(service.clone()),
        Arc::new(LocalSessionManager::default()),
        config.transport_config(),
    );
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp)
}

/// Serves `service` over streamable HTTP until the listener fails.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    service: BmoMcp,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = streamable_http_router(service, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(
        stateful = config.stateful_mode,
        "bmo-mcp listening on http://{}/mcp", config.addr
    );
    axum::serve(listener, app).await?;
    Ok(())
}
