use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use bmo_core::BackendConfig;
use bmo_core::backend::{DEFAULT_BASE_URL, DEFAULT_LOGIN_ID};
use bmo_mcp::server::{DEFAULT_SSE_KEEP_ALIVE, DEFAULT_SSE_RETRY, McpHttpServerConfig};

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";

#[derive(Parser, Debug)]
#[command(name = "bmo-mcpd", version, about = "MCP daemon for the bmo constants backend.")]
struct CliArgs {
    #[arg(long, env = "BMO_BACKEND_URL", default_value = DEFAULT_BASE_URL)]
    backend_url: String,

    #[arg(long, env = "BMO_LOGIN_ID", default_value = DEFAULT_LOGIN_ID)]
    login_id: String,

    #[arg(
        long = "stdio",
        env = "BMO_ENABLE_STDIO",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "BMO_MCP_SERVE",
        default_value_t = false,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "BMO_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "BMO_MCP_STATEFUL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateful: bool,

    /// Seconds between SSE keep-alive pings; 0 disables them.
    #[arg(
        long,
        env = "BMO_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE.as_secs()
    )]
    mcp_sse_keep_alive_secs: u64,

    /// Reconnect delay hinted to SSE clients, in seconds; 0 omits the hint.
    #[arg(
        long,
        env = "BMO_MCP_SSE_RETRY_SECS",
        default_value_t = DEFAULT_SSE_RETRY.as_secs()
    )]
    mcp_sse_retry_secs: u64,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct McpdConfig {
    pub backend: BackendConfig,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http: McpHttpServerConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    NoTransport,
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTransport => {
                write!(f, "no transport enabled: set BMO_ENABLE_STDIO or BMO_MCP_SERVE")
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl McpdConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::try_from(CliArgs::parse())
    }
}

impl TryFrom<CliArgs> for McpdConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let backend_url = args.backend_url.trim().trim_end_matches('/').to_string();
        if !(backend_url.starts_with("http://") || backend_url.starts_with("https://")) {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_BACKEND_URL",
                value: args.backend_url,
            });
        }
        let login_id = args.login_id.trim().to_string();
        if login_id.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_LOGIN_ID",
                value: args.login_id,
            });
        }
        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::NoTransport);
        }

        let mcp_http = McpHttpServerConfig::new(args.mcp_http_addr)
            .with_stateful_mode(args.mcp_stateful)
            .with_sse_keep_alive(seconds(args.mcp_sse_keep_alive_secs))
            .with_sse_retry(seconds(args.mcp_sse_retry_secs));

        Ok(Self {
            backend: BackendConfig::new(backend_url).with_login_id(login_id),
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http,
        })
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}
