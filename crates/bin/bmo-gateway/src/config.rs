use clap::{ArgAction, Parser, builder::BoolishValueParser};
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use bmo_http::{DEFAULT_MAX_BODY_BYTES, HttpServerConfig};
use bmo_query::mcp::DEFAULT_TOOL_HOST_COMMAND;
use bmo_query::provider::{DEFAULT_MAX_STEPS, DEFAULT_MODEL};

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "bmo-gateway", version, about = "HTTP gateway for bmo assistant queries.")]
struct CliArgs {
    #[arg(long, env = "BMO_HTTP_ADDR", default_value = DEFAULT_HTTP_ADDR)]
    http_addr: SocketAddr,

    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "BMO_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "BMO_MAX_STEPS", default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    #[arg(long, env = "BMO_TOOL_HOST_COMMAND", default_value = DEFAULT_TOOL_HOST_COMMAND)]
    tool_host_command: String,

    /// Argument passed to the tool host; repeat for several.
    #[arg(
        long = "tool-host-arg",
        env = "BMO_TOOL_HOST_ARGS",
        value_delimiter = ' ',
        allow_hyphen_values = true
    )]
    tool_host_args: Vec<String>,

    #[arg(
        long,
        env = "BMO_PROMPT_GUIDANCE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    prompt_guidance: bool,

    #[arg(long, env = "BMO_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    #[arg(long, env = "BMO_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Clone)]
pub struct GatewayConfig {
    pub http: HttpServerConfig,
    pub api_key: Option<String>,
    pub model: String,
    pub max_steps: usize,
    pub tool_host_command: String,
    pub tool_host_args: Vec<String>,
    pub prompt_guidance: bool,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("http", &self.http)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_steps", &self.max_steps)
            .field("tool_host_command", &self.tool_host_command)
            .field("tool_host_args", &self.tool_host_args)
            .field("prompt_guidance", &self.prompt_guidance)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl GatewayConfig {
    pub fn from_args() -> Result<Self, ConfigError> {
        Self::try_from(CliArgs::parse())
    }
}

impl TryFrom<CliArgs> for GatewayConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.max_steps == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_MAX_STEPS",
                value: args.max_steps.to_string(),
            });
        }
        if args.max_body_bytes == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_MAX_BODY_BYTES",
                value: args.max_body_bytes.to_string(),
            });
        }
        let model = args.model.trim().to_string();
        if model.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_MODEL",
                value: args.model,
            });
        }
        let tool_host_command = args.tool_host_command.trim().to_string();
        if tool_host_command.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "BMO_TOOL_HOST_COMMAND",
                value: args.tool_host_command,
            });
        }

        let mut http =
            HttpServerConfig::new(args.http_addr).with_max_body_bytes(args.max_body_bytes);
        if let Some(secs) = args.request_timeout_secs.filter(|secs| *secs > 0) {
            http = http.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http,
            api_key: args.api_key.filter(|key| !key.trim().is_empty()),
            model,
            max_steps: args.max_steps,
            tool_host_command,
            tool_host_args: args
                .tool_host_args
                .into_iter()
                .filter(|arg| !arg.is_empty())
                .collect(),
            prompt_guidance: args.prompt_guidance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<GatewayConfig, ConfigError> {
        let argv = std::iter::once("bmo-gateway").chain(args.iter().copied());
        GatewayConfig::try_from(CliArgs::try_parse_from(argv).expect("arguments parse"))
    }

    #[test]
    fn defaults_match_single_step_gemini_gateway() {
        let config = parse(&[]).expect("config should parse");

        assert_eq!(config.http.addr.port(), 3000);
        assert_eq!(config.http.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.http.request_timeout, None);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_steps, 1);
        assert_eq!(config.tool_host_command, DEFAULT_TOOL_HOST_COMMAND);
        assert!(config.prompt_guidance);
    }

    #[test]
    fn blank_api_key_is_unset() {
        let config = parse(&["--api-key", "   "]).expect("config should parse");

        assert!(config.api_key.is_none());
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let config = parse(&["--api-key", "secret-key"]).expect("config should parse");

        assert_eq!(config.api_key.as_deref(), Some("secret-key"));
        assert!(!format!("{config:?}").contains("secret-key"));
    }

    #[test]
    fn zero_max_steps_is_rejected() {
        let err = parse(&["--max-steps", "0"]).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSetting { name: "BMO_MAX_STEPS", .. }));
    }

    #[test]
    fn tool_host_arguments_are_collected_in_order() {
        let config = parse(&[
            "--tool-host-command",
            "cargo",
            "--tool-host-arg",
            "run",
            "--tool-host-arg",
            "-q",
        ])
        .expect("config should parse");

        assert_eq!(config.tool_host_command, "cargo");
        assert_eq!(config.tool_host_args, vec!["run".to_string(), "-q".to_string()]);
    }

    #[test]
    fn prompt_guidance_can_be_disabled() {
        let config = parse(&["--prompt-guidance", "off"]).expect("config should parse");

        assert!(!config.prompt_guidance);
    }

    #[test]
    fn positive_request_timeout_is_applied() {
        let config = parse(&["--request-timeout-secs", "30"]).expect("config should parse");

        assert_eq!(config.http.request_timeout, Some(Duration::from_secs(30)));
    }
}
