//! Query handler for bmo-assistant.
//!
//! Turns one natural-language query into one natural-language answer. The
//! handler connects to the tool host once per process, exposes the host's
//! tool catalog to a text generator as invocable capabilities, and falls back
//! to a formatting pass over raw tool output when the model returns no text.

mod capability;
mod connection;
mod error;
mod generation;
mod handler;
pub mod mcp;
pub mod provider;
mod tool_host;
#[cfg(test)]
mod test_support;

pub use capability::{ToolCapability, capabilities};
pub use connection::ToolHostConnection;
pub use error::QueryError;
pub use generation::{Generation, GenerationRequest, TextGenerator, ToolOutcome};
pub use handler::{
    FORMAT_INSTRUCTION,
    NO_TEXT_FALLBACK,
    QueryHandler,
    QueryHandlerConfig,
    TOOL_GUIDANCE,
    build_prompt,
    format_prompt,
};
pub use tool_host::{ToolContent, ToolDescriptor, ToolHost, ToolHostConnector, ToolResult};
