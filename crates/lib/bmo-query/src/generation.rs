//! Provider-agnostic text generation.

use async_trait::async_trait;
use serde_json::Value;

use crate::capability::ToolCapability;
use crate::error::QueryError;
use crate::tool_host::ToolResult;

/// One generation call: a prompt plus the tools the model may invoke.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub tools: Vec<ToolCapability>,
}

impl GenerationRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tools: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolCapability>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn find_tool(&self, name: &str) -> Option<&ToolCapability> {
        self.tools.iter().find(|tool| tool.name() == name)
    }
}

/// A tool call executed during generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub arguments: Value,
    pub result: ToolResult,
}

/// Final text of a generation call and the tool calls it made on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: String,
    pub tool_outcomes: Vec<ToolOutcome>,
}

/// A text-generation backend.
///
/// Implementations own the tool round-trips: when the model asks for a tool,
/// the matching capability in the request is invoked and its result handed
/// back to the model before the call returns.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, QueryError>;
}
