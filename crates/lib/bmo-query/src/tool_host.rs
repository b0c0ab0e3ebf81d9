//! Client-side view of the tool host.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// Metadata advertised for one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One typed part of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text {
        text: String,
        #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    Other {
        value: Value,
    },
}

/// Ordered content returned by a tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: text.into(),
                mime_type: None,
            }],
            is_error: false,
        }
    }

    /// Text of the first content part, when that part is non-empty text.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ToolContent::Text { text, .. }) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// The first text part, or the whole result as pretty JSON.
    #[must_use]
    pub fn raw_output(&self) -> String {
        self.first_text().map_or_else(
            || serde_json::to_string_pretty(self).unwrap_or_default(),
            str::to_string,
        )
    }

    /// Text handed back to the model: all text parts joined, or JSON when
    /// there are none.
    #[must_use]
    pub fn model_text(&self) -> String {
        let texts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|part| match part {
                ToolContent::Text { text, .. } => Some(text.as_str()),
                ToolContent::Other { .. } => None,
            })
            .collect();
        if texts.is_empty() {
            serde_json::to_string(self).unwrap_or_default()
        } else {
            texts.join("\n")
        }
    }
}

/// A connected tool host.
#[async_trait]
pub trait ToolHost: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, QueryError>;

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, QueryError>;
}

/// Establishes the channel to a tool host.
#[async_trait]
pub trait ToolHostConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ToolHost>, QueryError>;
}
