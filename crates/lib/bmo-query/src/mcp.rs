//! Tool host reached over MCP, spawned as a child process.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParams,
    CallToolResult,
    ClientCapabilities,
    ClientInfo,
    Content,
    Implementation,
    ProtocolVersion,
    Tool,
};
use rmcp::service::RunningService;
use rmcp::transport::TokioChildProcess;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::QueryError;
use crate::tool_host::{ToolContent, ToolDescriptor, ToolHost, ToolHostConnector, ToolResult};

pub const DEFAULT_TOOL_HOST_COMMAND: &str = "bmo-mcpd";

/// Names of everything the tool host advertises besides its tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCatalog {
    pub resources: Vec<String>,
    pub resource_templates: Vec<String>,
    pub prompts: Vec<String>,
}

pub struct McpToolHost {
    client: RunningService<RoleClient, ClientInfo>,
}

impl McpToolHost {
    /// Spawns `program` and completes the MCP handshake over its stdio.
    ///
    /// # Errors
    /// Returns [`QueryError::Connect`] if the process cannot be started or the
    /// handshake fails.
    pub async fn spawn(program: &str, args: &[String]) -> Result<Self, QueryError> {
        let mut command = Command::new(program);
        command.args(args);
        let transport = TokioChildProcess::new(command)
            .map_err(|err| QueryError::Connect(format!("failed to spawn {program}: {err}")))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|err| QueryError::Connect(err.to_string()))?;
        if let Some(peer) = client.peer_info() {
            info!(
                server = %peer.server_info.name,
                version = %peer.server_info.version,
                "tool host initialized"
            );
        }
        Ok(Self { client })
    }

    /// Lists resources, resource templates and prompts.
    ///
    /// # Errors
    /// Returns [`QueryError::ToolHost`] when any of the listings fails.
    pub async fn catalog_summary(&self) -> Result<HostCatalog, QueryError> {
        let resources = self
            .client
            .list_resources(None)
            .await
            .map_err(host_error)?
            .resources;
        let resource_templates = self
            .client
            .list_resource_templates(None)
            .await
            .map_err(host_error)?
            .resource_templates;
        let prompts = self
            .client
            .list_prompts(None)
            .await
            .map_err(host_error)?
            .prompts;

        Ok(HostCatalog {
            resources: resources.iter().map(|resource| resource.uri.clone()).collect(),
            resource_templates: resource_templates
                .iter()
                .map(|template| template.uri_template.clone())
                .collect(),
            prompts: prompts.iter().map(|prompt| prompt.name.clone()).collect(),
        })
    }
}

#[async_trait]
impl ToolHost for McpToolHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, QueryError> {
        let tools = self
            .client
            .list_tools(None)
            .await
            .map_err(host_error)?
            .tools;
        Ok(tools.iter().map(descriptor_from_tool).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, QueryError> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };
        let result = self.client.call_tool(params).await.map_err(host_error)?;
        debug!(tool = name, parts = result.content.len(), "tool host replied");
        Ok(result_from_call(&result))
    }
}

/// Connects by spawning the tool host binary.
#[derive(Debug, Clone)]
pub struct ChildProcessConnector {
    program: String,
    args: Vec<String>,
}

impl ChildProcessConnector {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for ChildProcessConnector {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_HOST_COMMAND, Vec::new())
    }
}

#[async_trait]
impl ToolHostConnector for ChildProcessConnector {
    async fn connect(&self) -> Result<Arc<dyn ToolHost>, QueryError> {
        info!(program = %self.program, args = ?self.args, "spawning tool host");
        let host = McpToolHost::spawn(&self.program, &self.args).await?;
        let catalog = host.catalog_summary().await?;
        info!(
            resources = ?catalog.resources,
            resource_templates = ?catalog.resource_templates,
            prompts = ?catalog.prompts,
            "tool host catalog"
        );
        Ok(Arc::new(host))
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: ProtocolVersion::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "bmo-query".to_string(),
            title: Some("bmo-assistant query handler".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

fn host_error(err: impl std::fmt::Display) -> QueryError {
    QueryError::ToolHost(err.to_string())
}

fn descriptor_from_tool(tool: &Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.as_deref().unwrap_or_default().to_string(),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}

fn content_from_part(part: &Content) -> ToolContent {
    part.as_text().map_or_else(
        || ToolContent::Other {
            value: serde_json::to_value(part).unwrap_or(Value::Null),
        },
        |text| ToolContent::Text {
            text: text.text.clone(),
            mime_type: None,
        },
    )
}

fn result_from_call(result: &CallToolResult) -> ToolResult {
    ToolResult {
        content: result.content.iter().map(content_from_part).collect(),
        is_error: result.is_error.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tool_becomes_descriptor() {
        let schema = json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"],
        });
        let Value::Object(schema) = schema.clone() else {
            unreachable!()
        };
        let tool = Tool::new("search-constants", "Search constants", Arc::new(schema));

        let descriptor = descriptor_from_tool(&tool);

        assert_eq!(descriptor.name, "search-constants");
        assert_eq!(descriptor.description, "Search constants");
        assert_eq!(descriptor.input_schema["required"][0], "query");
    }

    #[test]
    fn call_result_keeps_part_order_and_error_flag() {
        let mut result = CallToolResult::success(vec![
            Content::text("[{\"title\":\"Almanca\"}]"),
            Content::image("aGk=", "image/png"),
        ]);
        result.is_error = Some(true);

        let converted = result_from_call(&result);

        assert!(converted.is_error);
        assert_eq!(converted.first_text(), Some("[{\"title\":\"Almanca\"}]"));
        match &converted.content[1] {
            ToolContent::Other { value } => assert_eq!(value["mimeType"], "image/png"),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_connect_error() {
        let connector = ChildProcessConnector::new("bmo-mcpd-does-not-exist", Vec::new());

        let err = match connector.connect().await {
            Ok(_) => panic!("connecting to a missing binary succeeded"),
            Err(err) => err,
        };

        assert!(matches!(err, QueryError::Connect(_)));
    }
}
