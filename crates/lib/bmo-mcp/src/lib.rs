//! MCP server implementation for the BMO constants backend.
//!
//! This crate wires the backend client into rmcp tool, resource, and prompt
//! handlers and exposes the runners that serve them over stdio or streamable
//! HTTP.

mod helpers;
mod prompts;
mod resources;
mod tools;
pub mod server;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use bmo_core::BackendClient;
use rmcp::{
    ErrorData,
    RoleServer,
    ServerHandler,
    handler::server::router::prompt::PromptRouter,
    handler::server::tool::ToolRouter,
    prompt_handler,
    service::RequestContext,
    tool_handler,
};
use rmcp::model::{
    GetPromptRequestParams,
    GetPromptResult,
    Implementation,
    ListPromptsResult,
    ListResourceTemplatesResult,
    ListResourcesResult,
    PaginatedRequestParams,
    ReadResourceRequestParams,
    ReadResourceResult,
    ServerCapabilities,
    ServerInfo,
};

pub use prompts::{GenerateValuesArgs, generate_values_text};
pub use resources::{ALL_CONSTANTS_URI, BY_QUERY_TEMPLATE};
pub use tools::constants::{AddConstantParams, SearchConstantsParams};

const SERVER_INSTRUCTIONS: &str = r"bmo-mcp exposes the constants kept in the BMO system database.

Tools:
- `get-constants` lists every constant as JSON records (title, title__en, type, ...).
- `search-constants` searches title, title__en and type. A leading double quote anchors a term to the
  start of a field, a trailing one anchors it to the end, and quotes on both ends demand an exact match.
  Separate terms with commas; every term must match. `filter_type` restricts the search to one type key.
- `add-constant` adds a constant with a Turkish `title`, an English `title_en` and a `type`.

Type keys: bolum, dil, mevki, saha, ilce, muhesebesebep, ulke, egitim.

Resources: `constants://all` and `constants://by-query/{query}`.
Prompt: `generate-constant-values` asks for bilingual sample values for a type.

Backend failures are reported as text results, never as tool errors.";

/// MCP server wrapper around the BMO backend client and its routers.
#[derive(Clone)]
pub struct BmoMcp {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    backend: Arc<BackendClient>,
}

impl BmoMcp {
    /// Creates a new server owning the backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    /// Creates a new server using a shared backend client.
    #[must_use]
    pub fn with_backend(backend: Arc<BackendClient>) -> Self {
        Self {
            tool_router: Self::tool_router_constants(),
            prompt_router: Self::prompt_router(),
            backend,
        }
    }

    pub(crate) fn backend(&self) -> &BackendClient {
        &self.backend
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for BmoMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(
            resources::static_resources(),
        ))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(
            resources::resource_templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.read_constants_resource(&request.uri).await
    }
}
