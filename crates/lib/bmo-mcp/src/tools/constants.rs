use bmo_core::{ConstantType, NewConstant, SearchQuery};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{BmoMcp, helpers};

pub const ADD_SUCCESS: &str = "Constant added successfully.";
pub const ADD_FAILURE: &str = "Failed to add constant.";
pub const GET_FAILURE: &str = "Failed to get constants.";
pub const SEARCH_FAILURE: &str = "Failed to search constants.";

/// Parameters for adding a constant.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AddConstantParams {
    /// Title of the constant to add (Turkish), 1-100 characters.
    pub title: String,
    /// English title of the constant, 1-100 characters.
    pub title_en: String,
    /// Type of the constant.
    #[serde(rename = "type")]
    pub kind: ConstantType,
}

/// Parameters for searching constants.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchConstantsParams {
    /// Search query, 1-100 characters.
    pub query: String,
    /// Optional type key to restrict the search to.
    pub filter_type: Option<ConstantType>,
}

#[tool_router(router = tool_router_constants, vis = "pub")]
impl BmoMcp {
    #[tool(
        name = "add-constant",
        description = "Add constants in both english and turkish languages",
        annotations(
            title = "Add Constant",
            read_only_hint = false,
            destructive_hint = false,
            idempotent_hint = false,
            open_world_hint = true
        )
    )]
    async fn add_constant(
        &self,
        Parameters(params): Parameters<AddConstantParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let constant = NewConstant::new(params.title, params.title_en, params.kind)
            .map_err(|err| helpers::invalid_params(&err))?;
        match self.backend().add_constant(&constant).await {
            Ok(reply) => {
                info!(title = %constant.title, kind = %constant.kind, "constant added");
                Ok(helpers::diagnostic_text(ADD_SUCCESS, &reply.diagnostics))
            }
            Err(err) => {
                warn!(error = %err, "add-constant failed");
                Ok(helpers::diagnostic_text(ADD_FAILURE, err.diagnostics()))
            }
        }
    }

    #[tool(
        name = "get-constants",
        description = "Get constants in bmo database",
        annotations(
            title = "Get Constant",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn get_constants(&self) -> Result<CallToolResult, ErrorData> {
        match self.backend().list_constants().await {
            Ok(records) => Ok(CallToolResult::success(vec![Content::json(records)?])),
            Err(err) => {
                warn!(error = %err, "get-constants failed");
                Ok(helpers::diagnostic_text(GET_FAILURE, err.diagnostics()))
            }
        }
    }

    #[tool(
        name = "search-constants",
        description = "Search constants in bmo database by query. The system searches the title, title__en and type fields. The search string can appear anywhere in these fields and type can be given in English or Turkish. Place a double quote at the start of the string to restrict the match to the start of a field, at the end to restrict it to the end, or around the whole string for an exact match. Separate multiple search strings with commas; every string must match for a record to be returned. The type can optionally be filtered with filter_type, which must be one of the type keys: 'bolum','ulke','mevki','saha','ilce','muhesebesebep','egitim','dil'.",
        annotations(
            title = "Search Constant",
            read_only_hint = true,
            destructive_hint = false,
            idempotent_hint = true,
            open_world_hint = true
        )
    )]
    async fn search_constants(
        &self,
        Parameters(params): Parameters<SearchConstantsParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let query = SearchQuery::parse(params.query).map_err(|err| helpers::invalid_params(&err))?;
        match self
            .backend()
            .search_constants(&query, params.filter_type)
            .await
        {
            Ok(records) => Ok(CallToolResult::success(vec![Content::json(records)?])),
            Err(err) => {
                warn!(error = %err, query = query.as_str(), "search-constants failed");
                Ok(helpers::diagnostic_text(SEARCH_FAILURE, err.diagnostics()))
            }
        }
    }
}
