//! Read-only constant resources.
//!
//! `constants://all` serves the full dump and the `constants://by-query/{query}`
//! template serves a search. The `{query}` segment is percent-decoded once
//! before it reaches the backend. Backend failures are returned as readable
//! text contents rather than protocol errors.

use bmo_core::{BackendError, CsvRecord, SearchQuery};
use percent_encoding::percent_decode_str;
use rmcp::ErrorData;
use rmcp::model::{
    AnnotateAble,
    ErrorCode,
    RawResource,
    RawResourceTemplate,
    ReadResourceResult,
    Resource,
    ResourceContents,
    ResourceTemplate,
};
use tracing::warn;

use crate::{BmoMcp, helpers};

pub const ALL_CONSTANTS_URI: &str = "constants://all";
pub const BY_QUERY_PREFIX: &str = "constants://by-query/";
pub const BY_QUERY_TEMPLATE: &str = "constants://by-query/{query}";

const JSON_MIME: &str = "application/json";
const TEXT_MIME: &str = "text/plain";
const STATUS_FAILURE: &str = "Failed to get constants. Please try again.";

/// Resources addressable by a fixed URI.
pub fn static_resources() -> Vec<Resource> {
    vec![
        RawResource {
            title: Some("BMO Constants".to_string()),
            description: Some("Get all constants from the BMO system database".to_string()),
            mime_type: Some(JSON_MIME.to_string()),
            ..RawResource::new(ALL_CONSTANTS_URI, "constants")
        }
        .no_annotation(),
    ]
}

/// Resources addressed through a URI template.
pub fn resource_templates() -> Vec<ResourceTemplate> {
    vec![
        RawResourceTemplate {
            uri_template: BY_QUERY_TEMPLATE.to_string(),
            name: "constants-by-query".to_string(),
            title: Some("BMO Constants By Query".to_string()),
            description: Some(
                "Get constants from the BMO system database by making a search with a given query"
                    .to_string(),
            ),
            mime_type: Some(JSON_MIME.to_string()),
            icons: None,
        }
        .no_annotation(),
    ]
}

/// A resource URI resolved against the known resources.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConstantsResource<'a> {
    All,
    ByQuery(&'a str),
}

impl<'a> ConstantsResource<'a> {
    fn from_uri(uri: &'a str) -> Option<Self> {
        if uri == ALL_CONSTANTS_URI {
            return Some(Self::All);
        }
        uri.strip_prefix(BY_QUERY_PREFIX)
            .filter(|query| !query.is_empty())
            .map(Self::ByQuery)
    }
}

impl BmoMcp {
    pub(crate) async fn read_constants_resource(
        &self,
        uri: &str,
    ) -> Result<ReadResourceResult, ErrorData> {
        let Some(resource) = ConstantsResource::from_uri(uri) else {
            return Err(helpers::mcp_err(
                ErrorCode::RESOURCE_NOT_FOUND,
                format!("unknown resource: {uri}"),
            ));
        };

        let fetched = match resource {
            ConstantsResource::All => self.backend().list_constants().await,
            ConstantsResource::ByQuery(segment) => {
                let raw = percent_decode_str(segment)
                    .decode_utf8()
                    .map_err(|err| helpers::invalid_params(&err))?;
                let query = SearchQuery::parse(raw.into_owned())
                    .map_err(|err| helpers::invalid_params(&err))?;
                self.backend().search_constants(&query, None).await
            }
        };

        let (text, mime) = match fetched {
            Ok(records) => (records_json(&records)?, JSON_MIME),
            Err(err) => {
                warn!(error = %err, uri, "constants resource read failed");
                (failure_text(&err), TEXT_MIME)
            }
        };
        Ok(ReadResourceResult {
            contents: vec![text_contents(text, uri, mime)],
        })
    }
}

fn text_contents(text: String, uri: &str, mime: &str) -> ResourceContents {
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(mime.to_string());
    }
    contents
}

fn records_json(records: &[CsvRecord]) -> Result<String, ErrorData> {
    serde_json::to_string(records)
        .map_err(|err| helpers::mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()))
}

fn failure_text(err: &BackendError) -> String {
    match err {
        BackendError::Status { .. } => STATUS_FAILURE.to_string(),
        BackendError::Transport(_) => format!("Error occurred: {err}"),
    }
}
