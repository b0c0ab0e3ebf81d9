use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::capability::capabilities;
use crate::connection::ToolHostConnection;
use crate::error::QueryError;
use crate::generation::{GenerationRequest, TextGenerator};

/// Returned when the model produced no text and called no tool.
pub const NO_TEXT_FALLBACK: &str = "No text generated.";

/// Appended to every query when prompt guidance is enabled.
pub const TOOL_GUIDANCE: &str = "When using tools:
- Interpret JSON results returned by tools.
- Convert any structured JSON results into a clean, human-readable paragraph (or a few short paragraphs).
- Never return raw JSON unless explicitly asked to do so.
- If you call a tool and it returns data, produce a short summary explaining the key points and any recommended next steps.";

/// Leads the formatting prompt that rewrites raw tool output as prose.
pub const FORMAT_INSTRUCTION: &str = "I was given the following tool output (likely JSON or structured data). Please convert it into a short, clear, human-readable explanation in paragraph form. Do NOT return raw JSON. If some fields look like identifiers, explain them briefly.";

#[must_use]
pub fn build_prompt(query: &str, guidance: bool) -> String {
    if guidance {
        format!("{}\n\n{TOOL_GUIDANCE}", query.trim())
    } else {
        query.to_string()
    }
}

#[must_use]
pub fn format_prompt(raw_output: &str) -> String {
    format!("{FORMAT_INSTRUCTION}\n\nTool output:\n{}", raw_output.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryHandlerConfig {
    pub prompt_guidance: bool,
}

impl Default for QueryHandlerConfig {
    fn default() -> Self {
        Self {
            prompt_guidance: true,
        }
    }
}

/// Answers natural-language queries with the tool host's tools available to
/// the model.
pub struct QueryHandler {
    connection: Arc<ToolHostConnection>,
    generator: Arc<dyn TextGenerator>,
    config: QueryHandlerConfig,
}

impl QueryHandler {
    #[must_use]
    pub fn new(connection: Arc<ToolHostConnection>, generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_config(connection, generator, QueryHandlerConfig::default())
    }

    #[must_use]
    pub fn with_config(
        connection: Arc<ToolHostConnection>,
        generator: Arc<dyn TextGenerator>,
        config: QueryHandlerConfig,
    ) -> Self {
        Self {
            connection,
            generator,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> QueryHandlerConfig {
        self.config
    }

    /// Answers one query.
    ///
    /// Model text is returned unchanged when present. Otherwise the first tool
    /// result is rewritten as prose by a second, tool-less generation call,
    /// falling back to the raw tool output if that call fails or comes back
    /// empty.
    ///
    /// # Errors
    /// Returns an error when the tool host cannot be reached, its catalog
    /// cannot be listed, or the main generation call fails.
    pub async fn answer(&self, query: &str) -> Result<String, QueryError> {
        let host = self.connection.ensure_ready().await?;
        let descriptors = host.list_tools().await?;
        info!(
            tools = ?descriptors.iter().map(|tool| tool.name.as_str()).collect::<Vec<_>>(),
            "loaded tools"
        );

        let request = GenerationRequest::new(build_prompt(query, self.config.prompt_guidance))
            .with_tools(capabilities(descriptors, &host));
        let generation = self.generator.generate(&request).await?;
        debug!(
            text = %generation.text,
            tool_calls = generation.tool_outcomes.len(),
            "generation returned"
        );

        if !generation.text.trim().is_empty() {
            return Ok(generation.text);
        }

        match generation.tool_outcomes.first() {
            Some(outcome) => Ok(self.format_tool_output(&outcome.result.raw_output()).await),
            None => Ok(NO_TEXT_FALLBACK.to_string()),
        }
    }

    async fn format_tool_output(&self, raw_output: &str) -> String {
        let request = GenerationRequest::new(format_prompt(raw_output));
        match self.generator.generate(&request).await {
            Ok(formatted) if !formatted.text.trim().is_empty() => formatted.text,
            Ok(_) => raw_output.to_string(),
            Err(err) => {
                warn!(error = %err, "formatting fallback failed");
                raw_output.to_string()
            }
        }
    }
}
