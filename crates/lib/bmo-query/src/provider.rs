//! [`TextGenerator`] backed by the `genai` crate.
//!
//! Provider and model are picked by model name (for example
//! `gemini-2.0-flash` or `gpt-4o-mini`). When an API key is configured it is
//! used for every provider; otherwise `genai` falls back to its per-provider
//! environment variables.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use genai::chat::{ChatMessage, ChatRequest, Tool, ToolCall, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};
use tracing::{debug, info, warn};

use crate::capability::ToolCapability;
use crate::error::QueryError;
use crate::generation::{Generation, GenerationRequest, TextGenerator, ToolOutcome};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_STEPS: usize = 1;

pub struct GenaiGenerator {
    client: Client,
    model: String,
    max_steps: usize,
}

impl GenaiGenerator {
    #[must_use]
    pub fn new(model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: build_client(api_key),
            model: model.into(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Sets how many model turns one generation call may take. Tool calls
    /// requested in the last turn are still executed and recorded.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GenaiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, QueryError> {
        let mut chat = ChatRequest::new(vec![ChatMessage::user(request.prompt.clone())]);
        if !request.tools.is_empty() {
            chat = chat.with_tools(request.tools.iter().map(to_genai_tool).collect::<Vec<_>>());
        }

        let mut generation = Generation::default();
        for step in 0..self.max_steps {
            let response = self
                .client
                .exec_chat(self.model.as_str(), chat.clone(), None)
                .await
                .map_err(|err| QueryError::Generation(err.to_string()))?;

            generation.text = response.first_text().unwrap_or_default().to_string();
            let calls: Vec<ToolCall> = response.tool_calls().into_iter().cloned().collect();
            if calls.is_empty() {
                debug!(step, model = %self.model, "generation finished");
                return Ok(generation);
            }

            chat = chat.append_message(ChatMessage::from(calls.clone()));
            for call in calls {
                let reply = run_tool_call(request, &call, &mut generation).await;
                chat = chat.append_message(ChatMessage::from(ToolResponse::new(
                    call.call_id.clone(),
                    reply,
                )));
            }
        }

        info!(
            max_steps = self.max_steps,
            tool_calls = generation.tool_outcomes.len(),
            "generation stopped at step limit"
        );
        Ok(generation)
    }
}

fn to_genai_tool(capability: &ToolCapability) -> Tool {
    let descriptor = capability.descriptor();
    Tool::new(descriptor.name.clone())
        .with_description(descriptor.description.clone())
        .with_schema(descriptor.input_schema.clone())
}

/// Executes one model tool call and returns the text sent back to the model.
async fn run_tool_call(
    request: &GenerationRequest,
    call: &ToolCall,
    generation: &mut Generation,
) -> String {
    let Some(capability) = request.find_tool(&call.fn_name) else {
        warn!(tool = %call.fn_name, "model requested an unknown tool");
        return format!("Unknown tool: {}", call.fn_name);
    };
    match capability.invoke(call.fn_arguments.clone()).await {
        Ok(result) => {
            let reply = result.model_text();
            generation.tool_outcomes.push(ToolOutcome {
                tool_name: call.fn_name.clone(),
                arguments: call.fn_arguments.clone(),
                result,
            });
            reply
        }
        Err(err) => {
            warn!(tool = %call.fn_name, error = %err, "tool call failed");
            format!("Tool call failed: {err}")
        }
    }
}

fn build_client(api_key: Option<String>) -> Client {
    let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) else {
        return Client::default();
    };
    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<
            Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>,
        > {
            let api_key = api_key.clone();
            Box::pin(async move { Ok(Some(AuthData::from_single(api_key))) })
        },
    );
    Client::builder().with_auth_resolver(auth_resolver).build()
}
