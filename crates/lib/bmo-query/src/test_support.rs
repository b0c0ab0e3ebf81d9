use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::QueryError;
use crate::generation::{Generation, GenerationRequest, TextGenerator};
use crate::tool_host::{ToolDescriptor, ToolHost, ToolHostConnector, ToolResult};

pub fn descriptor(name: &str, description: &str) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({"type": "object", "properties": {}}),
    }
}

/// In-memory tool host that records every call.
pub struct FakeHost {
    pub tools: Vec<ToolDescriptor>,
    result: Result<ToolResult, QueryError>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::with_result(ToolResult::text("ok"))
    }
}

impl FakeHost {
    pub fn with_result(result: ToolResult) -> Self {
        Self {
            tools: vec![
                descriptor("get-constants", "Get constants in bmo database"),
                descriptor("search-constants", "Search constants in bmo database"),
            ],
            result: Ok(result),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_calls(message: &str) -> Self {
        Self {
            result: Err(QueryError::ToolHost(message.to_string())),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolHost for FakeHost {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, QueryError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolResult, QueryError> {
        self.calls.lock().unwrap().push((name.to_string(), arguments));
        self.result.clone()
    }
}

/// Connector that counts attempts and yields long enough for callers to overlap.
pub struct FakeConnector {
    outcome: Result<Arc<FakeHost>, QueryError>,
    attempts: AtomicUsize,
}

impl FakeConnector {
    pub fn new(host: FakeHost) -> Self {
        Self::with_host(Arc::new(host))
    }

    pub fn with_host(host: Arc<FakeHost>) -> Self {
        Self {
            outcome: Ok(host),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(QueryError::Connect(message.to_string())),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolHostConnector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn ToolHost>, QueryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        match &self.outcome {
            Ok(host) => Ok(host.clone() as Arc<dyn ToolHost>),
            Err(err) => Err(err.clone()),
        }
    }
}

/// Replays queued generations and records each request it receives.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<Generation, QueryError>>>,
    prompts: Mutex<Vec<String>>,
    tool_names: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Result<Generation, QueryError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn tool_names(&self) -> Vec<Vec<String>> {
        self.tool_names.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, QueryError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.tool_names
            .lock()
            .unwrap()
            .push(request.tools.iter().map(|tool| tool.name().to_string()).collect());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Generation::default()))
    }
}
