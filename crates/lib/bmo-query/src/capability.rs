use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::QueryError;
use crate::tool_host::{ToolDescriptor, ToolHost, ToolResult};

/// A tool descriptor bound to the host that executes it.
#[derive(Clone)]
pub struct ToolCapability {
    descriptor: ToolDescriptor,
    host: Arc<dyn ToolHost>,
}

impl ToolCapability {
    #[must_use]
    pub fn new(descriptor: ToolDescriptor, host: Arc<dyn ToolHost>) -> Self {
        Self { descriptor, host }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub const fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// Forwards the call verbatim to the tool host.
    ///
    /// # Errors
    /// Returns the host's error when the call cannot be delivered.
    pub async fn invoke(&self, arguments: Value) -> Result<ToolResult, QueryError> {
        info!(tool = self.name(), %arguments, "tool called");
        self.host.call_tool(self.name(), arguments).await
    }
}

impl fmt::Debug for ToolCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolCapability")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Binds every descriptor in a catalog to the same host.
#[must_use]
pub fn capabilities(descriptors: Vec<ToolDescriptor>, host: &Arc<dyn ToolHost>) -> Vec<ToolCapability> {
    descriptors
        .into_iter()
        .map(|descriptor| ToolCapability::new(descriptor, host.clone()))
        .collect()
}
