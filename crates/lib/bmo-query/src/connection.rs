//! Process-wide memoized connection to the tool host.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::error::QueryError;
use crate::tool_host::{ToolHost, ToolHostConnector};

/// Single-slot cell holding the outcome of the one connection attempt.
///
/// The first caller runs the connector; concurrent callers wait for that same
/// attempt, and every later caller observes its outcome, including a failure.
pub struct ToolHostConnection {
    connector: Arc<dyn ToolHostConnector>,
    ready: OnceCell<Result<Arc<dyn ToolHost>, QueryError>>,
}

impl ToolHostConnection {
    #[must_use]
    pub fn new(connector: Arc<dyn ToolHostConnector>) -> Self {
        Self {
            connector,
            ready: OnceCell::new(),
        }
    }

    /// Returns the connected host, connecting on first use.
    ///
    /// # Errors
    /// Returns the error of the single connection attempt.
    pub async fn ensure_ready(&self) -> Result<Arc<dyn ToolHost>, QueryError> {
        self.ready
            .get_or_init(|| async {
                info!("connecting to tool host");
                let outcome = self.connector.connect().await;
                match &outcome {
                    Ok(_) => info!("tool host connected"),
                    Err(err) => error!(error = %err, "tool host connection failed"),
                }
                outcome
            })
            .await
            .clone()
    }

    /// True once the connection attempt has finished, successfully or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.ready.initialized()
    }
}
