//! Wait error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can end a wait
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Timed out after {timeout:?} waiting for event '{event}'")]
    Timeout { event: String, timeout: Duration },

    #[error("Check for event '{event}' failed: {source}")]
    Predicate {
        event: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Setup misuse: {0}")]
    Misuse(String),

    #[error("Wait slot for event '{event}' was dropped by the registry")]
    Closed { event: String },

    #[error("Invalid event payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(eyre::Report),
}

/// Result alias for wait operations
pub type WaitResult<T> = Result<T, WaitError>;

impl WaitError {
    /// Check if this is a deadline error
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    /// Name of the event the failed wait was for, if any
    pub fn event(&self) -> Option<&str> {
        match self {
            WaitError::Timeout { event, .. } | WaitError::Predicate { event, .. } | WaitError::Closed { event } => {
                Some(event)
            }
            WaitError::Misuse(_) | WaitError::InvalidPayload(_) | WaitError::Config(_) => None,
        }
    }
}
