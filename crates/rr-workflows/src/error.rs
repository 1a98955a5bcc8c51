//! Workflow error type

use thiserror::Error;

use rr_core::StoreError;

/// Failures surfaced by stage workflows
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Underlying store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input did not meet a stage prerequisite
    #[error("{0}")]
    Validation(String),

    /// The AI call failed or returned unusable output
    #[error("AI call failed: {0}")]
    Ai(String),
}

impl WorkflowError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
