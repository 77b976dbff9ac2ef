//! Pipeline error types.
//!
//! Stage implementations report failures as plain strings (the trait-layer
//! convention); the orchestrator wraps them with the stage name before they
//! reach the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {message}")]
    Stage { stage: &'static str, message: String },
}

impl PipelineError {
    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// Result type alias for orchestrator operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
