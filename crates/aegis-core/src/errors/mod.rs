//! Per-subsystem error enums under one umbrella `AegisError`.

mod inference_error;
mod store_error;
mod workflow_error;

pub use inference_error::InferenceError;
pub use store_error::StoreError;
pub use workflow_error::WorkflowError;

/// Umbrella error for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum AegisError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("config error: {0}")]
    Config(String),
}

/// Workspace-wide result alias.
pub type AegisResult<T> = Result<T, AegisError>;
