/// Workflow state-machine errors.
///
/// These are the user-visible "not found" conditions, kept distinct from
/// locally-recovered source failures, plus genuine sequencing bugs.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("risk not found: {risk_id}")]
    RiskNotFound { risk_id: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("session {session_id} was already resolved")]
    SessionAlreadyResolved { session_id: String },

    #[error("invalid transition from {state}")]
    InvalidTransition { state: String },
}
