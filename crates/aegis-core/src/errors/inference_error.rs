/// Completion/embedding provider errors.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("provider {provider} unavailable")]
    ProviderUnavailable { provider: String },

    #[error("request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("malformed provider response: {reason}")]
    MalformedResponse { reason: String },
}
