/// Store-layer errors (document, graph, and vector backends).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("graph write failed: {reason}")]
    GraphWrite { reason: String },

    #[error("vector write failed: {reason}")]
    VectorWrite { reason: String },
}
