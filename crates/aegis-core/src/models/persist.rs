use serde::{Deserialize, Serialize};

/// A recorded write failure for one control in one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlWriteFailure {
    pub control_id: String,
    pub reason: String,
}

/// Outcome of a multi-store persistence run.
///
/// The document store is authoritative: a document failure means the
/// control is not confirmed. Graph and vector failures are enrichment
/// losses — recorded, never fatal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistReport {
    /// Controls with a canonical document-store record.
    pub stored: usize,
    pub document_failures: Vec<ControlWriteFailure>,
    pub graph_failures: Vec<ControlWriteFailure>,
    pub vector_failures: Vec<ControlWriteFailure>,
}

impl PersistReport {
    pub fn fully_clean(&self) -> bool {
        self.document_failures.is_empty()
            && self.graph_failures.is_empty()
            && self.vector_failures.is_empty()
    }
}
