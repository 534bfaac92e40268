use serde::{Deserialize, Serialize};

use super::control::CandidateControl;

/// The workflow's reply to its caller. No wire format is mandated beyond
/// this structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowReply {
    pub final_response: String,
    /// Candidates offered for selection, if any.
    pub candidates: Vec<CandidateControl>,
    /// True while a selection session is waiting on the human.
    pub pending_selection: bool,
    pub session_id: Option<String>,
    /// Submitted selection identifiers that matched neither a candidate id
    /// nor a control code. Reported, never silently dropped.
    pub unresolved_selection: Vec<String>,
}
