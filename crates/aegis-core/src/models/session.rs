use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::control::CandidateControl;
use crate::intent::Intent;

/// Resolution state of a selection session. Transition is one-way
/// (`Pending → Stored`) and guarded by a compare-and-set so that two
/// concurrent resumes of the same session resolve at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Pending,
    Stored,
}

/// Versioned snapshot of the workflow state needed to resume after the
/// human selects a subset. A tagged enum, not an open-ended map, so
/// resumption can pattern-match on exactly the fields it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "version")]
pub enum WorkflowSnapshot {
    #[serde(rename = "1")]
    V1 { query: String, intent: Intent },
}

impl WorkflowSnapshot {
    pub fn query(&self) -> &str {
        match self {
            WorkflowSnapshot::V1 { query, .. } => query,
        }
    }

    pub fn intent(&self) -> &Intent {
        match self {
            WorkflowSnapshot::V1 { intent, .. } => intent,
        }
    }
}

/// Durable, resumable record pairing generated-but-unconfirmed controls
/// with the snapshot needed to resume. The sole piece of cross-request
/// shared mutable state in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionSession {
    pub id: String,
    pub user_id: String,
    /// The full set of candidates offered. May be empty: a session is
    /// created even when generation produced nothing, so the conversation
    /// can continue.
    pub candidates: Vec<CandidateControl>,
    pub snapshot: WorkflowSnapshot,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl SelectionSession {
    pub fn new(user_id: &str, candidates: Vec<CandidateControl>, snapshot: WorkflowSnapshot) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            candidates,
            snapshot,
            status: SessionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Resolve one submitted identifier against the offered candidates:
    /// locally-generated id first, then human-meaningful control code.
    pub fn resolve(&self, selected_id: &str) -> Option<&CandidateControl> {
        self.candidates
            .iter()
            .find(|c| c.id == selected_id)
            .or_else(|| self.candidates.iter().find(|c| c.control_code == selected_id))
    }
}
