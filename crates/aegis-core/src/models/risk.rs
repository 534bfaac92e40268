use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Impact / likelihood scale.
///
/// Risk intake is an external process, so foreign values deserialize to
/// `Unknown` instead of failing the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }
}

/// An identified risk. Created by the external risk-intake process and
/// read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub id: String,
    pub description: String,
    /// Free-form register category, e.g. "Operational Risk".
    pub category: String,
    pub impact: Severity,
    pub likelihood: Severity,
    /// Owner of the register entry.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Risk {
    /// Text used for embedding-based similarity lookups.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.description, self.category)
    }
}
