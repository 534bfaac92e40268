use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Annex A domain category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlDomain {
    Organizational,
    People,
    Physical,
    Technological,
}

impl ControlDomain {
    /// Display name matching the catalog ("Organizational Controls", ...).
    pub fn display_name(&self) -> &'static str {
        match self {
            ControlDomain::Organizational => "Organizational Controls",
            ControlDomain::People => "People Controls",
            ControlDomain::Physical => "Physical Controls",
            ControlDomain::Technological => "Technological Controls",
        }
    }

    /// Parse a display name or bare domain word. Lenient on the
    /// "Controls" suffix since the completion service is inconsistent.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let stem = lower.strip_suffix(" controls").unwrap_or(&lower);
        match stem {
            "organizational" | "organisational" => Some(ControlDomain::Organizational),
            "people" => Some(ControlDomain::People),
            "physical" => Some(ControlDomain::Physical),
            "technological" | "technical" => Some(ControlDomain::Technological),
            _ => None,
        }
    }

    /// Annex A reference prefix for this domain (A.5 / A.6 / A.7 / A.8).
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            ControlDomain::Organizational => "A.5",
            ControlDomain::People => "A.6",
            ControlDomain::Physical => "A.7",
            ControlDomain::Technological => "A.8",
        }
    }
}

/// An LLM-proposed remediation, ephemeral until the user confirms it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateControl {
    /// Locally-generated identifier (UUID v4). Join key across stores once
    /// confirmed.
    pub id: String,
    /// Human-meaningful code, e.g. "OPE-001". Synthesized when the
    /// completion omits it.
    pub control_code: String,
    pub title: String,
    pub description: String,
    pub domain_category: ControlDomain,
    /// Standard reference, e.g. "A.8.5".
    pub annex_reference: String,
    pub control_statement: String,
    pub implementation_guidance: String,
    /// The generating risk. Every candidate resolves to exactly one risk.
    pub risk_id: String,
    pub user_id: String,
}

impl CandidateControl {
    /// Whether every field required before offering this candidate to the
    /// user is present. Incomplete candidates are dropped, not repaired.
    pub fn is_complete(&self) -> bool {
        !self.id.is_empty()
            && !self.control_code.is_empty()
            && !self.title.is_empty()
            && !self.description.is_empty()
            && !self.annex_reference.is_empty()
            && !self.control_statement.is_empty()
            && !self.implementation_guidance.is_empty()
            && !self.risk_id.is_empty()
            && !self.user_id.is_empty()
    }

    /// Text used when embedding a confirmed control.
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// A candidate the user selected. Immutable once stored; persisted
/// redundantly in the document, graph, and vector stores under the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedControl {
    #[serde(flatten)]
    pub control: CandidateControl,
    pub confirmed_at: DateTime<Utc>,
}

impl ConfirmedControl {
    pub fn new(control: CandidateControl) -> Self {
        Self {
            control,
            confirmed_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.control.id
    }
}
