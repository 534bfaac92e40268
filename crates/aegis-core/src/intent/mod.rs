//! Typed intent model.
//!
//! Each intent is a closed enum variant carrying its own parameters, so
//! invalid parameter combinations are unrepresentable.

mod classifier;

pub use classifier::{keyword_classify, parse_classification};

use serde::{Deserialize, Serialize};

/// The classified purpose of a user query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "parameters")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Generate controls for one named risk.
    GenerateForRisk { risk_id: String },
    /// Generate controls for every risk that has none yet.
    GenerateForAllUncovered,
    /// Generate controls for all risks in one register category.
    GenerateForCategory { category: String },
    /// Informational question about controls. Default / fallback intent.
    QueryControls,
    /// Show confirmed controls, optionally scoped to one risk.
    ShowConfirmedControls { risk_id: Option<String> },
    /// Show confirmed controls for one risk category.
    ShowControlsByCategory { category: String },
    /// Show confirmed controls under one annex reference prefix.
    ShowControlsByReference { reference: String },
}

impl Default for Intent {
    fn default() -> Self {
        Intent::QueryControls
    }
}

impl Intent {
    /// Whether this intent routes the workflow into the generation step.
    pub fn requests_generation(&self) -> bool {
        matches!(
            self,
            Intent::GenerateForRisk { .. }
                | Intent::GenerateForAllUncovered
                | Intent::GenerateForCategory { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::GenerateForRisk { .. } => "generate_for_risk",
            Intent::GenerateForAllUncovered => "generate_for_all_uncovered",
            Intent::GenerateForCategory { .. } => "generate_for_category",
            Intent::QueryControls => "query_controls",
            Intent::ShowConfirmedControls { .. } => "show_confirmed_controls",
            Intent::ShowControlsByCategory { .. } => "show_controls_by_category",
            Intent::ShowControlsByReference { .. } => "show_controls_by_reference",
        }
    }
}
