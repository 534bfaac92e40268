//! Classification output parsing and the deterministic keyword fallback.
//!
//! The completion service returns JSON `{"intent": ..., "parameters": {...}}`.
//! Any parse failure degrades to the keyword classifier, and that in turn
//! degrades to `QueryControls`. Classification never blocks the workflow.

use serde_json::Value;
use tracing::debug;

use super::Intent;

/// Parse the completion service's classification JSON.
///
/// Tolerates missing or extra parameter fields; returns `None` only when
/// the payload names no recognizable intent.
pub fn parse_classification(raw: &str) -> Option<Intent> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let name = value.get("intent")?.as_str()?;
    let params = value.get("parameters").cloned().unwrap_or(Value::Null);
    let param = |key: &str| {
        params
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let intent = match name {
        "generate_controls_specific" | "generate_for_risk" => Intent::GenerateForRisk {
            risk_id: param("risk_id")?,
        },
        "generate_controls_all" | "generate_for_all_uncovered" => Intent::GenerateForAllUncovered,
        "generate_controls_category" | "generate_for_category" => Intent::GenerateForCategory {
            category: param("risk_category").or_else(|| param("category"))?,
        },
        "show_finalized_controls" | "show_confirmed_controls" => Intent::ShowConfirmedControls {
            risk_id: param("risk_id"),
        },
        "show_controls_by_category" => Intent::ShowControlsByCategory {
            category: param("risk_category").or_else(|| param("category"))?,
        },
        "show_controls_by_annex" | "show_controls_by_reference" => Intent::ShowControlsByReference {
            reference: param("annex").or_else(|| param("reference"))?,
        },
        "query_controls" => Intent::QueryControls,
        other => {
            debug!(intent = other, "unrecognized intent name");
            return None;
        }
    };
    Some(intent)
}

/// Deterministic keyword classifier, used when the completion service is
/// unavailable or returns garbage.
pub fn keyword_classify(query: &str) -> Intent {
    let lower = query.to_lowercase();
    let wants_generation = lower.contains("generate")
        || lower.contains("suggest")
        || lower.contains("propose")
        || lower.contains("recommend");

    if wants_generation {
        if lower.contains("all") && (lower.contains("risk") || lower.contains("register")) {
            return Intent::GenerateForAllUncovered;
        }
        if let Some(category) = extract_category(&lower) {
            return Intent::GenerateForCategory { category };
        }
        // A bare generation request without a resolvable target stays
        // informational rather than guessing a risk id.
        return Intent::QueryControls;
    }

    if lower.contains("show") || lower.contains("list") || lower.contains("existing") {
        if let Some(reference) = extract_annex_reference(query) {
            return Intent::ShowControlsByReference { reference };
        }
        if let Some(category) = extract_category(&lower) {
            return Intent::ShowControlsByCategory { category };
        }
        return Intent::ShowConfirmedControls { risk_id: None };
    }

    Intent::QueryControls
}

/// Register categories recognized by the keyword classifier.
const KNOWN_CATEGORIES: [&str; 10] = [
    "Operational Risk",
    "Technical Risk",
    "Compliance Risk",
    "Financial Risk",
    "Strategic Risk",
    "Reputational Risk",
    "Physical Risk",
    "Supply Chain Risk",
    "Cybersecurity Risk",
    "Data Risk",
];

fn extract_category(lower_query: &str) -> Option<String> {
    KNOWN_CATEGORIES
        .iter()
        .find(|c| lower_query.contains(&c.to_lowercase()))
        .map(|c| c.to_string())
}

/// Find an annex reference like "A.5" or "A.8.12" in the raw query.
fn extract_annex_reference(query: &str) -> Option<String> {
    let upper = query.to_uppercase();
    let start = upper.find("A.")?;
    let reference: String = upper[start..]
        .chars()
        .take_while(|c| *c == 'A' || *c == '.' || c.is_ascii_digit())
        .collect();
    // "A." alone is not a reference.
    if reference.len() > 2 {
        Some(reference.trim_end_matches('.').to_string())
    } else {
        None
    }
}
