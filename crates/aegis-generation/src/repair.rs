//! Normalization of raw completion output into well-formed candidates.

use aegis_core::{CandidateControl, ControlDomain, Risk};
use tracing::debug;
use uuid::Uuid;

use crate::parser::RawCandidate;

/// Repair what can be repaired and drop what cannot.
///
/// Missing ids get a fresh UUID, missing codes are synthesized from the
/// risk identifier plus the candidate's ordinal, and risk/user linkage is
/// always stamped from the generating context. Candidates missing a title,
/// description, domain category, statement or guidance are dropped; a
/// domain category that is present but spelled unconventionally is parsed
/// leniently, falling back to Organizational.
pub fn repair_candidates(raw: Vec<RawCandidate>, risk: &Risk, user_id: &str) -> Vec<CandidateControl> {
    let total = raw.len();
    let repaired: Vec<CandidateControl> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| repair_one(candidate, index, risk, user_id))
        .filter(|control| control.is_complete())
        .collect();

    if repaired.len() < total {
        debug!(
            risk_id = %risk.id,
            dropped = total - repaired.len(),
            "dropped incomplete candidates after repair"
        );
    }
    repaired
}

fn repair_one(
    raw: RawCandidate,
    index: usize,
    risk: &Risk,
    user_id: &str,
) -> Option<CandidateControl> {
    // An absent domain category is unrepairable; only spelling is lenient.
    if raw.domain_category.trim().is_empty() {
        return None;
    }
    let id = if raw.id.trim().is_empty() {
        Uuid::new_v4().to_string()
    } else {
        raw.id
    };
    let control_code = if raw.control_code.trim().is_empty() {
        format!("{}-{:03}", risk.id.to_uppercase(), index + 1)
    } else {
        raw.control_code
    };
    let domain_category = ControlDomain::parse(&raw.domain_category)
        .unwrap_or(ControlDomain::Organizational);

    Some(CandidateControl {
        id,
        control_code,
        title: raw.title,
        description: raw.description,
        domain_category,
        annex_reference: raw.annex_reference,
        control_statement: raw.control_statement,
        implementation_guidance: raw.implementation_guidance,
        risk_id: risk.id.clone(),
        user_id: user_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::sample_risk;

    fn complete_raw() -> RawCandidate {
        RawCandidate {
            title: "Access reviews".into(),
            description: "Periodic review of access rights".into(),
            domain_category: "People Controls".into(),
            annex_reference: "A.6.1".into(),
            control_statement: "Review access rights quarterly".into(),
            implementation_guidance: "Automate the review schedule".into(),
            ..RawCandidate::default()
        }
    }

    #[test]
    fn fills_id_and_synthesizes_code_from_risk() {
        let risk = sample_risk("r-7", "u-1", "Information Security");
        let repaired = repair_candidates(vec![complete_raw(), complete_raw()], &risk, "u-1");

        assert_eq!(repaired.len(), 2);
        assert!(!repaired[0].id.is_empty());
        assert_eq!(repaired[0].control_code, "R-7-001");
        assert_eq!(repaired[1].control_code, "R-7-002");
        assert_eq!(repaired[0].risk_id, "r-7");
        assert_eq!(repaired[0].user_id, "u-1");
    }

    #[test]
    fn keeps_supplied_identifiers() {
        let mut raw = complete_raw();
        raw.id = "keep-me".into();
        raw.control_code = "SUP-009".into();

        let risk = sample_risk("r-1", "u-1", "Supply Chain");
        let repaired = repair_candidates(vec![raw], &risk, "u-1");
        assert_eq!(repaired[0].id, "keep-me");
        assert_eq!(repaired[0].control_code, "SUP-009");
    }

    #[test]
    fn incomplete_candidates_are_dropped() {
        let mut missing_statement = complete_raw();
        missing_statement.control_statement = String::new();

        let risk = sample_risk("r-1", "u-1", "Information Security");
        let repaired =
            repair_candidates(vec![complete_raw(), missing_statement], &risk, "u-1");
        assert_eq!(repaired.len(), 1);
    }

    #[test]
    fn missing_domain_category_is_dropped() {
        let mut raw = complete_raw();
        raw.domain_category = String::new();

        let risk = sample_risk("r-1", "u-1", "Information Security");
        let repaired = repair_candidates(vec![complete_raw(), raw], &risk, "u-1");
        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].domain_category, ControlDomain::People);
    }

    #[test]
    fn unknown_domain_falls_back_to_organizational() {
        let mut raw = complete_raw();
        raw.domain_category = "Mystery Controls".into();

        let risk = sample_risk("r-1", "u-1", "Information Security");
        let repaired = repair_candidates(vec![raw], &risk, "u-1");
        assert_eq!(repaired[0].domain_category, ControlDomain::Organizational);
    }
}
