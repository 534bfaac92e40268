//! Response synthesis: the human-readable text the workflow hands back.
//!
//! Free-form answers go through the completion service with a
//! deterministic fallback; structural replies (candidate lists, persistence
//! summaries, not-found messages) are always deterministic.

use std::fmt::Write as _;

use tracing::warn;

use aegis_core::models::{
    CandidateControl, ConfirmedControl, CoverageStat, FusedContext, PersistReport,
};
use aegis_core::traits::ICompletionProvider;

/// Offer generated candidates for selection.
pub fn candidates_offer(candidates: &[CandidateControl]) -> String {
    if candidates.is_empty() {
        return "No candidate controls could be generated for this request. \
                You can refine the query and try again; the session stays open."
            .to_string();
    }
    let mut out = format!(
        "Generated {} candidate control(s). Reply with the codes you want to confirm:\n",
        candidates.len()
    );
    for candidate in candidates {
        let _ = writeln!(
            out,
            "- {} ({}): {} [{}]",
            candidate.control_code,
            candidate.annex_reference,
            candidate.title,
            candidate.domain_category.display_name()
        );
    }
    out
}

/// A selection in which no identifier matched any candidate. The session
/// stays open, so the reply re-offers the candidates for correction.
pub fn selection_unmatched(unresolved: &[String], candidates: &[CandidateControl]) -> String {
    let mut out = String::from("None of the submitted identifiers matched a candidate");
    if !unresolved.is_empty() {
        let _ = write!(out, " (unmatched: {})", unresolved.join(", "));
    }
    out.push_str(". Nothing was stored; the session stays open.\n");
    out.push_str(&candidates_offer(candidates));
    out
}

/// Summarize a persistence run. Always states the number of controls
/// durably confirmed, then any partial failures and unresolved selections.
pub fn persistence_summary(report: &PersistReport, unresolved: &[String]) -> String {
    let mut out = format!("{} control(s) durably confirmed.", report.stored);
    if !report.document_failures.is_empty() {
        let _ = write!(
            out,
            " {} control(s) could not be stored and are NOT confirmed.",
            report.document_failures.len()
        );
    }
    if !report.graph_failures.is_empty() {
        let _ = write!(
            out,
            " {} relationship write(s) failed; coverage analytics may lag.",
            report.graph_failures.len()
        );
    }
    if !report.vector_failures.is_empty() {
        let _ = write!(
            out,
            " {} similarity-index write(s) failed; retrieval may miss these controls.",
            report.vector_failures.len()
        );
    }
    if !unresolved.is_empty() {
        let _ = write!(
            out,
            " Unrecognized selection identifier(s), skipped: {}.",
            unresolved.join(", ")
        );
    }
    out
}

/// List confirmed controls, optionally followed by coverage statistics.
pub fn confirmed_listing(controls: &[ConfirmedControl], coverage: &[CoverageStat]) -> String {
    let mut out = if controls.is_empty() {
        "No confirmed controls found for this request.".to_string()
    } else {
        let mut s = format!("{} confirmed control(s):\n", controls.len());
        for confirmed in controls {
            let c = &confirmed.control;
            let _ = writeln!(s, "- {} ({}): {}", c.control_code, c.annex_reference, c.title);
        }
        s
    };
    if !coverage.is_empty() {
        let _ = writeln!(out, "\nCoverage by risk category:");
        for stat in coverage {
            let _ = writeln!(
                out,
                "- {}: {} risk(s), {} mitigating control(s)",
                stat.category, stat.total_risks, stat.total_controls
            );
        }
    }
    out
}

/// Answer an informational query from fused context. One completion call;
/// provider failure degrades to a deterministic listing of the context.
pub fn answer_query(
    completion: &dyn ICompletionProvider,
    query: &str,
    fused: &FusedContext,
    cutoff: f64,
) -> String {
    let relevant = fused.above_cutoff(cutoff);
    let mut context = String::new();
    for item in &relevant {
        let _ = writeln!(context, "- [{}] {}", item.source.as_str(), item.payload.title());
    }

    let prompt = format!(
        "You are an ISO 27001 compliance assistant. Answer the user's \
         question using the retrieved context where relevant.\n\n\
         Question: {query}\n\nRetrieved context:\n{context}\n\
         Answer concisely in plain prose."
    );
    match completion.complete(&prompt) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) | Err(_) => {
            warn!("answer synthesis unavailable, falling back to context listing");
            if relevant.is_empty() {
                "No relevant controls or guidance were found for this query.".to_string()
            } else {
                format!("Most relevant controls and guidance:\n{context}")
            }
        }
    }
}
