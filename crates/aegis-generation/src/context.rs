//! Natural-language context block for the generation prompt.

use std::fmt::Write;

use aegis_core::models::{FusedContext, ItemPayload, Risk, UserProfile};

/// Render the risk, organization profile, and top-N fused items as the
/// context section of the generation prompt. Vector-sourced items below
/// the similarity cutoff are not surfaced.
pub fn build_context_block(
    risk: &Risk,
    profile: &UserProfile,
    fused: &FusedContext,
    cutoff: f64,
    top_n: usize,
) -> String {
    let mut block = String::new();
    let _ = writeln!(block, "Risk details:");
    let _ = writeln!(block, "- Description: {}", risk.description);
    let _ = writeln!(block, "- Category: {}", risk.category);
    let _ = writeln!(block, "- Impact: {}", risk.impact.as_str());
    let _ = writeln!(block, "- Likelihood: {}", risk.likelihood.as_str());
    let _ = writeln!(block);
    let _ = writeln!(block, "Organization:");
    let _ = writeln!(block, "- Name: {}", profile.organization_name);
    let _ = writeln!(block, "- Domain: {}", profile.domain);
    let _ = writeln!(block, "- Location: {}", profile.location);

    let relevant = fused.above_cutoff(cutoff);
    if !relevant.is_empty() {
        let _ = writeln!(block);
        let _ = writeln!(block, "Related controls and guidance:");
        for item in relevant.iter().take(top_n) {
            match &item.payload {
                ItemPayload::StoredControl(c) => {
                    let _ = writeln!(
                        block,
                        "- [{}] {} ({}): {}",
                        item.source.as_str(),
                        c.title,
                        c.annex_reference,
                        c.description
                    );
                }
                ItemPayload::CorpusEntry(e) => {
                    let _ = writeln!(
                        block,
                        "- [{}] {} ({}): {}",
                        item.source.as_str(),
                        e.reference,
                        e.description,
                        e.guidance
                    );
                }
            }
        }
    }

    if !fused.usage_aggregates.is_empty() {
        let _ = writeln!(block);
        let _ = writeln!(block, "Controls used by similar organizations:");
        for aggregate in fused.usage_aggregates.iter().take(top_n) {
            let _ = writeln!(
                block,
                "- {} {} ({}), selected {} time(s)",
                aggregate.control_code,
                aggregate.title,
                aggregate.annex_reference,
                aggregate.usage_count
            );
        }
    }

    block
}
