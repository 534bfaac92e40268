//! Intent classification: one completion call, two fallbacks.

use tracing::{debug, warn};

use aegis_core::intent::{keyword_classify, parse_classification};
use aegis_core::traits::ICompletionProvider;
use aegis_core::Intent;

/// Classify a user query. Never fails: provider errors and unparseable
/// output both degrade to the deterministic keyword classifier, which in
/// turn defaults to `QueryControls`.
pub fn classify(completion: &dyn ICompletionProvider, query: &str) -> Intent {
    let prompt = classification_prompt(query);
    let intent = match completion.complete(&prompt) {
        Ok(raw) => parse_classification(&raw).unwrap_or_else(|| {
            debug!("classification output unparseable, using keyword fallback");
            keyword_classify(query)
        }),
        Err(err) => {
            warn!(error = %err, "classification call failed, using keyword fallback");
            keyword_classify(query)
        }
    };
    debug!(intent = intent.name(), "query classified");
    intent
}

fn classification_prompt(query: &str) -> String {
    format!(
        "Classify this risk-management query into exactly one intent.\n\
         Query: {query}\n\n\
         Intents and their parameters:\n\
         - generate_for_risk: {{\"risk_id\": string}}\n\
         - generate_for_all_uncovered: no parameters\n\
         - generate_for_category: {{\"category\": string}}\n\
         - query_controls: no parameters\n\
         - show_confirmed_controls: {{\"risk_id\": optional string}}\n\
         - show_controls_by_category: {{\"category\": string}}\n\
         - show_controls_by_reference: {{\"reference\": string, e.g. \"A.5\"}}\n\n\
         Respond with ONLY JSON: {{\"intent\": \"...\", \"parameters\": {{...}}}}"
    )
}
