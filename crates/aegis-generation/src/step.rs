use aegis_core::traits::ICompletionProvider;
use aegis_core::{CandidateControl, FusedContext, Risk, UserProfile};
use tracing::{debug, info};

use crate::context::build_context_block;
use crate::parser::parse_candidates;
use crate::repair::repair_candidates;

/// Produces candidate controls for one risk from fused retrieval context.
///
/// Exactly one completion call per risk. A failed or unparseable completion
/// yields an empty candidate list, which the workflow surfaces to the user
/// rather than retrying.
pub struct GenerationStep<'a> {
    completion: &'a dyn ICompletionProvider,
    similarity_cutoff: f64,
    context_top_n: usize,
}

impl<'a> GenerationStep<'a> {
    pub fn new(
        completion: &'a dyn ICompletionProvider,
        similarity_cutoff: f64,
        context_top_n: usize,
    ) -> Self {
        Self {
            completion,
            similarity_cutoff,
            context_top_n,
        }
    }

    pub fn generate(
        &self,
        risk: &Risk,
        profile: &UserProfile,
        fused: &FusedContext,
    ) -> Vec<CandidateControl> {
        let context =
            build_context_block(risk, profile, fused, self.similarity_cutoff, self.context_top_n);
        let prompt = build_prompt(&context);

        let raw = match self.completion.complete(&prompt) {
            Ok(text) => text,
            Err(err) => {
                debug!(risk_id = %risk.id, error = %err, "completion failed, zero candidates");
                return Vec::new();
            }
        };

        let candidates = repair_candidates(parse_candidates(&raw), risk, &risk.user_id);
        info!(
            risk_id = %risk.id,
            candidates = candidates.len(),
            "generated candidate controls"
        );
        candidates
    }
}

fn build_prompt(context: &str) -> String {
    format!(
        "You are an ISO 27001 compliance assistant. Based on the risk and \
         context below, propose 3 to 5 mitigating controls.\n\n{context}\n\n\
         Respond with ONLY a JSON array. Each element must have these keys: \
         \"control_code\", \"title\", \"description\", \"domain_category\" \
         (one of \"Organizational Controls\", \"People Controls\", \
         \"Physical Controls\", \"Technological Controls\"), \
         \"annex_reference\" (an ISO 27001:2022 Annex A reference such as \
         \"A.5.19\"), \"control_statement\", and \"implementation_guidance\"."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::{sample_profile, sample_risk, ScriptedCompletion};

    fn empty_context() -> FusedContext {
        FusedContext::default()
    }

    const TWO_CONTROLS: &str = r#"[
        {"title": "Supplier due diligence", "description": "Vet suppliers before onboarding",
         "domain_category": "Organizational Controls", "annex_reference": "A.5.19",
         "control_statement": "Assess supplier security posture",
         "implementation_guidance": "Use a standard questionnaire"},
        {"title": "Contractual clauses", "description": "Security clauses in supplier contracts",
         "domain_category": "Organizational Controls", "annex_reference": "A.5.20",
         "control_statement": "Embed security requirements in contracts",
         "implementation_guidance": "Review clauses annually"}
    ]"#;

    #[test]
    fn one_completion_call_per_risk() {
        let completion = ScriptedCompletion::new().push_completion(TWO_CONTROLS);
        let step = GenerationStep::new(&completion, 0.8, 5);

        let risk = sample_risk("r-1", "u-1", "Supply Chain");
        let profile = sample_profile("u-1", "Manufacturing");
        let candidates = step.generate(&risk, &profile, &empty_context());

        assert_eq!(candidates.len(), 2);
        assert_eq!(completion.completion_call_count(), 1);
        assert_eq!(candidates[0].risk_id, "r-1");
        assert_eq!(candidates[0].control_code, "R-1-001");
    }

    #[test]
    fn unparseable_completion_yields_empty_list() {
        let completion = ScriptedCompletion::new().push_completion("no json here");
        let step = GenerationStep::new(&completion, 0.8, 5);

        let risk = sample_risk("r-1", "u-1", "Supply Chain");
        let profile = sample_profile("u-1", "Manufacturing");
        assert!(step.generate(&risk, &profile, &empty_context()).is_empty());
    }

    #[test]
    fn completion_failure_yields_empty_list_not_error() {
        let completion = ScriptedCompletion::completions_down();
        let step = GenerationStep::new(&completion, 0.8, 5);

        let risk = sample_risk("r-1", "u-1", "Supply Chain");
        let profile = sample_profile("u-1", "Manufacturing");
        assert!(step.generate(&risk, &profile, &empty_context()).is_empty());
    }

    #[test]
    fn prompt_carries_risk_description() {
        let completion = ScriptedCompletion::new().push_completion("[]");
        let step = GenerationStep::new(&completion, 0.8, 5);

        let risk = sample_risk("r-1", "u-1", "Supply Chain");
        let profile = sample_profile("u-1", "Manufacturing");
        step.generate(&risk, &profile, &empty_context());

        let calls = completion.complete_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&risk.description));
        assert!(calls[0].contains("JSON array"));
    }
}
