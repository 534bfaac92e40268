//! Tolerant parsing of the completion service's structured output.
//!
//! Accepted shapes: a bare JSON array, or an object wrapping one under a
//! "controls" key, optionally inside a markdown code fence. Anything else
//! parses to an empty list — the caller treats zero candidates as
//! "generation produced nothing", never as an error to retry.

use serde::Deserialize;
use tracing::warn;

/// A candidate as the completion service emits it: everything optional,
/// repaired or dropped downstream.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCandidate {
    pub id: String,
    #[serde(alias = "control_id")]
    pub control_code: String,
    pub title: String,
    pub description: String,
    pub domain_category: String,
    pub annex_reference: String,
    pub control_statement: String,
    pub implementation_guidance: String,
}

/// Parse the raw completion text into candidates. Never errors.
pub fn parse_candidates(raw: &str) -> Vec<RawCandidate> {
    let stripped = strip_code_fence(raw.trim());

    if let Ok(list) = serde_json::from_str::<Vec<RawCandidate>>(stripped) {
        return list;
    }

    #[derive(Deserialize)]
    struct Wrapped {
        controls: Vec<RawCandidate>,
    }
    if let Ok(wrapped) = serde_json::from_str::<Wrapped>(stripped) {
        return wrapped.controls;
    }

    warn!(bytes = raw.len(), "completion output unparseable, zero candidates");
    Vec::new()
}

/// Strip a single surrounding ``` fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.trim_start_matches(['\r', '\n']);
    rest.strip_suffix("```").map(str::trim_end).unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_CONTROL: &str = r#"[{
        "control_id": "OPE-001",
        "title": "Supplier security policy",
        "description": "Defines security requirements for suppliers",
        "domain_category": "Organizational Controls",
        "annex_reference": "A.5.19",
        "control_statement": "Establish supplier security requirements",
        "implementation_guidance": "Embed requirements in contracts"
    }]"#;

    #[test]
    fn parses_bare_array() {
        let parsed = parse_candidates(ONE_CONTROL);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].control_code, "OPE-001");
    }

    #[test]
    fn parses_fenced_and_wrapped_output() {
        let fenced = format!("```json\n{ONE_CONTROL}\n```");
        assert_eq!(parse_candidates(&fenced).len(), 1);

        let wrapped = format!("{{\"controls\": {ONE_CONTROL}}}");
        assert_eq!(parse_candidates(&wrapped).len(), 1);
    }

    #[test]
    fn garbage_parses_to_empty_not_panic() {
        assert!(parse_candidates("I'm sorry, I can't help with that.").is_empty());
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates("{\"controls\": 7}").is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let parsed = parse_candidates(r#"[{"title": "Only a title"}]"#);
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].annex_reference.is_empty());
    }
}
