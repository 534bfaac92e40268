//! Category mapping and cross-cutting keyword buckets.
//!
//! These are fixed heuristics, not learned: a register category maps to one
//! or more Annex A domains, and a handful of keyword buckets widen free-text
//! queries to the references that topic actually lives under.

use aegis_core::models::ControlDomain;

/// Map a risk-register category to the Annex A domains most likely to hold
/// relevant controls. Unknown categories default to Organizational.
pub fn domains_for_category(category: &str) -> Vec<ControlDomain> {
    use ControlDomain::*;
    match category {
        "Operational Risk" | "Financial Risk" | "Strategic Risk" => vec![Organizational],
        "Technical Risk" => vec![Technological],
        "Compliance Risk" | "Reputational Risk" => vec![Organizational, People],
        "Physical Risk" | "Environmental Risk" => vec![Physical],
        "Supply Chain Risk" => vec![Organizational, Physical],
        "Cybersecurity Risk" | "Data Risk" => vec![Technological, Organizational],
        "Human Resource Risk" => vec![People],
        "Natural Disaster Risk" => vec![Physical, Organizational],
        _ => vec![Organizational],
    }
}

/// A cross-cutting topic: keywords that trigger it, and the
/// (domain, reference-prefix) pairs it widens the search to.
pub struct KeywordBucket {
    pub keywords: &'static [&'static str],
    pub scopes: &'static [(ControlDomain, &'static str)],
}

/// Business continuity and disaster recovery.
pub static BUSINESS_CONTINUITY: KeywordBucket = KeywordBucket {
    keywords: &[
        "business continuity",
        "disaster recovery",
        "continuity",
        "recovery",
        "backup",
        "resilience",
        "emergency",
        "disruption",
    ],
    scopes: &[
        (ControlDomain::Organizational, "A.5."),
        (ControlDomain::Physical, "A.7."),
    ],
};

/// Information security at large.
pub static INFORMATION_SECURITY: KeywordBucket = KeywordBucket {
    keywords: &[
        "information security",
        "infosec",
        "cybersecurity",
        "cyber security",
        "data protection",
        "access control",
        "authentication",
        "encryption",
        "malware",
        "vulnerability",
        "incident response",
        "security policy",
    ],
    scopes: &[
        (ControlDomain::Technological, "A.8."),
        (ControlDomain::Organizational, "A.5."),
        (ControlDomain::People, "A.6."),
    ],
};

/// Supply chain and third parties.
pub static SUPPLY_CHAIN: KeywordBucket = KeywordBucket {
    keywords: &[
        "supply chain",
        "vendor",
        "third party",
        "third-party",
        "supplier",
        "outsourcing",
        "contractor",
        "procurement",
        "logistics",
        "warehouse",
        "manufacturing",
    ],
    scopes: &[
        (ControlDomain::Organizational, "A.5."),
        (ControlDomain::Physical, "A.7."),
        (ControlDomain::People, "A.6."),
    ],
};

/// All buckets, in match-priority order.
pub static BUCKETS: [&KeywordBucket; 3] =
    [&BUSINESS_CONTINUITY, &INFORMATION_SECURITY, &SUPPLY_CHAIN];

/// First bucket any of whose keywords occurs in the lowercased query.
pub fn matching_bucket(query_lower: &str) -> Option<&'static KeywordBucket> {
    BUCKETS
        .into_iter()
        .find(|bucket| bucket.keywords.iter().any(|kw| query_lower.contains(kw)))
}
