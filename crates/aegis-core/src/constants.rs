//! Workspace-wide constants.

/// Cosine-similarity cutoff applied to vector-sourced items before they are
/// surfaced to the user. Text, graph, and corpus sources are exempt.
pub const VECTOR_SIMILARITY_CUTOFF: f64 = 0.8;

/// Fixed relevance assigned to literal text matches.
pub const TEXT_MATCH_RELEVANCE: f64 = 0.9;

/// Default top-K for each retrieval source.
pub const DEFAULT_SOURCE_LIMIT: usize = 5;

/// Maximum fused items included in a generation context block.
pub const DEFAULT_CONTEXT_TOP_N: usize = 5;

/// Maximum risks processed by one batch-generation run.
pub const DEFAULT_MAX_RISKS_PER_RUN: usize = 3;

/// Annex A domain-category display names, in reference order.
pub const DOMAIN_NAMES: [&str; 4] = [
    "Organizational Controls",
    "People Controls",
    "Physical Controls",
    "Technological Controls",
];
