//! The reference catalog: an immutable, in-memory list of standard
//! controls, loaded once at process start.

use std::path::Path;

use tracing::{info, warn};

use aegis_core::models::{ControlDomain, CorpusEntry};

use crate::keywords::{self, matching_bucket};

/// In-memory Annex A catalog. Absence or corruption of the source file
/// degrades to an empty catalog, never a startup failure.
pub struct ReferenceCatalog {
    entries: Vec<CorpusEntry>,
}

impl ReferenceCatalog {
    /// Load from a JSON file of `{reference, description, guidance}` records.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "catalog file unreadable, starting empty");
                return Self { entries: Vec::new() };
            }
        };
        match serde_json::from_str::<Vec<CorpusEntry>>(&raw) {
            Ok(entries) => {
                info!(entries = entries.len(), path = %path.display(), "reference catalog loaded");
                Self { entries }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "catalog file malformed, starting empty");
                Self { entries: Vec::new() }
            }
        }
    }

    /// The catalog bundled with the crate.
    pub fn bundled() -> Self {
        let raw = include_str!("../data/annex.json");
        let entries = serde_json::from_str(raw).unwrap_or_default();
        Self { entries }
    }

    pub fn from_entries(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    /// Exact lookup by reference, e.g. "A.8.5".
    pub fn by_reference(&self, reference: &str) -> Option<&CorpusEntry> {
        self.entries.iter().find(|e| e.reference == reference)
    }

    /// All entries in one domain.
    pub fn by_domain(&self, domain: ControlDomain) -> Vec<&CorpusEntry> {
        self.entries
            .iter()
            .filter(|e| e.description == domain.display_name())
            .collect()
    }

    /// Entries relevant to a risk-register category, via the fixed
    /// category → domain mapping.
    pub fn for_category(&self, category: &str, limit: usize) -> Vec<&CorpusEntry> {
        let domains = keywords::domains_for_category(category);
        let names: Vec<&str> = domains.iter().map(|d| d.display_name()).collect();
        self.entries
            .iter()
            .filter(|e| names.contains(&e.description.as_str()))
            .take(limit)
            .collect()
    }

    /// Free-text search: literal match against reference, domain name, or
    /// guidance, widened by the cross-cutting keyword buckets. Results are
    /// deduplicated by reference, preserving first-seen order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&CorpusEntry> {
        if self.entries.is_empty() || query.trim().is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();
        let bucket = matching_bucket(&query_lower);

        let mut matches: Vec<&CorpusEntry> = Vec::new();
        for entry in &self.entries {
            let literal = entry.reference.to_lowercase().contains(&query_lower)
                || entry.description.to_lowercase().contains(&query_lower)
                || entry.guidance.to_lowercase().contains(&query_lower);

            let widened = bucket.is_some_and(|b| {
                b.scopes.iter().any(|(domain, prefix)| {
                    entry.description == domain.display_name()
                        && entry.reference.starts_with(prefix)
                })
            });

            if literal || widened {
                matches.push(entry);
            }
        }

        let mut seen = std::collections::HashSet::new();
        matches.retain(|e| seen.insert(e.reference.as_str()));
        matches.truncate(limit);
        matches
    }
}
