use serde::{Deserialize, Serialize};

use super::control::CandidateControl;

/// Where a retrieved item came from. Also the merge priority: lower
/// discriminant wins when the same item surfaces from several sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalSource {
    ExistingUserControl,
    TextSearch,
    VectorSearch,
    ReferenceCorpus,
}

impl RetrievalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalSource::ExistingUserControl => "existing-user-control",
            RetrievalSource::TextSearch => "text-search",
            RetrievalSource::VectorSearch => "vector-search",
            RetrievalSource::ReferenceCorpus => "reference-corpus",
        }
    }
}

/// One record of the static reference catalog: a standard control with its
/// domain-category name and implementation guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    /// Standard reference, e.g. "A.5.30".
    pub reference: String,
    /// Domain-category display name ("Organizational Controls", ...).
    pub description: String,
    pub guidance: String,
}

/// Payload of a retrieved item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum ItemPayload {
    StoredControl(CandidateControl),
    CorpusEntry(CorpusEntry),
}

impl ItemPayload {
    /// Dedup key: annex reference for corpus entries, locally-generated id
    /// for stored controls.
    pub fn dedup_key(&self) -> &str {
        match self {
            ItemPayload::StoredControl(c) => &c.id,
            ItemPayload::CorpusEntry(e) => &e.reference,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ItemPayload::StoredControl(c) => &c.title,
            ItemPayload::CorpusEntry(e) => &e.description,
        }
    }
}

/// A Risk- or Control-like record plus provenance and relevance.
/// Produced only by the fusion engine; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub payload: ItemPayload,
    pub source: RetrievalSource,
    /// In [0,1]. Cosine similarity for vector-sourced items, a fixed high
    /// constant for text matches, absent for corpus items.
    pub relevance: Option<f64>,
}

/// Graph-derived usage aggregate: how often a control has been selected
/// for a given domain + risk-category pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageAggregate {
    pub control_code: String,
    pub title: String,
    pub annex_reference: String,
    pub usage_count: u64,
}

/// Per-category coverage: how many risks a user has in a category and how
/// many confirmed controls mitigate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageStat {
    pub category: String,
    pub total_risks: u64,
    pub total_controls: u64,
}

/// Fused retrieval output: the deduplicated merged list plus the raw
/// per-source lists, so downstream consumers can apply their own
/// relevance threshold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusedContext {
    pub merged: Vec<RetrievedItem>,
    pub user_controls: Vec<RetrievedItem>,
    pub text_matches: Vec<RetrievedItem>,
    pub vector_matches: Vec<RetrievedItem>,
    pub corpus_matches: Vec<RetrievedItem>,
    /// Usage aggregates from the graph store. Kept separate from the merged
    /// list: they carry counts, not full control records.
    pub usage_aggregates: Vec<UsageAggregate>,
}

impl FusedContext {
    pub fn is_empty(&self) -> bool {
        self.merged.is_empty() && self.usage_aggregates.is_empty()
    }

    /// Per-source result counts (gathered, pre-dedup).
    pub fn source_counts(&self) -> [(RetrievalSource, usize); 4] {
        [
            (
                RetrievalSource::ExistingUserControl,
                self.user_controls.len(),
            ),
            (RetrievalSource::TextSearch, self.text_matches.len()),
            (RetrievalSource::VectorSearch, self.vector_matches.len()),
            (RetrievalSource::ReferenceCorpus, self.corpus_matches.len()),
        ]
    }

    /// Merged items that survive a strict similarity cutoff.
    ///
    /// Only vector-sourced items are subject to the cutoff; every other
    /// source is exempt and passes through unchanged.
    pub fn above_cutoff(&self, cutoff: f64) -> Vec<&RetrievedItem> {
        self.merged
            .iter()
            .filter(|item| match item.source {
                RetrievalSource::VectorSearch => item.relevance.is_some_and(|r| r > cutoff),
                _ => true,
            })
            .collect()
    }
}
