//! Strict-priority merge with first-wins dedup.

use std::collections::HashSet;

use aegis_core::models::{ItemPayload, RetrievedItem};

/// Merge per-source lists in strict priority order, deduplicating across
/// the two identifier schemes: stored controls dedup by locally-generated
/// id, corpus entries by reference code, and a corpus entry whose reference
/// already surfaced on a higher-priority stored control is also dropped.
/// A dropped item is never re-ranked.
///
/// The slices must be passed highest priority first; within one source the
/// backend's own ranking is preserved.
pub fn merge_by_priority(sources: &[&[RetrievedItem]]) -> Vec<RetrievedItem> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_references: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for source in sources {
        for item in *source {
            match &item.payload {
                ItemPayload::StoredControl(control) => {
                    // Two stored controls may legitimately share an annex
                    // reference, so stored items dedup by id only — but
                    // their reference still shadows later corpus entries.
                    if !seen_ids.insert(control.id.clone()) {
                        continue;
                    }
                    seen_references.insert(control.annex_reference.clone());
                }
                ItemPayload::CorpusEntry(entry) => {
                    if !seen_references.insert(entry.reference.clone()) {
                        continue;
                    }
                }
            }
            merged.push(item.clone());
        }
    }
    merged
}
