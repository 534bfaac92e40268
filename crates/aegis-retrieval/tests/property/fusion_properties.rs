//! Property tests for the merge invariants: uniqueness, priority, and
//! order preservation hold for arbitrary overlapping source lists.

use std::collections::HashSet;

use proptest::prelude::*;

use aegis_core::models::{CorpusEntry, ItemPayload, RetrievalSource, RetrievedItem};
use aegis_retrieval::merge_by_priority;
use test_fixtures::sample_candidate;

fn stored_item(id: u8, reference: u8, source: RetrievalSource) -> RetrievedItem {
    let mut control = sample_candidate(
        &format!("id-{id}"),
        &format!("CTRL-{id:03}"),
        "r1",
        "u1",
    );
    control.annex_reference = format!("A.5.{reference}");
    RetrievedItem {
        payload: ItemPayload::StoredControl(control),
        source,
        relevance: Some(0.85),
    }
}

fn corpus_item(reference: u8) -> RetrievedItem {
    RetrievedItem {
        payload: ItemPayload::CorpusEntry(CorpusEntry {
            reference: format!("A.5.{reference}"),
            description: "Organizational Controls".to_string(),
            guidance: "keep policies current".to_string(),
        }),
        source: RetrievalSource::ReferenceCorpus,
        relevance: None,
    }
}

fn source_rank(source: RetrievalSource) -> usize {
    match source {
        RetrievalSource::ExistingUserControl => 0,
        RetrievalSource::TextSearch => 1,
        RetrievalSource::VectorSearch => 2,
        RetrievalSource::ReferenceCorpus => 3,
    }
}

proptest! {
    #[test]
    fn merged_ids_and_references_are_unique(
        user_ids in proptest::collection::vec(0u8..20, 0..8),
        text_ids in proptest::collection::vec(0u8..20, 0..8),
        vector_ids in proptest::collection::vec(0u8..20, 0..8),
        corpus_refs in proptest::collection::vec(0u8..20, 0..8),
    ) {
        let user: Vec<_> = user_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::ExistingUserControl)).collect();
        let text: Vec<_> = text_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::TextSearch)).collect();
        let vector: Vec<_> = vector_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::VectorSearch)).collect();
        let corpus: Vec<_> = corpus_refs.iter().map(|r| corpus_item(*r)).collect();

        let merged = merge_by_priority(&[&user, &text, &vector, &corpus]);

        let mut seen = HashSet::new();
        for item in &merged {
            prop_assert!(seen.insert(item.payload.dedup_key().to_string()),
                "duplicate key {}", item.payload.dedup_key());
        }
    }

    #[test]
    fn surviving_tag_is_the_highest_priority_source(
        user_ids in proptest::collection::vec(0u8..10, 0..6),
        vector_ids in proptest::collection::vec(0u8..10, 0..6),
    ) {
        let user: Vec<_> = user_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::ExistingUserControl)).collect();
        let vector: Vec<_> = vector_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::VectorSearch)).collect();

        let merged = merge_by_priority(&[&user, &vector]);

        for item in &merged {
            let key = item.payload.dedup_key();
            let best = [&user, &vector]
                .iter()
                .flat_map(|s| s.iter())
                .filter(|i| i.payload.dedup_key() == key)
                .map(|i| source_rank(i.source))
                .min()
                .expect("item came from somewhere");
            prop_assert_eq!(source_rank(item.source), best);
        }
    }

    #[test]
    fn merged_never_exceeds_input_total(
        text_ids in proptest::collection::vec(0u8..30, 0..10),
        corpus_refs in proptest::collection::vec(0u8..30, 0..10),
    ) {
        let text: Vec<_> = text_ids.iter()
            .map(|i| stored_item(*i, *i, RetrievalSource::TextSearch)).collect();
        let corpus: Vec<_> = corpus_refs.iter().map(|r| corpus_item(*r)).collect();

        let merged = merge_by_priority(&[&text, &corpus]);
        prop_assert!(merged.len() <= text.len() + corpus.len());
    }
}
