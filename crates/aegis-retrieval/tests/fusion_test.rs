//! End-to-end fusion tests over real SQLite/petgraph backends with a
//! scripted completion provider.

use aegis_core::config::RetrievalConfig;
use aegis_core::models::{RetrievalSource, Severity};
use aegis_core::traits::{IDocumentStore, IGraphStore, IVectorStore};
use aegis_core::Intent;
use aegis_corpus::ReferenceCatalog;
use aegis_retrieval::ContextFusionEngine;
use aegis_stores::{MemoryGraphStore, SqliteDocumentStore, SqliteVectorStore};
use test_fixtures::{
    sample_candidate, sample_confirmed, sample_profile, sample_risk, DownVectorStore,
    ScriptedCompletion,
};

fn engine_parts() -> (SqliteDocumentStore, SqliteVectorStore, MemoryGraphStore, ReferenceCatalog) {
    (
        SqliteDocumentStore::open_in_memory().expect("document store"),
        SqliteVectorStore::open_in_memory().expect("vector store"),
        MemoryGraphStore::new(),
        ReferenceCatalog::bundled(),
    )
}

#[test]
fn one_embedding_call_per_fusion() {
    let (documents, vectors, graph, catalog) = engine_parts();
    let completion = ScriptedCompletion::new();
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    engine.fuse("access control policy", "u1", &Intent::QueryControls);
    assert_eq!(completion.embed_call_count(), 1);
}

#[test]
fn empty_query_skips_vector_sources_but_not_the_rest() {
    let (documents, vectors, graph, catalog) = engine_parts();
    let completion = ScriptedCompletion::new();

    // A stored control with an embedding: reachable only via vector search.
    let confirmed = sample_confirmed("c1", "OPE-001", "r1", "u1");
    documents.upsert_control(&confirmed).unwrap();
    vectors
        .upsert_control_embedding(&confirmed.control, &[1.0, 0.0, 0.0, 0.0])
        .unwrap();

    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );
    let fused = engine.fuse("", "u1", &Intent::QueryControls);

    assert_eq!(completion.embed_call_count(), 0, "no embedding for empty query");
    assert!(fused.vector_matches.is_empty());
    assert!(fused.user_controls.is_empty());
}

#[test]
fn source_failure_degrades_to_empty_not_error() {
    let (documents, _vectors, graph, catalog) = engine_parts();
    let completion = ScriptedCompletion::new();
    let broken_vectors = DownVectorStore;

    let engine = ContextFusionEngine::new(
        &documents,
        &broken_vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );
    let fused = engine.fuse("information security incident", "u1", &Intent::QueryControls);

    assert!(fused.vector_matches.is_empty());
    assert!(fused.user_controls.is_empty());
    // Corpus keyword widening still produces results.
    assert!(!fused.corpus_matches.is_empty());
}

#[test]
fn threshold_filter_keeps_only_strictly_above_cutoff() {
    let (documents, vectors, graph, catalog) = engine_parts();

    // Four controls whose embeddings produce cosines 0.95/0.82/0.79/0.60
    // against the query vector [1,0,0,0]: cos(theta) = x-component of a
    // unit vector.
    let sims = [0.95f32, 0.82, 0.79, 0.60];
    for (i, sim) in sims.iter().enumerate() {
        let id = format!("c{i}");
        let control = sample_candidate(&id, &format!("OPE-00{i}"), "r1", "other-user");
        let y = (1.0 - sim * sim).sqrt();
        vectors
            .upsert_control_embedding(&control, &[*sim, y, 0.0, 0.0])
            .unwrap();
    }

    let completion = ScriptedCompletion::new()
        .with_embedding("ransomware recovery", vec![1.0, 0.0, 0.0, 0.0]);
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    let fused = engine.fuse("ransomware recovery", "u1", &Intent::QueryControls);
    assert_eq!(fused.vector_matches.len(), 4);

    let surviving: Vec<_> = fused
        .above_cutoff(0.8)
        .into_iter()
        .filter(|i| i.source == RetrievalSource::VectorSearch)
        .collect();
    assert_eq!(surviving.len(), 2);
    for item in surviving {
        assert!(item.relevance.unwrap() > 0.8);
    }
}

#[test]
fn corpus_items_are_exempt_from_the_cutoff() {
    let (documents, vectors, graph, catalog) = engine_parts();
    let completion = ScriptedCompletion::new();
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    let fused = engine.fuse("supply chain", "u1", &Intent::QueryControls);
    let corpus_total = fused
        .merged
        .iter()
        .filter(|i| i.source == RetrievalSource::ReferenceCorpus)
        .count();
    assert!(corpus_total > 0);

    let after_cutoff = fused.above_cutoff(0.8);
    let corpus_after = after_cutoff
        .iter()
        .filter(|i| i.source == RetrievalSource::ReferenceCorpus)
        .count();
    assert_eq!(corpus_total, corpus_after);
}

#[test]
fn user_controls_outrank_shared_vector_hits_for_same_control() {
    let (documents, vectors, graph, catalog) = engine_parts();

    let control = sample_candidate("c1", "OPE-001", "r1", "u1");
    vectors
        .upsert_control_embedding(&control, &[1.0, 0.0, 0.0, 0.0])
        .unwrap();

    let completion = ScriptedCompletion::new();
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    // u1 owns the control: it surfaces from both the user-scoped and the
    // shared index, and must keep the user-scoped tag.
    let fused = engine.fuse("restricted access", "u1", &Intent::QueryControls);
    let item = fused
        .merged
        .iter()
        .find(|i| i.payload.dedup_key() == "c1")
        .expect("c1 fused");
    assert_eq!(item.source, RetrievalSource::ExistingUserControl);
}

#[test]
fn generation_fusion_scopes_corpus_by_risk_category() {
    let (documents, vectors, graph, catalog) = engine_parts();
    let completion = ScriptedCompletion::new();
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    let mut risk = sample_risk("r1", "u1", "Physical Risk");
    risk.description = "unmonitored server room entry".to_string();
    risk.impact = Severity::Critical;
    let fused = engine.fuse_for_risk(&risk, &sample_profile("u1", "Manufacturing"));

    assert!(!fused.corpus_matches.is_empty());
    assert!(fused
        .corpus_matches
        .iter()
        .any(|i| i.payload.dedup_key().starts_with("A.7.")));
}

#[test]
fn graph_aggregates_feed_generation_context() {
    let (documents, vectors, graph, catalog) = engine_parts();

    // Another organization in the same business domain selected a control
    // against the same risk category.
    graph.upsert_user(&sample_profile("peer", "Manufacturing")).unwrap();
    let peer_risk = sample_risk("r9", "peer", "Operational Risk");
    graph.upsert_risk_node(&peer_risk).unwrap();
    let peer_control = sample_confirmed("c9", "OPE-009", "r9", "peer");
    graph.upsert_control_node(&peer_control).unwrap();
    graph.link_mitigates("c9", "r9").unwrap();
    graph.link_selected("peer", "c9").unwrap();

    let completion = ScriptedCompletion::new();
    let engine = ContextFusionEngine::new(
        &documents,
        &vectors,
        &graph,
        &completion,
        &catalog,
        RetrievalConfig::default(),
    );

    let risk = sample_risk("r1", "u1", "Operational Risk");
    let fused = engine.fuse_for_risk(&risk, &sample_profile("u1", "Manufacturing"));
    assert_eq!(fused.usage_aggregates.len(), 1);
    assert_eq!(fused.usage_aggregates[0].control_code, "OPE-009");
    assert_eq!(fused.usage_aggregates[0].usage_count, 1);
}
