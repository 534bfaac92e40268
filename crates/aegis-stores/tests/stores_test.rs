//! Backend behavior the workflow depends on: upsert idempotence, the
//! covered-risk filter, text search, the session CAS, and graph aggregates.

use aegis_core::models::{SelectionSession, SessionStatus, WorkflowSnapshot};
use aegis_core::traits::{IDocumentStore, IGraphStore, ISessionStore, IVectorStore};
use aegis_core::Intent;
use aegis_stores::{MemoryGraphStore, SqliteDocumentStore, SqliteVectorStore};
use test_fixtures::{sample_candidate, sample_confirmed, sample_profile, sample_risk};

#[test]
fn control_upsert_is_idempotent_by_id() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    let confirmed = sample_confirmed("c-1", "CTRL-001", "r-1", "u-1");
    store.upsert_control(&confirmed).unwrap();
    store.upsert_control(&confirmed).unwrap();

    assert_eq!(store.controls_by_user("u-1").unwrap().len(), 1);
}

#[test]
fn covered_risks_are_excluded_on_request() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store.upsert_risk(&sample_risk("r-1", "u-1", "Operational Risk")).unwrap();
    store.upsert_risk(&sample_risk("r-2", "u-1", "Operational Risk")).unwrap();
    store
        .upsert_control(&sample_confirmed("c-1", "CTRL-001", "r-1", "u-1"))
        .unwrap();

    let all = store.risks_by_user("u-1", false).unwrap();
    let uncovered = store.risks_by_user("u-1", true).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(uncovered.len(), 1);
    assert_eq!(uncovered[0].id, "r-2");
}

#[test]
fn text_search_matches_guidance_case_insensitively() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store
        .upsert_control(&sample_confirmed("c-1", "CTRL-001", "r-1", "u-1"))
        .unwrap();

    // Fixture guidance mentions quarterly access reviews.
    let hits = store.search_controls_text("ACCESS", 10).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(store.search_controls_text("", 10).unwrap().is_empty());
    assert!(store.search_controls_text("zzz-no-match", 10).unwrap().is_empty());
}

#[test]
fn filters_by_category_and_reference_prefix() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store.upsert_risk(&sample_risk("r-1", "u-1", "Supply Chain Risk")).unwrap();
    store
        .upsert_control(&sample_confirmed("c-1", "CTRL-001", "r-1", "u-1"))
        .unwrap();

    let by_category = store.controls_by_category("Supply Chain Risk", "u-1").unwrap();
    assert_eq!(by_category.len(), 1);

    // Fixture reference is A.5.15.
    assert_eq!(store.controls_by_reference_prefix("A.5", "u-1").unwrap().len(), 1);
    assert!(store.controls_by_reference_prefix("A.8", "u-1").unwrap().is_empty());
}

fn pending_session(id_hint: &str) -> SelectionSession {
    let mut session = SelectionSession::new(
        "u-1",
        vec![sample_candidate("c-1", "CTRL-001", "r-1", "u-1")],
        WorkflowSnapshot::V1 {
            query: "generate".to_string(),
            intent: Intent::GenerateForAllUncovered,
        },
    );
    session.id = id_hint.to_string();
    session
}

#[test]
fn session_claim_flips_status_exactly_once() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    store.save(&pending_session("s-1")).unwrap();

    assert!(store.claim("s-1").unwrap());
    assert!(!store.claim("s-1").unwrap());

    // The status column wins over the stale payload.
    let loaded = ISessionStore::get(&store, "s-1").unwrap().unwrap();
    assert_eq!(loaded.status, SessionStatus::Stored);
}

#[test]
fn claiming_a_missing_session_errors() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    assert!(store.claim("ghost").is_err());
}

#[test]
fn vector_search_ranks_by_cosine_and_skips_mismatched_dimensions() {
    let store = SqliteVectorStore::open_in_memory().unwrap();
    let near = sample_candidate("c-near", "CTRL-001", "r-1", "u-1");
    let far = sample_candidate("c-far", "CTRL-002", "r-1", "u-2");
    let odd = sample_candidate("c-odd", "CTRL-003", "r-1", "u-1");
    store.upsert_control_embedding(&near, &[1.0, 0.0, 0.0]).unwrap();
    store.upsert_control_embedding(&far, &[0.0, 1.0, 0.0]).unwrap();
    store.upsert_control_embedding(&odd, &[1.0, 0.0]).unwrap();

    let hits = store.search_controls(&[1.0, 0.1, 0.0], 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, "c-near");
    assert!(hits[0].1 > hits[1].1);

    let scoped = store.search_user_controls("u-1", &[1.0, 0.0, 0.0], 10).unwrap();
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].0.id, "c-near");
}

#[test]
fn risk_embeddings_search_like_control_embeddings() {
    let store = SqliteVectorStore::open_in_memory().unwrap();
    let near = sample_risk("r-near", "u-1", "Operational Risk");
    let far = sample_risk("r-far", "u-1", "Supply Chain Risk");
    store.upsert_risk_embedding(&near, &[1.0, 0.0]).unwrap();
    store.upsert_risk_embedding(&far, &[0.0, 1.0]).unwrap();

    let hits = store.search_risks(&[0.9, 0.1], 1).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.id, "r-near");
}

#[test]
fn graph_usage_aggregates_rank_by_selection_count() {
    let graph = MemoryGraphStore::new();
    for (user, domain) in [("u-1", "Manufacturing"), ("u-2", "Manufacturing"), ("u-3", "Retail")] {
        graph.upsert_user(&sample_profile(user, domain)).unwrap();
    }
    for (user, risk) in [("u-1", "r-1"), ("u-2", "r-2"), ("u-3", "r-3")] {
        graph
            .upsert_risk_node(&sample_risk(risk, user, "Operational Risk"))
            .unwrap();
    }
    // The same control code selected by both manufacturing users.
    for (user, risk, control_id) in [("u-1", "r-1", "c-1"), ("u-2", "r-2", "c-2"), ("u-3", "r-3", "c-3")] {
        let confirmed = sample_confirmed(control_id, "CTRL-001", risk, user);
        graph.upsert_control_node(&confirmed).unwrap();
        graph.link_mitigates(control_id, risk).unwrap();
        graph.link_selected(user, control_id).unwrap();
    }

    let top = graph
        .top_controls_for("Manufacturing", "Operational Risk", 5)
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].control_code, "CTRL-001");
    assert_eq!(top[0].usage_count, 2);
}

#[test]
fn coverage_stats_count_risks_and_mitigating_controls() {
    let graph = MemoryGraphStore::new();
    graph.upsert_user(&sample_profile("u-1", "Manufacturing")).unwrap();
    graph
        .upsert_risk_node(&sample_risk("r-1", "u-1", "Operational Risk"))
        .unwrap();
    graph
        .upsert_risk_node(&sample_risk("r-2", "u-1", "Supply Chain Risk"))
        .unwrap();
    let confirmed = sample_confirmed("c-1", "CTRL-001", "r-1", "u-1");
    graph.upsert_control_node(&confirmed).unwrap();
    graph.link_mitigates("c-1", "r-1").unwrap();

    let stats = graph.coverage_stats("u-1").unwrap();
    assert_eq!(stats.len(), 2);
    let operational = stats.iter().find(|s| s.category == "Operational Risk").unwrap();
    assert_eq!(operational.total_risks, 1);
    assert_eq!(operational.total_controls, 1);
    let supply = stats.iter().find(|s| s.category == "Supply Chain Risk").unwrap();
    assert_eq!(supply.total_controls, 0);
}

#[test]
fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aegis.db");
    {
        let store = SqliteDocumentStore::open(&path).unwrap();
        store
            .upsert_control(&sample_confirmed("c-1", "CTRL-001", "r-1", "u-1"))
            .unwrap();
    }
    let reopened = SqliteDocumentStore::open(&path).unwrap();
    assert!(reopened.get_control("c-1").unwrap().is_some());
}
