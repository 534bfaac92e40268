//! Multi-store persistence with per-store fault policy.
//!
//! The document store is the source of truth: its write is fatal for the
//! control. Graph and vector writes are enrichment, recorded on failure
//! and rebuildable later from the document store.

use tracing::{debug, warn};

use aegis_core::models::{ConfirmedControl, ControlWriteFailure, PersistReport, UserProfile};
use aegis_core::traits::{ICompletionProvider, IDocumentStore, IGraphStore, IVectorStore};

pub struct PersistenceCoordinator<'a> {
    documents: &'a dyn IDocumentStore,
    graph: &'a dyn IGraphStore,
    vectors: &'a dyn IVectorStore,
    completion: &'a dyn ICompletionProvider,
}

impl<'a> PersistenceCoordinator<'a> {
    pub fn new(
        documents: &'a dyn IDocumentStore,
        graph: &'a dyn IGraphStore,
        vectors: &'a dyn IVectorStore,
        completion: &'a dyn ICompletionProvider,
    ) -> Self {
        Self {
            documents,
            graph,
            vectors,
            completion,
        }
    }

    /// Persist confirmed controls across all three stores. Never errors:
    /// every outcome, good or bad, lands in the report.
    pub fn persist(
        &self,
        controls: &[ConfirmedControl],
        profile: Option<&UserProfile>,
    ) -> PersistReport {
        let mut report = PersistReport::default();

        // The user node carries the organization domain used by graph
        // aggregates; refresh it once per batch.
        if let Some(profile) = profile {
            if let Err(err) = self.graph.upsert_user(profile) {
                warn!(user_id = %profile.user_id, error = %err, "user node upsert failed");
            }
        }

        for confirmed in controls {
            let control = &confirmed.control;

            if let Err(err) = self.documents.upsert_control(confirmed) {
                warn!(control_id = %control.id, error = %err, "document write failed, control not confirmed");
                report.document_failures.push(ControlWriteFailure {
                    control_id: control.id.clone(),
                    reason: err.to_string(),
                });
                // No canonical record, so no enrichment writes either.
                continue;
            }
            report.stored += 1;

            if let Err(err) = self.write_graph(confirmed) {
                warn!(control_id = %control.id, error = %err, "graph write failed, relationships skipped");
                report.graph_failures.push(ControlWriteFailure {
                    control_id: control.id.clone(),
                    reason: err.to_string(),
                });
            }

            if let Err(err) = self.write_vector(confirmed) {
                warn!(control_id = %control.id, error = %err, "vector write failed, similarity index skipped");
                report.vector_failures.push(ControlWriteFailure {
                    control_id: control.id.clone(),
                    reason: err.to_string(),
                });
            }
        }

        debug!(
            stored = report.stored,
            document_failures = report.document_failures.len(),
            graph_failures = report.graph_failures.len(),
            vector_failures = report.vector_failures.len(),
            "persistence run complete"
        );
        report
    }

    fn write_graph(&self, confirmed: &ConfirmedControl) -> aegis_core::AegisResult<()> {
        let control = &confirmed.control;
        self.graph.upsert_control_node(confirmed)?;
        self.graph.ensure_risk_stub(&control.risk_id, &control.user_id)?;
        self.graph.link_mitigates(&control.id, &control.risk_id)?;
        self.graph.link_selected(&control.user_id, &control.id)?;
        Ok(())
    }

    fn write_vector(&self, confirmed: &ConfirmedControl) -> aegis_core::AegisResult<()> {
        let control = &confirmed.control;
        let embedding = self.completion.embed(&control.embedding_text())?;
        self.vectors.upsert_control_embedding(control, &embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_stores::{MemoryGraphStore, SqliteDocumentStore, SqliteVectorStore};
    use test_fixtures::{
        sample_confirmed, sample_profile, DownVectorStore, ScriptedCompletion, SelectiveGraphStore,
    };

    fn stores() -> (SqliteDocumentStore, MemoryGraphStore, SqliteVectorStore) {
        (
            SqliteDocumentStore::open_in_memory().unwrap(),
            MemoryGraphStore::new(),
            SqliteVectorStore::open_in_memory().unwrap(),
        )
    }

    #[test]
    fn clean_run_writes_all_three_stores() {
        let (documents, graph, vectors) = stores();
        let completion = ScriptedCompletion::new();
        let coordinator = PersistenceCoordinator::new(&documents, &graph, &vectors, &completion);

        let profile = sample_profile("u-1", "Manufacturing");
        let report = coordinator.persist(
            &[sample_confirmed("c-1", "CTRL-001", "r-1", "u-1")],
            Some(&profile),
        );

        assert_eq!(report.stored, 1);
        assert!(report.fully_clean());
        assert!(documents.get_control("c-1").unwrap().is_some());
        // user + risk stub + control
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn graph_failure_is_recorded_but_not_fatal() {
        let (documents, graph, vectors) = stores();
        let graph = SelectiveGraphStore::new(graph, &["c-2"]);
        let completion = ScriptedCompletion::new();
        let coordinator = PersistenceCoordinator::new(&documents, &graph, &vectors, &completion);

        let report = coordinator.persist(
            &[
                sample_confirmed("c-1", "CTRL-001", "r-1", "u-1"),
                sample_confirmed("c-2", "CTRL-002", "r-1", "u-1"),
            ],
            None,
        );

        assert_eq!(report.stored, 2);
        assert_eq!(report.graph_failures.len(), 1);
        assert_eq!(report.graph_failures[0].control_id, "c-2");
        // Both controls still have their canonical record.
        assert!(documents.get_control("c-2").unwrap().is_some());
    }

    #[test]
    fn vector_failure_is_recorded_but_not_fatal() {
        let (documents, graph, _) = stores();
        let vectors = DownVectorStore;
        let completion = ScriptedCompletion::new();
        let coordinator = PersistenceCoordinator::new(&documents, &graph, &vectors, &completion);

        let report =
            coordinator.persist(&[sample_confirmed("c-1", "CTRL-001", "r-1", "u-1")], None);
        assert_eq!(report.stored, 1);
        assert_eq!(report.vector_failures.len(), 1);
    }

    #[test]
    fn persisting_twice_does_not_duplicate() {
        let (documents, graph, vectors) = stores();
        let completion = ScriptedCompletion::new();
        let coordinator = PersistenceCoordinator::new(&documents, &graph, &vectors, &completion);

        let batch = [sample_confirmed("c-1", "CTRL-001", "r-1", "u-1")];
        let profile = sample_profile("u-1", "Manufacturing");
        coordinator.persist(&batch, Some(&profile));
        let report = coordinator.persist(&batch, Some(&profile));

        assert_eq!(report.stored, 1);
        assert_eq!(documents.controls_by_user("u-1").unwrap().len(), 1);
        assert_eq!(graph.node_count(), 3);
    }
}
