//! ContextFusionEngine: gathers, shields, merges, and tags.
//!
//! Pipeline per request: one query embedding (reused by every vector
//! lookup) → four shielded source queries → strict-priority merge →
//! provenance + relevance tagging.

use tracing::{debug, info, warn};

use aegis_core::config::RetrievalConfig;
use aegis_core::models::{
    FusedContext, ItemPayload, RetrievalSource, RetrievedItem, Risk, UserProfile,
};
use aegis_core::traits::{ICompletionProvider, IDocumentStore, IGraphStore, IVectorStore};
use aegis_core::Intent;
use aegis_corpus::ReferenceCatalog;

use crate::guard::shielded;
use crate::merge::merge_by_priority;

/// The fusion engine. All collaborators are injected; the engine holds no
/// mutable state and is safe to share per request.
pub struct ContextFusionEngine<'a> {
    documents: &'a dyn IDocumentStore,
    vectors: &'a dyn IVectorStore,
    graph: &'a dyn IGraphStore,
    completion: &'a dyn ICompletionProvider,
    catalog: &'a ReferenceCatalog,
    config: RetrievalConfig,
}

impl<'a> ContextFusionEngine<'a> {
    pub fn new(
        documents: &'a dyn IDocumentStore,
        vectors: &'a dyn IVectorStore,
        graph: &'a dyn IGraphStore,
        completion: &'a dyn ICompletionProvider,
        catalog: &'a ReferenceCatalog,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            documents,
            vectors,
            graph,
            completion,
            catalog,
            config,
        }
    }

    /// Fuse context for a user query. Total failure of every source
    /// degrades to an empty context; this never errors.
    pub fn fuse(&self, query: &str, user_id: &str, intent: &Intent) -> FusedContext {
        let category = match intent {
            Intent::GenerateForCategory { category } => Some(category.as_str()),
            Intent::ShowControlsByCategory { category } => Some(category.as_str()),
            _ => None,
        };
        let profile = shielded("user-profile", || self.documents.get_profile(user_id));
        let domain = profile.as_ref().map(|p| p.domain.as_str());
        self.gather(query, user_id, category, domain)
    }

    /// Fuse context for control generation against one specific risk.
    /// The risk's own text is the query; its category scopes the corpus
    /// and graph lookups.
    pub fn fuse_for_risk(&self, risk: &Risk, profile: &UserProfile) -> FusedContext {
        self.gather(
            &risk.embedding_text(),
            &risk.user_id,
            Some(&risk.category),
            Some(&profile.domain),
        )
    }

    fn gather(
        &self,
        query: &str,
        user_id: &str,
        category: Option<&str>,
        domain: Option<&str>,
    ) -> FusedContext {
        let limit = self.config.source_limit;

        // Step 1: one embedding for the whole request. Empty queries skip
        // vector lookups entirely; embedding failure degrades the same way.
        let embedding: Option<Vec<f32>> = if query.trim().is_empty() {
            debug!("empty query, skipping vector sources");
            None
        } else {
            match self.completion.embed(query) {
                Ok(vector) => Some(vector),
                Err(e) => {
                    warn!(error = %e, "query embedding failed, vector sources degraded");
                    None
                }
            }
        };

        // Step 2: four independently shielded sources.
        let user_controls: Vec<RetrievedItem> = embedding
            .as_ref()
            .map(|emb| {
                shielded("existing-user-control", || {
                    self.vectors.search_user_controls(user_id, emb, limit)
                })
            })
            .unwrap_or_default()
            .into_iter()
            .map(|(control, sim)| RetrievedItem {
                payload: ItemPayload::StoredControl(control),
                source: RetrievalSource::ExistingUserControl,
                relevance: Some(sim.clamp(0.0, 1.0)),
            })
            .collect();

        let text_matches: Vec<RetrievedItem> =
            shielded("text-search", || self.documents.search_controls_text(query, limit))
                .into_iter()
                .map(|confirmed| RetrievedItem {
                    payload: ItemPayload::StoredControl(confirmed.control),
                    source: RetrievalSource::TextSearch,
                    relevance: Some(self.config.text_match_relevance),
                })
                .collect();

        let vector_matches: Vec<RetrievedItem> = embedding
            .as_ref()
            .map(|emb| {
                shielded("vector-search", || self.vectors.search_controls(emb, limit))
            })
            .unwrap_or_default()
            .into_iter()
            .map(|(control, sim)| RetrievedItem {
                payload: ItemPayload::StoredControl(control),
                source: RetrievalSource::VectorSearch,
                relevance: Some(sim.clamp(0.0, 1.0)),
            })
            .collect();

        let mut corpus_entries: Vec<_> = self
            .catalog
            .search(query, limit)
            .into_iter()
            .cloned()
            .collect();
        if let Some(category) = category {
            for entry in self.catalog.for_category(category, limit) {
                if !corpus_entries.iter().any(|e| e.reference == entry.reference) {
                    corpus_entries.push(entry.clone());
                }
            }
        }
        let corpus_matches: Vec<RetrievedItem> = corpus_entries
            .into_iter()
            .map(|entry| RetrievedItem {
                payload: ItemPayload::CorpusEntry(entry),
                source: RetrievalSource::ReferenceCorpus,
                relevance: None,
            })
            .collect();

        let usage_aggregates = match (domain, category) {
            (Some(domain), Some(category)) if !domain.is_empty() => {
                shielded("graph-aggregates", || {
                    self.graph.top_controls_for(domain, category, limit)
                })
            }
            _ => Vec::new(),
        };

        // Step 3: strict-priority merge, first occurrence wins.
        let merged = merge_by_priority(&[
            &user_controls,
            &text_matches,
            &vector_matches,
            &corpus_matches,
        ]);

        info!(
            merged = merged.len(),
            user = user_controls.len(),
            text = text_matches.len(),
            vector = vector_matches.len(),
            corpus = corpus_matches.len(),
            aggregates = usage_aggregates.len(),
            "fusion complete"
        );

        FusedContext {
            merged,
            user_controls,
            text_matches,
            vector_matches,
            corpus_matches,
            usage_aggregates,
        }
    }
}
