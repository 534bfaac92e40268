//! WorkflowEngine: drives the state machine over injected collaborators.

use tracing::{info, warn};

use aegis_core::errors::{AegisError, AegisResult, WorkflowError};
use aegis_core::models::{
    CandidateControl, ConfirmedControl, CoverageStat, Risk, SelectionSession, SessionStatus,
    UserProfile, WorkflowReply, WorkflowSnapshot,
};
use aegis_core::traits::{
    ICompletionProvider, IDocumentStore, IGraphStore, ISessionStore, IVectorStore,
};
use aegis_core::{AegisConfig, Intent};
use aegis_corpus::ReferenceCatalog;
use aegis_generation::GenerationStep;
use aegis_retrieval::ContextFusionEngine;
use aegis_session::SessionManager;

use crate::classify::classify;
use crate::machine::{Machine, WorkflowState};
use crate::persist::PersistenceCoordinator;
use crate::synthesize;

/// The workflow engine. All collaborators are injected once at
/// construction; the engine itself is stateless between requests, so one
/// instance serves any number of users and sessions.
pub struct WorkflowEngine<'a> {
    documents: &'a dyn IDocumentStore,
    vectors: &'a dyn IVectorStore,
    graph: &'a dyn IGraphStore,
    sessions: &'a dyn ISessionStore,
    completion: &'a dyn ICompletionProvider,
    catalog: &'a ReferenceCatalog,
    config: AegisConfig,
}

impl<'a> WorkflowEngine<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        documents: &'a dyn IDocumentStore,
        vectors: &'a dyn IVectorStore,
        graph: &'a dyn IGraphStore,
        sessions: &'a dyn ISessionStore,
        completion: &'a dyn ICompletionProvider,
        catalog: &'a ReferenceCatalog,
        config: AegisConfig,
    ) -> Self {
        Self {
            documents,
            vectors,
            graph,
            sessions,
            completion,
            catalog,
            config,
        }
    }

    /// Run the workflow for one request.
    ///
    /// A request carrying both a session id and a selection resumes that
    /// session directly at the persistence step. Not-found conditions
    /// (unknown risk, unknown or already-resolved session) come back as a
    /// reply with a distinct message, not as an error: they are user
    /// conversation, not system failure.
    pub fn run(
        &self,
        query: &str,
        user_id: &str,
        selection: Option<Vec<String>>,
        session_id: Option<String>,
    ) -> AegisResult<WorkflowReply> {
        let outcome = match (session_id, selection) {
            (Some(sid), Some(selected)) => self.resume(&sid, user_id, &selected),
            (Some(sid), None) => self.remind_pending(&sid, user_id),
            (None, _) => self.fresh(query, user_id),
        };
        match outcome {
            Err(AegisError::Workflow(err)) if is_user_visible(&err) => Ok(WorkflowReply {
                final_response: err.to_string(),
                ..WorkflowReply::default()
            }),
            other => other,
        }
    }

    // --- Fresh run: Classifying → Retrieving → ... ---

    fn fresh(&self, query: &str, user_id: &str) -> AegisResult<WorkflowReply> {
        let mut machine = Machine::start();
        let intent = classify(self.completion, query);
        machine.advance(WorkflowState::Retrieving)?;

        if intent.requests_generation() {
            self.generation_path(machine, query, user_id, intent)
        } else {
            self.informational_path(machine, query, user_id, &intent)
        }
    }

    fn generation_path(
        &self,
        mut machine: Machine,
        query: &str,
        user_id: &str,
        intent: Intent,
    ) -> AegisResult<WorkflowReply> {
        let risks = match &intent {
            Intent::GenerateForRisk { risk_id } => {
                let risk = self.documents.get_risk(risk_id, user_id)?.ok_or_else(|| {
                    WorkflowError::RiskNotFound {
                        risk_id: risk_id.clone(),
                    }
                })?;
                // Duplicate-prevention guard: a risk with confirmed
                // controls is already covered.
                let existing = self.documents.controls_by_risk(risk_id, user_id)?;
                if !existing.is_empty() {
                    machine.advance(WorkflowState::Synthesizing)?;
                    machine.advance(WorkflowState::Done)?;
                    return Ok(WorkflowReply {
                        final_response: format!(
                            "Risk {risk_id} already has {} confirmed control(s). \
                             Remove or review them before generating more.",
                            existing.len()
                        ),
                        ..WorkflowReply::default()
                    });
                }
                vec![risk]
            }
            Intent::GenerateForAllUncovered => self.uncovered_risks(user_id, None)?,
            Intent::GenerateForCategory { category } => {
                self.uncovered_risks(user_id, Some(category))?
            }
            _ => Vec::new(),
        };

        machine.advance(WorkflowState::Generating)?;
        let profile = self.profile_or_default(user_id);
        let candidates = self.generate_for(&risks, &profile);

        machine.advance(WorkflowState::AwaitingSelection)?;
        let manager = SessionManager::new(self.sessions);
        let session = manager.open(
            user_id,
            candidates.clone(),
            WorkflowSnapshot::V1 {
                query: query.to_string(),
                intent,
            },
        )?;
        info!(
            session_id = %session.id,
            risks = risks.len(),
            candidates = candidates.len(),
            "suspending for selection"
        );

        // No selection in this request: pause here and hand back.
        machine.advance(WorkflowState::Synthesizing)?;
        machine.advance(WorkflowState::Done)?;
        Ok(WorkflowReply {
            final_response: synthesize::candidates_offer(&candidates),
            candidates,
            pending_selection: true,
            session_id: Some(session.id),
            unresolved_selection: Vec::new(),
        })
    }

    fn informational_path(
        &self,
        mut machine: Machine,
        query: &str,
        user_id: &str,
        intent: &Intent,
    ) -> AegisResult<WorkflowReply> {
        machine.advance(WorkflowState::Synthesizing)?;
        let final_response = match intent {
            Intent::ShowConfirmedControls { risk_id: Some(id) } => {
                let controls = self.documents.controls_by_risk(id, user_id)?;
                synthesize::confirmed_listing(&controls, &[])
            }
            Intent::ShowConfirmedControls { risk_id: None } => {
                let controls = self.documents.controls_by_user(user_id)?;
                synthesize::confirmed_listing(&controls, &self.coverage(user_id))
            }
            Intent::ShowControlsByCategory { category } => {
                let controls = self.documents.controls_by_category(category, user_id)?;
                synthesize::confirmed_listing(&controls, &[])
            }
            Intent::ShowControlsByReference { reference } => {
                let controls = self
                    .documents
                    .controls_by_reference_prefix(reference, user_id)?;
                synthesize::confirmed_listing(&controls, &[])
            }
            _ => {
                let fusion = self.fusion_engine();
                let fused = fusion.fuse(query, user_id, intent);
                synthesize::answer_query(
                    self.completion,
                    query,
                    &fused,
                    self.config.retrieval.similarity_cutoff,
                )
            }
        };
        machine.advance(WorkflowState::Done)?;
        Ok(WorkflowReply {
            final_response,
            ..WorkflowReply::default()
        })
    }

    // --- Resumption: straight to Persisting ---

    fn resume(
        &self,
        session_id: &str,
        user_id: &str,
        selection: &[String],
    ) -> AegisResult<WorkflowReply> {
        let mut machine = Machine::resume();
        let session = self.load_session(session_id, user_id)?;
        if session.status == SessionStatus::Stored {
            return Err(WorkflowError::SessionAlreadyResolved {
                session_id: session_id.to_string(),
            }
            .into());
        }

        // Resolve before claiming: a selection that matches nothing (a typo,
        // say) must not consume the session.
        let (confirmed, unresolved) = resolve_selection(&session, selection);
        if confirmed.is_empty() {
            info!(session_id, unresolved = unresolved.len(), "selection matched no candidate");
            return Ok(WorkflowReply {
                final_response: synthesize::selection_unmatched(&unresolved, &session.candidates),
                candidates: session.candidates.clone(),
                pending_selection: true,
                session_id: Some(session.id),
                unresolved_selection: unresolved,
            });
        }

        let manager = SessionManager::new(self.sessions);
        if !manager.claim(session_id)? {
            return Err(WorkflowError::SessionAlreadyResolved {
                session_id: session_id.to_string(),
            }
            .into());
        }

        info!(
            session_id,
            selected = confirmed.len(),
            unresolved = unresolved.len(),
            "resuming session"
        );

        let profile = self.documents.get_profile(user_id).unwrap_or_else(|err| {
            warn!(error = %err, "profile lookup failed during resume");
            None
        });
        let coordinator =
            PersistenceCoordinator::new(self.documents, self.graph, self.vectors, self.completion);
        let report = coordinator.persist(&confirmed, profile.as_ref());

        machine.advance(WorkflowState::Synthesizing)?;
        machine.advance(WorkflowState::Done)?;
        Ok(WorkflowReply {
            final_response: synthesize::persistence_summary(&report, &unresolved),
            candidates: Vec::new(),
            pending_selection: false,
            session_id: Some(session.id),
            unresolved_selection: unresolved,
        })
    }

    /// Session id without a selection: the workflow is still paused.
    fn remind_pending(&self, session_id: &str, user_id: &str) -> AegisResult<WorkflowReply> {
        let session = self.load_session(session_id, user_id)?;
        Ok(WorkflowReply {
            final_response: synthesize::candidates_offer(&session.candidates),
            candidates: session.candidates.clone(),
            pending_selection: true,
            session_id: Some(session.id),
            unresolved_selection: Vec::new(),
        })
    }

    // --- Helpers ---

    fn load_session(&self, session_id: &str, user_id: &str) -> AegisResult<SelectionSession> {
        let not_found = || WorkflowError::SessionNotFound {
            session_id: session_id.to_string(),
        };
        let session = self.sessions.get(session_id)?.ok_or_else(not_found)?;
        // A session belongs to the user who opened it.
        if session.user_id != user_id {
            return Err(not_found().into());
        }
        Ok(session)
    }

    fn uncovered_risks(&self, user_id: &str, category: Option<&str>) -> AegisResult<Vec<Risk>> {
        let mut risks = self.documents.risks_by_user(user_id, true)?;
        if let Some(category) = category {
            risks.retain(|r| r.category.eq_ignore_ascii_case(category));
        }
        let cap = self.config.generation.max_risks_per_run;
        if risks.len() > cap {
            info!(total = risks.len(), cap, "capping batch generation run");
            risks.truncate(cap);
        }
        Ok(risks)
    }

    fn generate_for(&self, risks: &[Risk], profile: &UserProfile) -> Vec<CandidateControl> {
        let fusion = self.fusion_engine();
        let step = GenerationStep::new(
            self.completion,
            self.config.retrieval.similarity_cutoff,
            self.config.generation.context_top_n,
        );
        let mut candidates = Vec::new();
        for risk in risks {
            self.index_risk(risk);
            let fused = fusion.fuse_for_risk(risk, profile);
            candidates.extend(step.generate(risk, profile, &fused));
        }
        candidates
    }

    /// Keep the risk side of the similarity index current. Non-fatal: the
    /// index is advisory and rebuildable.
    fn index_risk(&self, risk: &Risk) {
        let outcome = self
            .completion
            .embed(&risk.embedding_text())
            .and_then(|embedding| self.vectors.upsert_risk_embedding(risk, &embedding));
        if let Err(err) = outcome {
            warn!(risk_id = %risk.id, error = %err, "risk embedding upsert failed");
        }
    }

    fn fusion_engine(&self) -> ContextFusionEngine<'_> {
        ContextFusionEngine::new(
            self.documents,
            self.vectors,
            self.graph,
            self.completion,
            self.catalog,
            self.config.retrieval.clone(),
        )
    }

    fn profile_or_default(&self, user_id: &str) -> UserProfile {
        match self.documents.get_profile(user_id) {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile {
                user_id: user_id.to_string(),
                organization_name: String::new(),
                location: String::new(),
                domain: String::new(),
            },
            Err(err) => {
                warn!(error = %err, "profile lookup failed, using empty profile");
                UserProfile {
                    user_id: user_id.to_string(),
                    organization_name: String::new(),
                    location: String::new(),
                    domain: String::new(),
                }
            }
        }
    }

    fn coverage(&self, user_id: &str) -> Vec<CoverageStat> {
        match self.graph.coverage_stats(user_id) {
            Ok(stats) => stats,
            Err(err) => {
                warn!(error = %err, "coverage lookup failed, omitting statistics");
                Vec::new()
            }
        }
    }
}

/// Resolve submitted identifiers against the session's candidates: id
/// first, then control code. Duplicate selections collapse; unmatched
/// identifiers are reported, never silently dropped.
fn resolve_selection(
    session: &SelectionSession,
    selection: &[String],
) -> (Vec<ConfirmedControl>, Vec<String>) {
    let mut confirmed: Vec<ConfirmedControl> = Vec::new();
    let mut unresolved = Vec::new();
    for selected in selection {
        match session.resolve(selected) {
            Some(candidate) => {
                if !confirmed.iter().any(|c| c.id() == candidate.id) {
                    confirmed.push(ConfirmedControl::new(candidate.clone()));
                }
            }
            None => unresolved.push(selected.clone()),
        }
    }
    (confirmed, unresolved)
}

fn is_user_visible(err: &WorkflowError) -> bool {
    matches!(
        err,
        WorkflowError::RiskNotFound { .. }
            | WorkflowError::SessionNotFound { .. }
            | WorkflowError::SessionAlreadyResolved { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::models::SessionStatus;
    use test_fixtures::sample_candidate;

    fn session_with(candidates: Vec<CandidateControl>) -> SelectionSession {
        SelectionSession {
            id: "s-1".to_string(),
            user_id: "u-1".to_string(),
            candidates,
            snapshot: WorkflowSnapshot::V1 {
                query: String::new(),
                intent: Intent::QueryControls,
            },
            status: SessionStatus::Pending,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn selection_resolves_by_id_then_code() {
        let session = session_with(vec![
            sample_candidate("id-1", "CTRL-001", "r-1", "u-1"),
            sample_candidate("id-2", "CTRL-002", "r-1", "u-1"),
        ]);

        let (confirmed, unresolved) =
            resolve_selection(&session, &["CTRL-001".to_string()]);
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].id(), "id-1");
        assert!(unresolved.is_empty());

        let (confirmed, unresolved) = resolve_selection(&session, &["id-9999".to_string()]);
        assert!(confirmed.is_empty());
        assert_eq!(unresolved, vec!["id-9999".to_string()]);
    }

    #[test]
    fn selecting_the_same_candidate_twice_confirms_once() {
        let session = session_with(vec![sample_candidate("id-1", "CTRL-001", "r-1", "u-1")]);
        let (confirmed, unresolved) = resolve_selection(
            &session,
            &["id-1".to_string(), "CTRL-001".to_string()],
        );
        assert_eq!(confirmed.len(), 1);
        assert!(unresolved.is_empty());
    }
}
