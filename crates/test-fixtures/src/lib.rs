//! Shared fixtures for workspace tests: model builders, a scripted
//! completion provider, and failure-injection store wrappers.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use aegis_core::errors::{AegisResult, InferenceError, StoreError};
use aegis_core::models::{
    CandidateControl, ConfirmedControl, ControlDomain, CoverageStat, Risk, Severity,
    UsageAggregate, UserProfile,
};
use aegis_core::traits::{ICompletionProvider, IGraphStore, IVectorStore};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn sample_risk(id: &str, user_id: &str, category: &str) -> Risk {
    Risk {
        id: id.to_string(),
        description: format!("{category} scenario affecting core operations"),
        category: category.to_string(),
        impact: Severity::High,
        likelihood: Severity::Medium,
        user_id: user_id.to_string(),
        created_at: chrono::Utc::now(),
    }
}

pub fn sample_candidate(id: &str, code: &str, risk_id: &str, user_id: &str) -> CandidateControl {
    CandidateControl {
        id: id.to_string(),
        control_code: code.to_string(),
        title: format!("Control {code}"),
        description: "Access to systems is restricted to authorized personnel".to_string(),
        domain_category: ControlDomain::Organizational,
        annex_reference: "A.5.15".to_string(),
        control_statement: "Define and enforce an access control policy".to_string(),
        implementation_guidance: "Review access rights quarterly".to_string(),
        risk_id: risk_id.to_string(),
        user_id: user_id.to_string(),
    }
}

pub fn sample_confirmed(id: &str, code: &str, risk_id: &str, user_id: &str) -> ConfirmedControl {
    ConfirmedControl::new(sample_candidate(id, code, risk_id, user_id))
}

pub fn sample_profile(user_id: &str, domain: &str) -> UserProfile {
    UserProfile {
        user_id: user_id.to_string(),
        organization_name: "Acme Manufacturing".to_string(),
        location: "Rotterdam".to_string(),
        domain: domain.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Scripted completion provider
// ---------------------------------------------------------------------------

/// Deterministic completion provider. Completions are dequeued in order;
/// embeddings are exact-text registrations with a unit-vector default.
pub struct ScriptedCompletion {
    completions: Mutex<VecDeque<String>>,
    embeddings: Mutex<HashMap<String, Vec<f32>>>,
    pub complete_calls: Mutex<Vec<String>>,
    pub embed_calls: Mutex<Vec<String>>,
    fail_completions: bool,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self {
            completions: Mutex::new(VecDeque::new()),
            embeddings: Mutex::new(HashMap::new()),
            complete_calls: Mutex::new(Vec::new()),
            embed_calls: Mutex::new(Vec::new()),
            fail_completions: false,
        }
    }

    /// Every `complete` call fails; embeddings still work.
    pub fn completions_down() -> Self {
        Self {
            fail_completions: true,
            ..Self::new()
        }
    }

    pub fn push_completion(self, raw: &str) -> Self {
        self.completions
            .lock()
            .unwrap()
            .push_back(raw.to_string());
        self
    }

    pub fn with_embedding(self, text: &str, embedding: Vec<f32>) -> Self {
        self.embeddings
            .lock()
            .unwrap()
            .insert(text.to_string(), embedding);
        self
    }

    pub fn completion_call_count(&self) -> usize {
        self.complete_calls.lock().unwrap().len()
    }

    pub fn embed_call_count(&self) -> usize {
        self.embed_calls.lock().unwrap().len()
    }
}

impl Default for ScriptedCompletion {
    fn default() -> Self {
        Self::new()
    }
}

impl ICompletionProvider for ScriptedCompletion {
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>> {
        self.embed_calls.lock().unwrap().push(text.to_string());
        let registered = self.embeddings.lock().unwrap().get(text).cloned();
        Ok(registered.unwrap_or_else(|| vec![1.0, 0.0, 0.0, 0.0]))
    }

    fn complete(&self, prompt: &str) -> AegisResult<String> {
        self.complete_calls.lock().unwrap().push(prompt.to_string());
        if self.fail_completions {
            return Err(InferenceError::ProviderUnavailable {
                provider: "scripted".to_string(),
            }
            .into());
        }
        self.completions.lock().unwrap().pop_front().ok_or_else(|| {
            InferenceError::ProviderUnavailable {
                provider: "scripted (queue empty)".to_string(),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Failure-injection wrappers
// ---------------------------------------------------------------------------

/// Graph store where every call fails.
pub struct DownGraphStore;

impl IGraphStore for DownGraphStore {
    fn upsert_user(&self, _: &UserProfile) -> AegisResult<()> {
        Err(graph_down())
    }
    fn upsert_risk_node(&self, _: &Risk) -> AegisResult<()> {
        Err(graph_down())
    }
    fn ensure_risk_stub(&self, _: &str, _: &str) -> AegisResult<()> {
        Err(graph_down())
    }
    fn upsert_control_node(&self, _: &ConfirmedControl) -> AegisResult<()> {
        Err(graph_down())
    }
    fn link_mitigates(&self, _: &str, _: &str) -> AegisResult<()> {
        Err(graph_down())
    }
    fn link_selected(&self, _: &str, _: &str) -> AegisResult<()> {
        Err(graph_down())
    }
    fn top_controls_for(&self, _: &str, _: &str, _: usize) -> AegisResult<Vec<UsageAggregate>> {
        Err(graph_down())
    }
    fn coverage_stats(&self, _: &str) -> AegisResult<Vec<CoverageStat>> {
        Err(graph_down())
    }
}

fn graph_down() -> aegis_core::errors::AegisError {
    StoreError::GraphWrite {
        reason: "graph backend offline".to_string(),
    }
    .into()
}

/// Graph store that fails writes for specific control ids and delegates
/// the rest.
pub struct SelectiveGraphStore<G: IGraphStore> {
    inner: G,
    fail_control_ids: HashSet<String>,
}

impl<G: IGraphStore> SelectiveGraphStore<G> {
    pub fn new(inner: G, fail_control_ids: &[&str]) -> Self {
        Self {
            inner,
            fail_control_ids: fail_control_ids.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<G: IGraphStore> IGraphStore for SelectiveGraphStore<G> {
    fn upsert_user(&self, profile: &UserProfile) -> AegisResult<()> {
        self.inner.upsert_user(profile)
    }
    fn upsert_risk_node(&self, risk: &Risk) -> AegisResult<()> {
        self.inner.upsert_risk_node(risk)
    }
    fn ensure_risk_stub(&self, risk_id: &str, user_id: &str) -> AegisResult<()> {
        self.inner.ensure_risk_stub(risk_id, user_id)
    }
    fn upsert_control_node(&self, control: &ConfirmedControl) -> AegisResult<()> {
        if self.fail_control_ids.contains(control.id()) {
            return Err(graph_down());
        }
        self.inner.upsert_control_node(control)
    }
    fn link_mitigates(&self, control_id: &str, risk_id: &str) -> AegisResult<()> {
        self.inner.link_mitigates(control_id, risk_id)
    }
    fn link_selected(&self, user_id: &str, control_id: &str) -> AegisResult<()> {
        self.inner.link_selected(user_id, control_id)
    }
    fn top_controls_for(
        &self,
        domain: &str,
        category: &str,
        limit: usize,
    ) -> AegisResult<Vec<UsageAggregate>> {
        self.inner.top_controls_for(domain, category, limit)
    }
    fn coverage_stats(&self, user_id: &str) -> AegisResult<Vec<CoverageStat>> {
        self.inner.coverage_stats(user_id)
    }
}

/// Vector store where every call fails.
pub struct DownVectorStore;

fn vector_down() -> aegis_core::errors::AegisError {
    StoreError::VectorWrite {
        reason: "vector backend offline".to_string(),
    }
    .into()
}

impl IVectorStore for DownVectorStore {
    fn upsert_control_embedding(&self, _: &CandidateControl, _: &[f32]) -> AegisResult<()> {
        Err(vector_down())
    }
    fn upsert_risk_embedding(&self, _: &Risk, _: &[f32]) -> AegisResult<()> {
        Err(vector_down())
    }
    fn search_controls(&self, _: &[f32], _: usize) -> AegisResult<Vec<(CandidateControl, f64)>> {
        Err(vector_down())
    }
    fn search_user_controls(
        &self,
        _: &str,
        _: &[f32],
        _: usize,
    ) -> AegisResult<Vec<(CandidateControl, f64)>> {
        Err(vector_down())
    }
    fn search_risks(&self, _: &[f32], _: usize) -> AegisResult<Vec<(Risk, f64)>> {
        Err(vector_down())
    }
}
