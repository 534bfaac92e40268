//! TOML-loadable configuration with full defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{AegisError, AegisResult};

/// Fusion-engine knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Top-K fetched from each source before merging.
    pub source_limit: usize,
    /// Strict cosine cutoff applied to vector-sourced items downstream.
    pub similarity_cutoff: f64,
    /// Fixed relevance assigned to literal text matches.
    pub text_match_relevance: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            source_limit: constants::DEFAULT_SOURCE_LIMIT,
            similarity_cutoff: constants::VECTOR_SIMILARITY_CUTOFF,
            text_match_relevance: constants::TEXT_MATCH_RELEVANCE,
        }
    }
}

/// Generation-step knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Fused items included in the generation context block.
    pub context_top_n: usize,
    /// Risks processed per batch-generation run.
    pub max_risks_per_run: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            context_top_n: constants::DEFAULT_CONTEXT_TOP_N,
            max_risks_per_run: constants::DEFAULT_MAX_RISKS_PER_RUN,
        }
    }
}

/// Completion/embedding provider knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub endpoint: String,
    pub completion_model: String,
    pub embedding_model: String,
    /// Entries kept in the embedding cache.
    pub embedding_cache_capacity: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            completion_model: "gpt-4".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            embedding_cache_capacity: 2048,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AegisConfig {
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub inference: InferenceConfig,
}

impl AegisConfig {
    /// Load from a TOML file. Unspecified sections fall back to defaults.
    pub fn load(path: &Path) -> AegisResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AegisError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| AegisError::Config(format!("parse {}: {e}", path.display())))
    }
}
