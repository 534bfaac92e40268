//! Deterministic local embedder: token hashing into a fixed number of
//! buckets, L2-normalized. Last-resort fallback when no remote provider is
//! reachable — crude, but stable across processes, which is all the
//! degrade-to-empty paths need.

use aegis_core::errors::{AegisResult, InferenceError};
use aegis_core::traits::ICompletionProvider;

const DIMENSIONS: usize = 256;

/// Embedding-only provider. `complete` always fails: there is no local
/// text generation, and callers already treat completion failure as
/// "no usable output".
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

// FNV-1a, 64-bit.
fn fnv1a(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

impl ICompletionProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>> {
        let mut vector = vec![0.0f32; DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(&token.to_lowercase());
            let bucket = (hash % DIMENSIONS as u64) as usize;
            // Sign from a higher hash bit decorrelates colliding tokens.
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn complete(&self, _prompt: &str) -> AegisResult<String> {
        Err(InferenceError::ProviderUnavailable {
            provider: self.name().to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_are_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new();
        let a = embedder.embed("unauthorized access to the data center").unwrap();
        let b = embedder.embed("unauthorized access to the data center").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn similar_texts_score_higher_than_unrelated() {
        let embedder = HashingEmbedder::new();
        let base = embedder.embed("backup and disaster recovery plan").unwrap();
        let close = embedder.embed("disaster recovery and backup testing").unwrap();
        let far = embedder.embed("marketing newsletter signup flow").unwrap();
        let dot = |x: &[f32], y: &[f32]| -> f32 { x.iter().zip(y).map(|(a, b)| a * b).sum() };
        assert!(dot(&base, &close) > dot(&base, &far));
    }

    #[test]
    fn completion_is_unavailable() {
        assert!(HashingEmbedder::new().complete("anything").is_err());
    }
}
