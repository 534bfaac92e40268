//! Embedding cache wrapper.
//!
//! The workflow computes at most one query embedding per request, but the
//! same risk/control texts recur across requests; caching by exact text
//! avoids re-billing the remote provider for them.

use moka::sync::Cache;

use aegis_core::errors::AegisResult;
use aegis_core::traits::ICompletionProvider;

/// Wraps any provider with a moka embedding cache. Completions are not
/// cached: they are temperature-sampled and expected to vary.
pub struct CachedProvider<P: ICompletionProvider> {
    inner: P,
    embeddings: Cache<String, Vec<f32>>,
}

impl<P: ICompletionProvider> CachedProvider<P> {
    pub fn new(inner: P, capacity: u64) -> Self {
        Self {
            inner,
            embeddings: Cache::new(capacity),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.embeddings.entry_count()
    }
}

impl<P: ICompletionProvider> ICompletionProvider for CachedProvider<P> {
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>> {
        if let Some(hit) = self.embeddings.get(text) {
            return Ok(hit);
        }
        let embedding = self.inner.embed(text)?;
        self.embeddings.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    fn complete(&self, prompt: &str) -> AegisResult<String> {
        self.inner.complete(prompt)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl ICompletionProvider for CountingEmbedder {
        fn embed(&self, _: &str) -> AegisResult<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 0.0])
        }
        fn complete(&self, _: &str) -> AegisResult<String> {
            Ok("ok".to_string())
        }
        fn name(&self) -> &str {
            "counting"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn repeat_embeds_hit_the_cache() {
        let cached = CachedProvider::new(
            CountingEmbedder {
                calls: AtomicUsize::new(0),
            },
            16,
        );
        cached.embed("phishing risk").unwrap();
        cached.embed("phishing risk").unwrap();
        cached.embed("phishing risk").unwrap();
        assert_eq!(cached.inner.calls.load(Ordering::SeqCst), 1);
    }
}
