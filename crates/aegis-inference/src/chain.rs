//! Provider fallback chain: try each provider in priority order, log every
//! fallback, fail only when the whole chain is exhausted.

use tracing::warn;

use aegis_core::errors::{AegisResult, InferenceError};
use aegis_core::traits::ICompletionProvider;

/// Ordered chain of providers. The first available provider that succeeds
/// wins; each skip-over is logged.
pub struct ProviderChain {
    providers: Vec<Box<dyn ICompletionProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a provider to the end of the chain.
    pub fn push(mut self, provider: Box<dyn ICompletionProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    fn try_each<T>(
        &self,
        op: &str,
        call: impl Fn(&dyn ICompletionProvider) -> AegisResult<T>,
    ) -> AegisResult<T> {
        for (i, provider) in self.providers.iter().enumerate() {
            if !provider.is_available() {
                continue;
            }
            match call(provider.as_ref()) {
                Ok(value) => {
                    if i > 0 {
                        warn!(
                            op,
                            fallback = provider.name(),
                            "primary provider unavailable, fell back"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(op, provider = provider.name(), error = %e, "provider failed, trying next");
                }
            }
        }
        Err(InferenceError::ProviderUnavailable {
            provider: format!("all {} providers failed", self.providers.len()),
        }
        .into())
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ICompletionProvider for ProviderChain {
    fn embed(&self, text: &str) -> AegisResult<Vec<f32>> {
        self.try_each("embed", |p| p.embed(text))
    }

    fn complete(&self, prompt: &str) -> AegisResult<String> {
        self.try_each("complete", |p| p.complete(prompt))
    }

    fn name(&self) -> &str {
        "provider-chain"
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashingEmbedder;

    struct DeadProvider;

    impl ICompletionProvider for DeadProvider {
        fn embed(&self, _: &str) -> AegisResult<Vec<f32>> {
            Err(InferenceError::RequestFailed {
                reason: "connection refused".to_string(),
            }
            .into())
        }
        fn complete(&self, _: &str) -> AegisResult<String> {
            Err(InferenceError::RequestFailed {
                reason: "connection refused".to_string(),
            }
            .into())
        }
        fn name(&self) -> &str {
            "dead"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn falls_back_past_failing_provider() {
        let chain = ProviderChain::new()
            .push(Box::new(DeadProvider))
            .push(Box::new(HashingEmbedder::new()));
        let embedding = chain.embed("vendor risk").expect("fallback embeds");
        assert!(!embedding.is_empty());
    }

    #[test]
    fn exhausted_chain_errors() {
        let chain = ProviderChain::new().push(Box::new(DeadProvider));
        assert!(chain.complete("hello").is_err());
    }
}
