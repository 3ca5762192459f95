//! Interchangeable text similarity providers

use crate::config::Config;
use crate::error::{JobFitError, Result};
use crate::processing::embeddings::{cosine_similarity, try_load_model, EmbeddingSettings, ModelLoad};
use crate::processing::tfidf;
use log::warn;
use std::sync::OnceLock;

pub const LEXICAL_PROVIDER: &str = "lexical-tfidf";

/// `similarity(a, b)` in [0, 1].
pub trait SimilarityProvider: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f64>;
    fn name(&self) -> &str;
}

/// TF-IDF cosine fit on the two texts being compared.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSimilarity;

impl SimilarityProvider for LexicalSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        Ok(tfidf::lexical_similarity(a, b))
    }

    fn name(&self) -> &str {
        LEXICAL_PROVIDER
    }
}

type Loader = Box<dyn Fn() -> ModelLoad + Send + Sync>;

/// Dense embedding similarity that silently falls back to [`LexicalSimilarity`].
///
/// The model is loaded on first use. That first outcome, loaded or not, is
/// kept for the life of the provider and never retried. Concurrent first
/// callers wait for the single in-flight attempt.
pub struct SemanticSimilarity {
    loader: Loader,
    state: OnceLock<ModelLoad>,
    fallback: LexicalSimilarity,
}

impl SemanticSimilarity {
    pub fn new(settings: EmbeddingSettings) -> Self {
        Self::with_loader(Box::new(move || try_load_model(&settings)))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(EmbeddingSettings::from_config(config))
    }

    pub fn with_loader(loader: Loader) -> Self {
        Self {
            loader,
            state: OnceLock::new(),
            fallback: LexicalSimilarity,
        }
    }

    /// Provider whose load outcome is already known.
    pub fn with_load(load: ModelLoad) -> Self {
        log_unavailable(&load);
        Self {
            loader: Box::new(|| ModelLoad::Unavailable("load outcome fixed at construction".to_string())),
            state: OnceLock::from(load),
            fallback: LexicalSimilarity,
        }
    }

    fn state(&self) -> &ModelLoad {
        self.state.get_or_init(|| {
            let load = (self.loader)();
            log_unavailable(&load);
            load
        })
    }

    pub fn is_dense(&self) -> bool {
        self.state().is_loaded()
    }

    /// Why the dense path is off, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self.state() {
            ModelLoad::Loaded(_) => None,
            ModelLoad::Unavailable(reason) => Some(reason),
        }
    }
}

fn log_unavailable(load: &ModelLoad) {
    if let ModelLoad::Unavailable(reason) = load {
        warn!("Dense embedding model unavailable, using lexical fallback: {}", reason);
    }
}

impl SimilarityProvider for SemanticSimilarity {
    fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        match self.state() {
            ModelLoad::Loaded(encoder) => {
                let score = cosine_similarity(&encoder.encode(a), &encoder.encode(b))?;
                if !score.is_finite() {
                    return Err(JobFitError::Embedding(format!(
                        "non-finite similarity from {}",
                        encoder.model_name()
                    )));
                }
                Ok(f64::from(score).clamp(0.0, 1.0))
            }
            ModelLoad::Unavailable(_) => self.fallback.similarity(a, b),
        }
    }

    fn name(&self) -> &str {
        match self.state() {
            ModelLoad::Loaded(encoder) => encoder.model_name(),
            ModelLoad::Unavailable(_) => self.fallback.name(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{BrokenEncoder, LetterEncoder};
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lexical_provider() {
        let provider = LexicalSimilarity;
        assert_eq!(provider.name(), LEXICAL_PROVIDER);
        assert_eq!(provider.similarity("", "").unwrap(), 0.0);
        assert!(provider.similarity("python sql", "python excel").unwrap() > 0.0);
    }

    #[test]
    fn test_dense_path_used_when_loaded() {
        let provider = SemanticSimilarity::with_load(ModelLoad::Loaded(Box::new(LetterEncoder)));

        assert!(provider.is_dense());
        assert_eq!(provider.name(), "letter-test-encoder");

        // Anagrams share no TF-IDF terms but have identical letter counts
        let dense = provider.similarity("listen", "silent").unwrap();
        assert!((dense - 1.0).abs() < 1e-6);
        assert_eq!(LexicalSimilarity.similarity("listen", "silent").unwrap(), 0.0);
    }

    #[test]
    fn test_unavailable_falls_back_to_lexical() {
        let provider =
            SemanticSimilarity::with_load(ModelLoad::Unavailable("no weights".to_string()));

        assert!(!provider.is_dense());
        assert_eq!(provider.name(), LEXICAL_PROVIDER);
        assert_eq!(provider.unavailable_reason(), Some("no weights"));

        let a = "python sql dashboards";
        let b = "sql dashboards for finance";
        assert_eq!(
            provider.similarity(a, b).unwrap(),
            LexicalSimilarity.similarity(a, b).unwrap()
        );
    }

    #[test]
    fn test_load_attempted_once_even_after_failure() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = SemanticSimilarity::with_loader(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ModelLoad::Unavailable("offline".to_string())
        }));

        for _ in 0..5 {
            provider.similarity("rust", "rust developer").unwrap();
        }
        assert!(!provider.is_dense());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_callers_share_one_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = Arc::new(SemanticSimilarity::with_loader(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            ModelLoad::Loaded(Box::new(LetterEncoder))
        })));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = Arc::clone(&provider);
                thread::spawn(move || provider.similarity("abc", "cab").unwrap())
            })
            .collect();

        for handle in handles {
            assert!((handle.join().unwrap() - 1.0).abs() < 1e-6);
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let provider = SemanticSimilarity::with_load(ModelLoad::Loaded(Box::new(BrokenEncoder)));
        assert!(provider.similarity("a", "ab").is_err());
    }
}
