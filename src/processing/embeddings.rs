//! Dense sentence embeddings using Model2Vec

use crate::config::Config;
use crate::error::{JobFitError, Result};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Anything that turns text into a fixed-size dense vector.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, text: &str) -> Vec<f32>;
    fn model_name(&self) -> &str;
}

/// Outcome of the one-time model load.
pub enum ModelLoad {
    Loaded(Box<dyn TextEncoder>),
    Unavailable(String),
}

impl ModelLoad {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelLoad::Loaded(_))
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub models_dir: PathBuf,
    pub model: String,
    pub enabled: bool,
    pub load_timeout: Duration,
}

impl EmbeddingSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            models_dir: config.models.models_dir.clone(),
            model: config.models.embedding_model.clone(),
            enabled: config.models.enable_dense,
            load_timeout: Duration::from_secs(config.models.load_timeout_secs),
        }
    }

    /// Local model folder when one has been downloaded, otherwise the hub repo id.
    pub fn resolve_source(&self) -> PathBuf {
        let repo_name = self.model.rsplit('/').next().unwrap_or(&self.model);

        for candidate in [self.models_dir.join(repo_name), self.models_dir.join(&self.model)] {
            if candidate.exists() {
                return candidate;
            }
        }

        PathBuf::from(&self.model)
    }
}

/// Model2Vec encoder with a per-text embedding cache
pub struct EmbeddingEngine {
    model: StaticModel,
    model_name: String,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingEngine {
    pub fn load(source: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", source.display());

        let model = StaticModel::from_pretrained(
            source,
            None, // token
            None, // normalize
            None, // subfolder
        )?;

        info!("Embedding model loaded in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
            cache: Mutex::new(HashMap::new()),
        })
    }
}

impl TextEncoder for EmbeddingEngine {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut cache = self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(embedding) = cache.get(text) {
            return embedding.clone();
        }

        let embedding = self.model.encode_single(text);
        cache.insert(text.to_string(), embedding.clone());
        embedding
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Attempt to load the configured model once.
///
/// The load runs on a helper thread and is abandoned after `load_timeout`;
/// any failure, including slowness, is reported as `Unavailable`.
pub fn try_load_model(settings: &EmbeddingSettings) -> ModelLoad {
    if !settings.enabled {
        return ModelLoad::Unavailable("dense embeddings disabled in configuration".to_string());
    }

    let source = settings.resolve_source();
    let model_name = settings.model.clone();
    debug!("Resolved embedding model source: {}", source.display());

    load_with_timeout(settings.load_timeout, move || {
        let engine = EmbeddingEngine::load(&source, &model_name)?;
        Ok(Box::new(engine) as Box<dyn TextEncoder>)
    })
}

/// Run `load` on a helper thread and wait at most `timeout` for it.
/// An error, a panic or a timeout all become `Unavailable`.
pub fn load_with_timeout<F>(timeout: Duration, load: F) -> ModelLoad
where
    F: FnOnce() -> Result<Box<dyn TextEncoder>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("embedding-loader".to_string())
        .spawn(move || {
            // The receiver may have given up already
            let _ = tx.send(load());
        });

    if let Err(e) = spawned {
        return ModelLoad::Unavailable(format!("failed to start model loader: {}", e));
    }

    match rx.recv_timeout(timeout) {
        Ok(Ok(encoder)) => ModelLoad::Loaded(encoder),
        Ok(Err(e)) => ModelLoad::Unavailable(e.to_string()),
        Err(RecvTimeoutError::Timeout) => ModelLoad::Unavailable(format!(
            "model load did not finish within {:?}",
            timeout
        )),
        Err(RecvTimeoutError::Disconnected) => {
            ModelLoad::Unavailable("model loader stopped without a result".to_string())
        }
    }
}

/// Cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(JobFitError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}
