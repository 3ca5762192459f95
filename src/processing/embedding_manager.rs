//! Catalogue of Model2Vec embedding models and their local installation

use crate::error::{JobFitError, Result};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const DEFAULT_MODEL_ID: &str = "potion-base-8M";

/// A model folder is usable once these are present.
const REQUIRED_FILES: [&str; 2] = ["model.safetensors", "tokenizer.json"];
const OPTIONAL_FILES: [&str; 2] = ["config.json", "README.md"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    /// Short id, also the folder name under the models directory
    pub id: String,
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub dimensions: u32,
    pub description: String,
}

/// Known models, default first.
pub fn catalogue() -> Vec<EmbeddingModelInfo> {
    let model = |id: &str, name: &str, repo_id: &str, size_mb: u64, dimensions: u32, description: &str| {
        EmbeddingModelInfo {
            id: id.to_string(),
            name: name.to_string(),
            repo_id: repo_id.to_string(),
            size_mb,
            dimensions,
            description: description.to_string(),
        }
    };

    vec![
        model(
            DEFAULT_MODEL_ID,
            "Potion Base 8M",
            "minishlab/potion-base-8M",
            33,
            256,
            "Compact static embeddings, good quality for their size",
        ),
        model(
            "m2v-base",
            "Model2Vec Base",
            "minishlab/M2V_base_output",
            90,
            256,
            "Original Model2Vec base distillation",
        ),
        model(
            "m2v-large",
            "Model2Vec Large",
            "minishlab/M2V_large_output",
            250,
            512,
            "Larger distillation for higher accuracy",
        ),
    ]
}

/// Downloads, lists and removes embedding models under one directory
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: Vec<EmbeddingModelInfo>,
}

impl EmbeddingModelManager {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            available_models: catalogue(),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn list_available_models(&self) -> &[EmbeddingModelInfo] {
        &self.available_models
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.available_models.iter().find(|m| m.id == model_id)
    }

    /// Accepts a short id, a hub repo id or a display name (case-insensitive).
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        let input = input.trim();
        let input_lower = input.to_lowercase();

        self.available_models
            .iter()
            .find(|m| m.id == input)
            .or_else(|| self.available_models.iter().find(|m| m.repo_id == input))
            .or_else(|| {
                self.available_models
                    .iter()
                    .find(|m| m.name.to_lowercase() == input_lower || m.id.to_lowercase() == input_lower)
            })
            .map(|m| m.id.clone())
    }

    pub fn model_path(&self, model_id: &str) -> PathBuf {
        self.models_dir.join(model_id)
    }

    pub async fn is_model_downloaded(&self, model_id: &str) -> bool {
        is_complete_model_dir(&self.model_path(model_id)).await
    }

    /// Ids of catalogue models present locally, in catalogue order.
    pub async fn list_downloaded_models(&self) -> Vec<String> {
        let mut downloaded = Vec::new();
        for model in &self.available_models {
            if self.is_model_downloaded(&model.id).await {
                downloaded.push(model.id.clone());
            }
        }
        downloaded
    }

    /// Fetch a model's files from the Hugging Face hub into `<models_dir>/<id>`.
    pub async fn download_model(&self, model_id: &str) -> Result<PathBuf> {
        let model_info = self
            .get_model_info(model_id)
            .ok_or_else(|| JobFitError::ModelNotFound(format!("Unknown embedding model: {}", model_id)))?;

        let model_dir = self.model_path(model_id);
        if self.is_model_downloaded(model_id).await {
            info!("Embedding model {} already present at {}", model_id, model_dir.display());
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );
        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| JobFitError::Network(format!("Failed to initialize Hugging Face API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                JobFitError::Network(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("Downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                    info!("Downloaded {}", file);
                }
                Err(e) => warn!("Optional file {} not available: {}", file, e),
            }
        }

        info!("Embedding model {} ready at {}", model_id, model_dir.display());
        Ok(model_dir)
    }

    /// Delete a local model folder. Returns false when it was not there.
    pub async fn remove_model(&self, model_id: &str) -> Result<bool> {
        if self.get_model_info(model_id).is_none() {
            return Err(JobFitError::ModelNotFound(format!("Unknown embedding model: {}", model_id)));
        }

        let model_dir = self.model_path(model_id);
        if fs::metadata(&model_dir).await.is_err() {
            return Ok(false);
        }

        fs::remove_dir_all(&model_dir).await?;
        info!("Removed embedding model {}", model_id);
        Ok(true)
    }
}

async fn is_complete_model_dir(path: &Path) -> bool {
    for file in REQUIRED_FILES {
        if fs::metadata(path.join(file)).await.is_err() {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn fake_install(manager: &EmbeddingModelManager, model_id: &str) {
        let dir = manager.model_path(model_id);
        fs::create_dir_all(&dir).await.unwrap();
        for file in REQUIRED_FILES {
            fs::write(dir.join(file), b"{}").await.unwrap();
        }
    }

    #[test]
    fn test_catalogue_default_first() {
        let manager = EmbeddingModelManager::new("unused");
        let ids: Vec<&str> = manager.list_available_models().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![DEFAULT_MODEL_ID, "m2v-base", "m2v-large"]);
    }

    #[test]
    fn test_resolve_model_id() {
        let manager = EmbeddingModelManager::new("unused");

        assert_eq!(manager.resolve_model_id("potion-base-8M"), Some(DEFAULT_MODEL_ID.to_string()));
        assert_eq!(
            manager.resolve_model_id("minishlab/potion-base-8M"),
            Some(DEFAULT_MODEL_ID.to_string())
        );
        assert_eq!(manager.resolve_model_id("model2vec large"), Some("m2v-large".to_string()));
        assert_eq!(manager.resolve_model_id("gpt-4"), None);
    }

    #[tokio::test]
    async fn test_downloaded_detection_requires_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path());

        assert!(manager.list_downloaded_models().await.is_empty());

        let partial = manager.model_path("m2v-base");
        fs::create_dir_all(&partial).await.unwrap();
        fs::write(partial.join("tokenizer.json"), b"{}").await.unwrap();
        assert!(!manager.is_model_downloaded("m2v-base").await);

        fake_install(&manager, DEFAULT_MODEL_ID).await;
        assert_eq!(manager.list_downloaded_models().await, vec![DEFAULT_MODEL_ID.to_string()]);
    }

    #[tokio::test]
    async fn test_remove_model() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path());
        fake_install(&manager, DEFAULT_MODEL_ID).await;

        assert!(manager.remove_model(DEFAULT_MODEL_ID).await.unwrap());
        assert!(!manager.is_model_downloaded(DEFAULT_MODEL_ID).await);
        assert!(!manager.remove_model(DEFAULT_MODEL_ID).await.unwrap());
        assert!(matches!(
            manager.remove_model("unknown").await,
            Err(JobFitError::ModelNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_download_unknown_model_fails_without_network() {
        let temp_dir = TempDir::new().unwrap();
        let manager = EmbeddingModelManager::new(temp_dir.path());
        assert!(matches!(
            manager.download_model("not-a-model").await,
            Err(JobFitError::ModelNotFound(_))
        ));
    }
}
