//! Input manager for handling different file types

use crate::error::{JobFitError, Result};
use crate::input::file_detector::{FileType, SUPPORTED_EXTENSIONS};
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A named text read from disk, named by its file name.
pub type NamedText = (String, String);

pub struct InputManager {
    cache: HashMap<PathBuf, String>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(path) {
                debug!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        if !path.exists() {
            return Err(JobFitError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let text = match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await?
            }
            FileType::Text => {
                debug!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await?
            }
            FileType::Markdown => {
                debug!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await?
            }
            FileType::Unknown => {
                return Err(JobFitError::UnsupportedFormat(format!(
                    "{} (supported: {})",
                    path.display(),
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), text.clone());
        }

        Ok(text)
    }

    /// Every supported file directly inside `dir`, sorted by file name.
    /// Unsupported files are skipped.
    pub async fn extract_dir(&mut self, dir: &Path) -> Result<Vec<NamedText>> {
        if !dir.is_dir() {
            return Err(JobFitError::InvalidInput(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if FileType::from_path(&path).is_supported() {
                paths.push(path);
            } else {
                debug!("Skipping unsupported file: {}", path.display());
            }
        }
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let text = self.extract_text(&path).await?;
            documents.push((file_name(&path), text));
        }

        info!("Read {} documents from {}", documents.len(), dir.display());
        Ok(documents)
    }

    /// Files are read as-is and directories are expanded with [`extract_dir`](Self::extract_dir).
    pub async fn extract_many(&mut self, paths: &[PathBuf]) -> Result<Vec<NamedText>> {
        let mut documents = Vec::new();
        for path in paths {
            if path.is_dir() {
                documents.extend(self.extract_dir(path).await?);
            } else {
                let text = self.extract_text(path).await?;
                documents.push((file_name(path), text));
            }
        }
        Ok(documents)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
