//! Persistence for tracked applications

use crate::career::tracker::ApplicationRecord;
use crate::error::{JobFitError, Result};
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Storage backend for the application tracker.
///
/// `load` never fails: a store that cannot be read is reported as empty.
pub trait TrackerStore: Send + Sync {
    fn load(&self) -> Vec<ApplicationRecord>;
    fn save(&self, records: &[ApplicationRecord]) -> Result<()>;
}

/// Pretty-printed JSON array in a single file, rewritten on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TrackerStore for JsonFileStore {
    fn load(&self) -> Vec<ApplicationRecord> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No tracker file at {}", self.path.display());
                return Vec::new();
            }
            Err(e) => {
                warn!("Cannot read tracker file {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Tracker file {} is malformed, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[ApplicationRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content).map_err(|e| {
            JobFitError::Tracker(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::career::tracker::ApplicationStatus;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(company: &str) -> ApplicationRecord {
        ApplicationRecord {
            company: company.to_string(),
            role: "Data Analyst".to_string(),
            status: ApplicationStatus::Applied,
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("applications.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("applications.json");
        let store = JsonFileStore::new(&path);

        store.save(&[record("Acme"), record("Globex")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"status\": \"applied\""));
        assert!(content.contains("\"date\": \"2026-03-14\""));
        assert_eq!(store.load(), vec![record("Acme"), record("Globex")]);
    }

    #[test]
    fn test_malformed_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("applications.json");

        for content in ["not json", "{\"company\": \"Acme\"}", "[{\"company\": 1}]"] {
            fs::write(&path, content).unwrap();
            assert!(JsonFileStore::new(&path).load().is_empty());
        }
    }
}
