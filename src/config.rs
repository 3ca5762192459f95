//! Configuration management for jobfit

use crate::error::{JobFitError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub scoring: ScoringConfig,
    pub scaledown: ScaleDownConfig,
    pub tracker: TrackerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    /// HuggingFace repo id of the sentence embedding model
    pub embedding_model: String,
    pub enable_dense: bool,
    pub load_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub weights: Weights,
    pub skills: Vec<String>,
    /// Checked in declaration order; the first domain hit by the job description wins.
    pub domains: Vec<DomainTerms>,
}

/// Coefficients of the five ATS score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub semantic: f64,
    pub keyword: f64,
    pub skill: f64,
    pub experience: f64,
    pub section: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTerms {
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleDownConfig {
    pub keep_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.semantic + self.keyword + self.skill + self.experience + self.section
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("semantic", self.semantic),
            ("keyword", self.keyword),
            ("skill", self.skill),
            ("experience", self.experience),
            ("section", self.section),
        ]
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            semantic: 0.35,
            keyword: 0.15,
            skill: 0.30,
            experience: 0.10,
            section: 0.10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".jobfit")
            .join("models");

        let tracker_path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("data"))
            .join("jobfit")
            .join("applications.json");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                enable_dense: true,
                load_timeout_secs: 30,
            },
            scoring: ScoringConfig {
                weights: Weights::default(),
                skills: default_skills(),
                domains: default_domains(),
            },
            scaledown: ScaleDownConfig { keep_ratio: 0.2 },
            tracker: TrackerConfig { path: tracker_path },
            output: OutputConfig {
                format: OutputFormat::Console,
                detailed: false,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str::<Config>(&content)
                .map_err(|e| JobFitError::Configuration(format!("Failed to parse config: {}", e)))?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| JobFitError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("jobfit")
            .join("config.toml")
    }

    /// Reject unusable settings. Weights that don't sum to 1.0 are only reported.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.scoring.weights.named() {
            if !(0.0..=1.0).contains(&value) {
                return Err(JobFitError::Configuration(format!(
                    "Weight '{}' must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let sum = self.scoring.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            warn!("Scoring weights sum to {:.3} instead of 1.0", sum);
        }

        if self.scoring.skills.is_empty() {
            return Err(JobFitError::Configuration(
                "Skill vocabulary must not be empty".to_string(),
            ));
        }

        if !(self.scaledown.keep_ratio > 0.0 && self.scaledown.keep_ratio <= 1.0) {
            return Err(JobFitError::Configuration(format!(
                "ScaleDown keep_ratio must be within (0, 1], got {}",
                self.scaledown.keep_ratio
            )));
        }

        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    pub fn ensure_models_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.models.models_dir)?;
        Ok(())
    }
}

fn default_skills() -> Vec<String> {
    [
        // Data and analytics
        "python", "sql", "excel", "tableau", "power bi", "statistics", "data analysis",
        "dashboard", "etl", "pandas", "numpy",
        // Machine learning
        "machine learning", "deep learning", "tensorflow", "pytorch", "nlp",
        // Software engineering
        "java", "javascript", "typescript", "react", "node.js", "c++", "c#", "rust",
        "api", "git", "linux", "testing",
        // Cloud and infrastructure
        "aws", "azure", "gcp", "docker", "kubernetes", "cloud", "spark", "airflow",
        // Working style
        "communication", "leadership", "agile",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_domains() -> Vec<DomainTerms> {
    let domain = |name: &str, terms: &[&str]| DomainTerms {
        name: name.to_string(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
    };

    vec![
        domain(
            "data",
            &["sql", "excel", "tableau", "power bi", "statistics", "data analysis", "dashboard", "etl"],
        ),
        domain(
            "machine_learning",
            &["machine learning", "deep learning", "tensorflow", "pytorch", "pandas", "numpy", "nlp"],
        ),
        domain(
            "software",
            &["java", "javascript", "typescript", "react", "node.js", "c++", "rust", "api", "testing", "git"],
        ),
        domain("cloud", &["aws", "azure", "gcp", "docker", "kubernetes", "cloud", "linux"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = Config::default();
        assert!((config.scoring.weights.sum() - 1.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_domain_order_is_declaration_order() {
        let config = Config::default();
        let names: Vec<&str> = config.scoring.domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["data", "machine_learning", "software", "cloud"]);
    }

    #[test]
    fn test_round_trip_through_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        // First load writes the defaults
        let written = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.scoring.weights, written.scoring.weights);
        assert_eq!(reloaded.scoring.skills, written.scoring.skills);
        assert_eq!(reloaded.scoring.domains, written.scoring.domains);
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let mut config = Config::default();
        config.scoring.weights.skill = 1.5;
        assert!(matches!(config.validate(), Err(JobFitError::Configuration(_))));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let mut config = Config::default();
        config.scoring.skills.clear();
        assert!(config.validate().is_err());
    }
}
