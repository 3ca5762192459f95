//! CLI interface for jobfit

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jobfit")]
#[command(about = "ATS resume scoring, job posting summaries and application tracking")]
#[command(long_about = "Score resumes against job descriptions the way an applicant tracking system would, compress postings with ScaleDown, and keep track of applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: console, json, markdown (defaults to the configured format)
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Save output to file instead of printing it
    #[arg(short, long, global = true)]
    pub save: Option<PathBuf>,

    /// Disable colored console output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Skip the embedding model and score with TF-IDF only
    #[arg(long, global = true)]
    pub lexical: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a resume against a job description
    Score {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file (PDF, TXT, MD)
        #[arg(short, long)]
        job: PathBuf,

        /// Show every component of the score
        #[arg(short, long)]
        detailed: bool,
    },

    /// Summarize one or more postings with ScaleDown
    Compress {
        /// Posting files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Fraction of sentences to keep (defaults to the configured ratio)
        #[arg(long)]
        ratio: Option<f64>,
    },

    /// Rank many postings for one resume
    Bulk {
        #[arg(short, long)]
        resume: PathBuf,

        /// Posting files or directories
        #[arg(required = true)]
        postings: Vec<PathBuf>,
    },

    /// Score a resume against every supported file in a directory
    Corpus {
        #[arg(short, long)]
        resume: PathBuf,

        /// Directory of job descriptions
        dir: PathBuf,
    },

    /// Score, tailor the resume and summarize the job description
    Review {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long)]
        job: PathBuf,
    },

    /// Build a full application packet: score, tailored resume and cover letter
    Packet {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long)]
        job: PathBuf,

        #[arg(long)]
        company: String,

        #[arg(long)]
        role: String,
    },

    /// Write a cover letter for a posting
    CoverLetter {
        #[arg(short, long)]
        resume: PathBuf,

        #[arg(short, long)]
        job: PathBuf,

        #[arg(long)]
        company: String,

        #[arg(long)]
        role: String,
    },

    /// STAR interview questions for a job description
    Interview {
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Job-board search links for a job description
    Links {
        #[arg(short, long)]
        job: PathBuf,

        #[arg(short, long, default_value = crate::career::links::DEFAULT_LOCATION)]
        location: String,
    },

    /// Salary negotiation tips for a role title
    Salary {
        role: String,
    },

    /// Outcomes from applicants who used the tailoring workflow
    Stories,

    /// Track job applications
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum TrackAction {
    /// Record a new application
    Add {
        company: String,
        role: String,

        /// saved, applied, interview, offer, rejected or hired
        #[arg(long, default_value = "applied")]
        status: String,
    },

    /// Change the status of an application
    Update {
        company: String,
        role: String,
        status: String,
    },

    /// List applications, newest first
    List,

    /// Share of applications that reached interview
    Rate,

    /// Project the conversion rate after a relative lift
    Report {
        /// Target lift in percent
        #[arg(long, default_value_t = 40.0)]
        lift: f64,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List available models
    List,

    /// Download a model
    Download {
        /// Model id, display name or HuggingFace repo ID
        model: String,
    },

    /// Remove a downloaded model
    Remove {
        model: String,
    },

    /// Show model information
    Info {
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err(format!("File has no extension: {}", path.display())),
    }
}

pub fn validate_keep_ratio(ratio: f64) -> Result<f64, String> {
    if ratio > 0.0 && ratio <= 1.0 {
        Ok(ratio)
    } else {
        Err(format!("Keep ratio must be in (0, 1], got {}", ratio))
    }
}
