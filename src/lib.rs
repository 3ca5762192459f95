//! jobfit library: ATS scoring, ScaleDown summaries and application tracking

pub mod career;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod metrics;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{JobFitError, Result};
