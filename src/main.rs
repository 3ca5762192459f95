//! jobfit: ATS resume scoring and job search helper

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use jobfit::career::links::job_board_links;
use jobfit::career::packet::{
    personalized_application_packet, salary_negotiation_tips, success_stories,
};
use jobfit::career::templates::{cover_letter, interview_prep};
use jobfit::career::tracker::{AddOutcome, ApplicationTracker};
use jobfit::cli::{self, Cli, Commands, ConfigAction, ModelAction, TrackAction};
use jobfit::config::{Config, OutputFormat};
use jobfit::input::manager::InputManager;
use jobfit::output::formatter::{save_report_to_file, Report, ReportGenerator};
use jobfit::processing::analyzer::AnalysisEngine;
use jobfit::processing::embedding_manager::EmbeddingModelManager;
use jobfit::{JobFitError, Result};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

/// Where and how a command's report ends up.
struct Output {
    format: OutputFormat,
    save: Option<PathBuf>,
    generator: ReportGenerator,
}

impl Output {
    fn emit(&self, report: &Report) -> Result<()> {
        let content = self.generator.generate_report(report, &self.format)?;
        match &self.save {
            Some(path) => {
                save_report_to_file(&content, path)?;
                println!("💾 Report saved to: {}", path.display());
            }
            None => print!("{}", content),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let format = match &cli.output {
        Some(format) => cli::parse_output_format(format).map_err(JobFitError::InvalidInput)?,
        None => config.output.format,
    };
    let detailed = config.output.detailed || matches!(cli.command, Commands::Score { detailed: true, .. });
    let output = Output {
        format,
        save: cli.save,
        generator: ReportGenerator::with_options(
            config.output.color_output && !cli.no_color,
            detailed,
            true,
        ),
    };

    run_command(cli.command, &config, &output, cli.lexical).await
}

async fn run_command(command: Commands, config: &Config, output: &Output, lexical: bool) -> Result<()> {
    let mut input = InputManager::new();

    match command {
        Commands::Score { resume, job, .. } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let job_text = read_document(&mut input, &job, "Job description").await?;

            let engine = build_engine(config, lexical)?;
            info!(
                "Scoring with {} over {} skills",
                engine.scorer().provider_name(),
                engine.scorer().skill_count()
            );
            let breakdown =
                run_blocking(move || engine.scorer().breakdown(&resume_text, &job_text)).await?;
            output.emit(&Report::Score(&breakdown))
        }

        Commands::Compress { inputs, ratio } => {
            let ratio = keep_ratio(ratio, config)?;
            let documents = input.extract_many(&inputs).await?;
            let engine = AnalysisEngine::lexical_only(config)?;

            match documents.as_slice() {
                [] => Err(JobFitError::InvalidInput(
                    "No supported postings found in the given inputs".to_string(),
                )),
                [(_, text)] if inputs.len() == 1 && inputs[0].is_file() => {
                    let result = engine.scaledown().compress(text, ratio);
                    output.emit(&Report::Compression(&result))
                }
                _ => {
                    let postings: Vec<&str> = documents.iter().map(|(_, text)| text.as_str()).collect();
                    let bulk = engine.scaledown().compress_postings(&postings, ratio);
                    output.emit(&Report::BulkCompression(&bulk))
                }
            }
        }

        Commands::Bulk { resume, postings } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let documents = input.extract_many(&postings).await?;
            for (id, (name, _)) in documents.iter().enumerate() {
                info!("Posting {}: {}", id + 1, name);
            }

            let engine = build_engine(config, lexical)?;
            let spinner = spinner(format!("Scoring {} postings", documents.len()));
            let report = run_blocking(move || {
                let texts: Vec<&str> = documents.iter().map(|(_, text)| text.as_str()).collect();
                engine.job_match_bulk(&resume_text, &texts)
            })
            .await;
            spinner.finish_and_clear();
            let report = report?;

            output.emit(&Report::BulkMatch(&report))
        }

        Commands::Corpus { resume, dir } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let documents = input.extract_dir(&dir).await?;

            let engine = build_engine(config, lexical)?;
            let spinner = spinner(format!("Scoring {} job descriptions", documents.len()));
            let matches =
                run_blocking(move || engine.match_corpus(&resume_text, &documents)).await;
            spinner.finish_and_clear();
            let matches = matches?;

            output.emit(&Report::Corpus(&matches))
        }

        Commands::Review { resume, job } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let job_text = read_document(&mut input, &job, "Job description").await?;

            let engine = build_engine(config, lexical)?;
            let review =
                run_blocking(move || engine.resume_review(&resume_text, &job_text)).await?;
            output.emit(&Report::Review(&review))
        }

        Commands::Packet { resume, job, company, role } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let job_text = read_document(&mut input, &job, "Job description").await?;

            let engine = build_engine(config, lexical)?;
            let packet = run_blocking(move || {
                personalized_application_packet(
                    engine.scorer(),
                    &resume_text,
                    &job_text,
                    &company,
                    &role,
                )
            })
            .await??;
            output.emit(&Report::Packet(&packet))
        }

        Commands::CoverLetter { resume, job, company, role } => {
            let resume_text = read_document(&mut input, &resume, "Resume").await?;
            let job_text = read_document(&mut input, &job, "Job description").await?;

            let engine = build_engine(config, lexical)?;
            let result = run_blocking(move || engine.scorer().score(&resume_text, &job_text)).await?;
            let letter = cover_letter(&result, &company, &role)?;
            output.emit(&Report::Letter(&letter))
        }

        Commands::Interview { job } => {
            let job_text = read_document(&mut input, &job, "Job description").await?;
            let prep = interview_prep(&job_text)?;
            output.emit(&Report::Interview(&prep))
        }

        Commands::Links { job, location } => {
            let job_text = read_document(&mut input, &job, "Job description").await?;
            let engine = AnalysisEngine::lexical_only(config)?;
            let links = job_board_links(engine.scorer().extractor(), &job_text, &location);
            output.emit(&Report::Links(&links))
        }

        Commands::Salary { role } => {
            let tips = salary_negotiation_tips(&role);
            output.emit(&Report::Tips(&tips))
        }

        Commands::Stories => {
            let stories = success_stories();
            output.emit(&Report::Tips(&stories))
        }

        Commands::Track { action } => run_track(action, config, output),

        Commands::Models { action } => run_models(action, config).await,

        Commands::Config { action } => run_config(action.unwrap_or(ConfigAction::Show), config),
    }
}

fn run_track(action: TrackAction, config: &Config, output: &Output) -> Result<()> {
    let tracker = ApplicationTracker::from_config(config);

    match action {
        TrackAction::Add { company, role, status } => {
            match tracker.add(&company, &role, &status)? {
                AddOutcome::Added(record) => println!(
                    "✅ Tracking {} at {} ({}, {})",
                    record.role, record.company, record.status, record.date
                ),
                AddOutcome::Duplicate(existing) => println!(
                    "ℹ️  {} at {} is already tracked as {} since {}",
                    existing.role, existing.company, existing.status, existing.date
                ),
            }
            Ok(())
        }
        TrackAction::Update { company, role, status } => {
            if tracker.update_status(&company, &role, &status)? {
                println!("✅ {} at {} is now {}", role, company, status.trim().to_lowercase());
            } else {
                println!("❌ No tracked application for {} at {}", role, company);
            }
            Ok(())
        }
        TrackAction::List => {
            let records = tracker.list();
            output.emit(&Report::Applications(&records))
        }
        TrackAction::Rate => {
            println!("Interview conversion rate: {:.2}%", tracker.interview_conversion_rate());
            Ok(())
        }
        TrackAction::Report { lift } => {
            let report = tracker.conversion_improvement_report(lift);
            output.emit(&Report::Conversion(&report))
        }
    }
}

async fn run_models(action: ModelAction, config: &Config) -> Result<()> {
    let manager = EmbeddingModelManager::new(config.models_dir());

    match action {
        ModelAction::List => {
            let downloaded = manager.list_downloaded_models().await;

            println!("📚 Embedding models");
            println!("===================");
            for model in manager.list_available_models() {
                let status = if downloaded.contains(&model.id) {
                    "✅ Downloaded"
                } else {
                    "⬇️  Available"
                };
                let active = if model.repo_id == config.models.embedding_model {
                    " (configured)"
                } else {
                    ""
                };
                println!("  {} {}{}", status, model.name, active);
                println!("     ID: {}", model.id);
                println!("     Size: {} MB | Dimensions: {}", model.size_mb, model.dimensions);
                println!("     {}", model.description);
                println!();
            }

            if !config.models.enable_dense {
                println!("ℹ️  Dense similarity is disabled in config; scoring uses TF-IDF");
            }
            Ok(())
        }

        ModelAction::Download { model } => {
            let model_id = resolve_model(&manager, &model)?;
            config.ensure_models_dir()?;

            let spinner = spinner(format!("Downloading {}", model_id));
            let result = manager.download_model(&model_id).await;
            spinner.finish_and_clear();

            let path = result?;
            println!("✅ {} ready at {}", model_id, path.display());
            Ok(())
        }

        ModelAction::Remove { model } => {
            let model_id = resolve_model(&manager, &model)?;
            if manager.remove_model(&model_id).await? {
                println!("🗑️  Removed {}", model_id);
            } else {
                println!("ℹ️  {} is not downloaded", model_id);
            }
            Ok(())
        }

        ModelAction::Info { model } => {
            let model_id = resolve_model(&manager, &model)?;
            let info = manager
                .get_model_info(&model_id)
                .ok_or_else(|| JobFitError::ModelNotFound(model_id.clone()))?;
            let downloaded = manager.is_model_downloaded(&model_id).await;

            println!("📋 {}", info.name);
            println!("   ID: {}", info.id);
            println!("   Repository: {}", info.repo_id);
            println!("   Size: {} MB", info.size_mb);
            println!("   Dimensions: {}", info.dimensions);
            println!("   Downloaded: {}", if downloaded { "yes" } else { "no" });
            println!("   Location: {}", manager.model_path(&model_id).display());
            println!("   {}", info.description);
            Ok(())
        }
    }
}

fn run_config(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let content = toml::to_string_pretty(config)
                .map_err(|e| JobFitError::Configuration(format!("Failed to serialize config: {}", e)))?;
            println!("⚙️  Configuration ({})", Config::config_path().display());
            println!();
            println!("{}", content);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
            Ok(())
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("✅ Configuration reset to defaults at {}", Config::config_path().display());
            Ok(())
        }
    }
}

async fn read_document(input: &mut InputManager, path: &Path, label: &str) -> Result<String> {
    cli::validate_file_extension(path, DOCUMENT_EXTENSIONS)
        .map_err(|e| JobFitError::InvalidInput(format!("{} file: {}", label, e)))?;
    input.extract_text(path).await
}

/// Runs on the blocking pool: the first score may wait on the embedding model load.
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| JobFitError::Processing(format!("Scoring task failed: {}", e)))
}

fn build_engine(config: &Config, lexical: bool) -> Result<AnalysisEngine> {
    if lexical || !config.models.enable_dense {
        AnalysisEngine::lexical_only(config)
    } else {
        AnalysisEngine::from_config(config)
    }
}

fn keep_ratio(ratio: Option<f64>, config: &Config) -> Result<f64> {
    match ratio {
        Some(ratio) => cli::validate_keep_ratio(ratio).map_err(JobFitError::InvalidInput),
        None => Ok(config.scaledown.keep_ratio),
    }
}

fn resolve_model(manager: &EmbeddingModelManager, input: &str) -> Result<String> {
    manager.resolve_model_id(input).ok_or_else(|| {
        JobFitError::ModelNotFound(format!(
            "{}. Run 'jobfit models list' to see available models",
            input
        ))
    })
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
