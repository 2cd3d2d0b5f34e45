use clap::Parser;
use colored::*;
use eyre::{Context, Result, bail};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use cli::Cli;
use clonehub::clone::{BatchCloner, BatchResult, CloneOutcome, GitCloner};
use clonehub::listing::{GitHubLister, SourceLister, resolve_token};
use clonehub::progress::{BarProgress, ProgressReporter};
use config::Config;

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clonehub")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("clonehub.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(username) = &cli.username {
        config.github.username = Some(username.clone());
    }
    if cli.include_forks {
        config.github.include_forks = true;
    }
    if let Some(directory) = &cli.directory {
        config.clone.directory = directory.clone();
    }
    if let Some(workers) = cli.workers {
        config.clone.workers = workers;
    }
    if let Some(retries) = cli.retries {
        config.clone.retries = retries;
    }
    if let Some(delay) = cli.retry_delay_secs {
        config.clone.retry_delay_secs = delay;
    }
    if let Some(timeout) = cli.attempt_timeout_secs {
        config.clone.attempt_timeout_secs = Some(timeout);
    }
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let Some(username) = config.github.username.as_deref() else {
        bail!("No username given; pass --username or set github.username in the config file");
    };

    let token = resolve_token(Some(cli.token.as_str())).context("Failed to load GitHub token")?;
    if token.is_some() {
        info!("Using GitHub token");
    }

    let target_dir = &config.clone.directory;
    if target_dir.exists() {
        bail!("Directory {} already exists", target_dir.display());
    }

    let git = GitCloner::new()
        .program(config.clone.git_program.clone())
        .timeout(config.attempt_timeout());
    let version = git
        .check_installed()
        .await
        .context("Unable to find or run git. Please check installation and permissions")?;
    info!("Using {}", version);

    let lister = GitHubLister::new(config.github_config())?;
    let sources = lister
        .list_sources(username, token.as_deref())
        .await
        .context(format!("Failed to list repositories of {}", username))?;
    println!("{} {} public repositories of {}", "Found".green(), sources.len(), username);

    let mut cloner = BatchCloner::new(Arc::new(git), config.batch_config());
    if cli.show_progress {
        let progress: Arc<dyn ProgressReporter> = Arc::new(BarProgress::new());
        cloner = cloner.with_progress(progress);
    }

    let result = cloner
        .run(&sources, target_dir)
        .await
        .context(format!("Failed to clone into {}", target_dir.display()))?;

    print_report(&result);
    Ok(())
}

fn print_report(result: &BatchResult) {
    for report in result.iter() {
        match &report.outcome {
            CloneOutcome::Success { .. } => {
                println!("  {} {}", "ok".green(), report.task.local_name());
            }
            CloneOutcome::Failure { reason, attempts_made } => {
                println!(
                    "  {} {} ({} attempts): {}",
                    "failed".red(),
                    report.task.local_name(),
                    attempts_made,
                    reason
                );
            }
        }
    }

    let summary = format!(
        "{} cloned, {} failed, {} total",
        result.success_count(),
        result.failure_count(),
        result.len()
    );
    if result.failure_count() == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    apply_overrides(&cli, &mut config);

    let level = if cli.is_verbose() {
        "debug".to_string()
    } else {
        config.log_level.clone().unwrap_or_else(|| "info".to_string())
    };
    setup_logging(&level).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
