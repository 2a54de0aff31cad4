//! Scrape-Herald main entry point
//!
//! This is the command-line interface for the Scrape-Herald page reporter.

use anyhow::Context;
use clap::Parser;
use scrape_herald::config::{load_config, validate, Config};
use scrape_herald::{ConsoleReporter, HeraldError, Pipeline, Reporter, WebhookReporter};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape-Herald: a single-page SEO reporter
///
/// Fetches each page, extracts its metadata and SEO signals, and posts one
/// report per page to a Discord webhook.
#[derive(Parser, Debug)]
#[command(name = "scrape-herald")]
#[command(version = "1.0.0")]
#[command(about = "Scrape a page and report its SEO signals to a webhook", long_about = None)]
struct Cli {
    /// Pages to scrape; read as a comma-separated list from stdin when omitted
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Webhook endpoint, overriding the configuration file
    #[arg(long, env = "DISCORD_WEBHOOK_URL", hide_env_values = true)]
    webhook_url: Option<String>,

    /// Per-request fetch timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Retries after the first fetch attempt
    #[arg(long)]
    retries: Option<u32>,

    /// Print reports to stdout instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let targets = if cli.urls.is_empty() {
        match read_targets_from_stdin() {
            Ok(targets) => targets,
            Err(e) => {
                tracing::error!("{:#}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        cli.urls.clone()
    };

    if targets.is_empty() {
        tracing::error!("No URLs given");
        return ExitCode::from(2);
    }

    if cli.dry_run {
        tracing::info!("Dry run: reports are printed instead of delivered");
        return run_all(config, ConsoleReporter, &targets).await;
    }

    let reporter = match WebhookReporter::new(&config.webhook) {
        Ok(reporter) => reporter,
        Err(e) => {
            tracing::error!("{} (use --webhook-url, DISCORD_WEBHOOK_URL or --dry-run)", e);
            return ExitCode::from(2);
        }
    };

    run_all(config, reporter, &targets).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// The returned guard flushes the log file on drop and must outlive every
/// log call.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrape_herald=info,warn"),
            1 => EnvFilter::new("scrape_herald=debug,info"),
            2 => EnvFilter::new("scrape_herald=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Loads the configuration file (if any), applies CLI overrides, validates
fn resolve_config(cli: &Cli) -> Result<Config, HeraldError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.webhook_url {
        config.webhook.url = Some(url.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetch.timeout_ms = timeout_ms;
    }
    if let Some(retries) = cli.retries {
        config.fetch.max_retries = retries;
    }

    validate(&config)?;
    Ok(config)
}

/// Splits a comma-separated list into trimmed, non-empty targets
fn split_targets(line: &str) -> Vec<String> {
    line.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_targets_from_stdin() -> anyhow::Result<Vec<String>> {
    eprintln!("Enter URLs to scrape, separated by commas:");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read URLs from stdin")?;
    Ok(split_targets(&line))
}

/// Runs every target independently; one failure never stops the others
async fn run_all<R: Reporter>(config: Config, reporter: R, targets: &[String]) -> ExitCode {
    let pipeline = match Pipeline::new(config, reporter) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut failures = 0usize;
    for target in targets {
        if let Err(e) = pipeline.run(target).await {
            tracing::error!("Run for {} failed: {}", target, e);
            failures += 1;
        }
    }

    if failures > 0 {
        tracing::error!("{} of {} run(s) failed", failures, targets.len());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
