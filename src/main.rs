//! sales-report - turn raw sales CSV extracts into a PDF report
//!
//! Reads monthly order extracts, cleans them into a typed dataset, renders
//! revenue and volume charts and assembles a short PDF summary. Optionally
//! uploads the results to S3-compatible storage.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments or a failed run

mod analysis;
mod clean;
mod cleanup;
mod cli;
mod config;
mod error;
mod ingest;
mod inspect;
mod models;
mod pipeline;
mod publish;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config(&args);
    }

    init_logging(&args);

    info!("sales-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.inspect {
        if let Err(e) = handle_inspect(&config, !args.quiet) {
            error!("Inspection failed: {:#}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    let start_time = Instant::now();
    match pipeline::run(&config, !args.quiet).await {
        Ok(summary) => {
            if !args.quiet {
                print_summary(&summary, start_time.elapsed().as_secs_f64());
            }
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default sales_report.toml.
fn handle_init_config(args: &Args) -> Result<()> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created {} with default settings.", path.display());
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging was already initialized");
    }
}

/// Resolve configuration: defaults, then file, then environment, then flags.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        Config::load(config_path)?
    } else {
        match Config::load_default() {
            Ok(Some(config)) => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
                config
            }
            Ok(None) => {
                debug!("No config file found, using defaults");
                Config::default()
            }
            Err(e) => {
                warn!("Failed to load config: {:#}", e);
                Config::default()
            }
        }
    };

    config.apply_env();
    config.merge_with_args(args);
    debug!("Resolved config: {:?}", config);

    Ok(config)
}

/// Handle --inspect: profile the raw input and exit.
fn handle_inspect(config: &Config, show_progress: bool) -> Result<()> {
    let table = ingest::ingest_csvs(&config.paths.data_dir, show_progress)?;
    let profile = inspect::profile(&table);
    print!("{}", inspect::render(&profile));
    Ok(())
}

fn print_summary(summary: &pipeline::RunSummary, duration: f64) {
    let show = |path: &Path| path.display().to_string();

    println!("\nRun Summary:");
    println!(
        "   Rows: {} raw, {} cleaned, {} analysed",
        summary.raw_rows, summary.cleaned_rows, summary.analysed_rows
    );
    println!("   Cleaned data: {}", show(&summary.artifacts.cleaned_csv));
    println!("   Report: {}", show(&summary.artifacts.report_pdf));
    if summary.uploads.attempted > 0 {
        println!(
            "   Uploads: {}/{} succeeded",
            summary.uploads.succeeded, summary.uploads.attempted
        );
    }
    if !summary.removed.is_empty() {
        println!("   Removed {} generated files", summary.removed.len());
    }
    println!("   Duration: {:.1}s", duration);
}
