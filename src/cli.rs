//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset fall back to the config
//! file and environment.

use clap::Parser;
use std::path::PathBuf;

/// sales-report - turn raw sales CSV extracts into a PDF report
///
/// Reads every CSV file in the data folder, cleans the records, writes a
/// cleaned dataset, renders four charts and assembles a PDF summary.
///
/// Examples:
///   sales-report
///   sales-report --data-dir ./extracts --year 2019
///   sales-report --upload --bucket my-sales-bucket
///   sales-report --inspect
///   sales-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Folder holding the raw CSV extracts
    #[arg(short, long, value_name = "DIR", env = "SALES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for sales_report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to write the cleaned dataset
    #[arg(long, value_name = "FILE")]
    pub cleaned_output: Option<PathBuf>,

    /// Folder receiving the charts and the PDF report
    #[arg(short, long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Year the analysis is restricted to
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Product whose bundles are analysed
    #[arg(long, value_name = "NAME")]
    pub reference_product: Option<String>,

    /// Upload the cleaned data and report to object storage
    #[arg(long)]
    pub upload: bool,

    /// Destination bucket for uploads
    #[arg(long, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Delete generated files after the run
    #[arg(long)]
    pub clean_output: bool,

    /// Print a profile of the raw input and exit
    #[arg(long)]
    pub inspect: bool,

    /// Generate a default sales_report.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Two-digit years in the timestamp format map onto this window
        if let Some(year) = self.year {
            if !(1970..=2069).contains(&year) {
                return Err(format!("Year must be between 1970 and 2069, got {}", year));
            }
        }

        if let Some(ref product) = self.reference_product {
            if product.trim().is_empty() {
                return Err("Reference product must not be empty".to_string());
            }
        }

        if let Some(ref data_dir) = self.data_dir {
            if data_dir.exists() && !data_dir.is_dir() {
                return Err(format!(
                    "Data path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
