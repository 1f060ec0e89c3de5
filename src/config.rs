//! Configuration handling.
//!
//! This module loads `sales_report.toml`, layers environment variables on
//! top of it and finally applies explicit command-line flags. The resolved
//! [`Config`] is built once at startup and handed to every stage.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::ArtifactPaths;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "sales_report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Remote publishing settings.
    #[serde(default)]
    pub publish: PublishConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Delete generated files once the run finishes.
    #[serde(default)]
    pub clean_output: bool,
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Folder holding the raw CSV extracts.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Cleaned-data artifact.
    #[serde(default = "default_cleaned_csv")]
    pub cleaned_csv: PathBuf,

    /// Folder receiving charts and the PDF report.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cleaned_csv: default_cleaned_csv(),
            report_dir: default_report_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_cleaned_csv() -> PathBuf {
    PathBuf::from("cleaned_sales_data_2019.csv")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Only records from this year are aggregated.
    #[serde(default = "default_year")]
    pub year: i32,

    /// Product whose bundles are analysed.
    #[serde(default = "default_reference_product")]
    pub reference_product: String,

    /// Number of co-purchased products kept for the bundle chart.
    #[serde(default = "default_top_bundles")]
    pub top_bundles: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            year: default_year(),
            reference_product: default_reference_product(),
            top_bundles: default_top_bundles(),
        }
    }
}

fn default_year() -> i32 {
    2019
}

fn default_reference_product() -> String {
    "AAA Batteries (4-pack)".to_string()
}

fn default_top_bundles() -> usize {
    5
}

/// Remote publishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Upload the cleaned data and report after the run.
    #[serde(default)]
    pub enabled: bool,

    /// Destination bucket. Required when `enabled` is set.
    #[serde(default)]
    pub bucket: Option<String>,

    /// Bucket region used for request signing.
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom S3-compatible endpoint; uses path-style addressing when set.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Upload timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket: None,
            region: default_region(),
            endpoint: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Interpret an optional flag value: `"true"` in any case is true, any
/// other value is false, and an absent value falls back to `default`.
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        Some(raw) => raw.trim().eq_ignore_ascii_case("true"),
        None => default,
    }
}

/// Read a boolean flag from the environment.
pub fn env_flag(name: &str, default: bool) -> bool {
    parse_flag(std::env::var(name).ok().as_deref(), default)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Apply environment variables on top of file settings.
    ///
    /// `AWS_UPLOAD` and `CLEAN_OUTPUT` keep the file value when unset.
    pub fn apply_env(&mut self) {
        self.publish.enabled = env_flag("AWS_UPLOAD", self.publish.enabled);
        self.general.clean_output = env_flag("CLEAN_OUTPUT", self.general.clean_output);

        if let Some(bucket) = env_string("AWS_S3_BUCKET") {
            self.publish.bucket = Some(bucket);
        }
        if let Some(region) = env_string("AWS_REGION") {
            self.publish.region = region;
        }
        if let Some(endpoint) = env_string("S3_ENDPOINT") {
            self.publish.endpoint = Some(endpoint);
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over file and environment settings.
    /// Only values the user actually passed override anything.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.paths.data_dir = data_dir.clone();
        }
        if let Some(ref cleaned) = args.cleaned_output {
            self.paths.cleaned_csv = cleaned.clone();
        }
        if let Some(ref report_dir) = args.report_dir {
            self.paths.report_dir = report_dir.clone();
        }

        if let Some(year) = args.year {
            self.analysis.year = year;
        }
        if let Some(ref product) = args.reference_product {
            self.analysis.reference_product = product.clone();
        }

        if args.upload {
            self.publish.enabled = true;
        }
        if let Some(ref bucket) = args.bucket {
            self.publish.bucket = Some(bucket.clone());
        }

        // Flags always override
        if args.clean_output {
            self.general.clean_output = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Artifact locations derived from the path settings.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths::new(&self.paths.cleaned_csv, &self.paths.report_dir)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
