//! Discovery of CSV extracts inside the data folder.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;
use walkdir::WalkDir;

/// Extension a file must carry to be ingested.
const CSV_SUFFIX: &str = ".csv";

/// Finds the CSV files directly inside one folder.
///
/// Subfolders are not descended into. Files come back sorted by name so
/// the stacked row order is the same on every run.
pub struct CsvScanner {
    root: PathBuf,
}

impl CsvScanner {
    /// Create a scanner for the given folder.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List matching files.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(anyhow::anyhow!(
                "Data folder not found: {}",
                self.root.display()
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry
                .with_context(|| format!("Failed to list {}", self.root.display()))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if Self::matches(&name) {
                files.push(entry.into_path());
            } else {
                debug!("Skipping non-CSV file: {}", name);
            }
        }

        Ok(files)
    }

    /// Check if a file name qualifies as an extract.
    fn matches(name: &str) -> bool {
        name.ends_with(CSV_SUFFIX)
    }
}
