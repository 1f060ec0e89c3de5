//! Parsing and stacking of CSV extracts.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::scanner::CsvScanner;
use crate::models::{RawTable, SourceFile};

/// Cell values read as missing, besides the empty string.
///
/// These are the tokens pandas treats as NA when reading CSV.
const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell holds no value.
pub fn is_missing(field: &str) -> bool {
    field.is_empty() || MISSING_TOKENS.contains(&field)
}

/// Read every CSV extract in `dir` into one table.
///
/// An empty folder gives an empty table.
pub fn ingest_csvs(dir: &Path, show_progress: bool) -> Result<RawTable> {
    let files = CsvScanner::new(dir).scan()?;
    info!("Found {} CSV files in {}", files.len(), dir.display());
    read_files(&files, show_progress)
}

/// Read the given files, in order, into one table.
pub fn read_files(files: &[PathBuf], show_progress: bool) -> Result<RawTable> {
    let pb = if show_progress && !files.is_empty() {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut table = RawTable::default();

    for path in files {
        if let Some(ref pb) = pb {
            pb.set_message(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );
        }

        append_file(&mut table, path)?;

        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Ingestion complete");
    }

    info!(
        "Ingested {} rows across {} columns",
        table.len(),
        table.columns.len()
    );

    Ok(table)
}

/// Parse one file and append its rows to the table.
fn append_file(table: &mut RawTable, path: &Path) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(String::from)
        .collect();

    // Position of each file column inside the unified column list
    let mapping: Vec<usize> = headers
        .iter()
        .map(|name| match table.column_index(name) {
            Some(index) => index,
            None => {
                table.columns.push(name.clone());
                table.columns.len() - 1
            }
        })
        .collect();

    let mut rows = 0usize;
    for (line, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Malformed CSV in {} at record {}", path.display(), line + 1))?;

        if record.len() > headers.len() {
            return Err(anyhow::anyhow!(
                "{} record {} has {} fields, header declares {}",
                path.display(),
                line + 1,
                record.len(),
                headers.len()
            ));
        }

        let mut row: Vec<Option<String>> = vec![None; table.columns.len()];
        for (field, &target) in record.iter().zip(mapping.iter()) {
            if !is_missing(field) {
                row[target] = Some(field.to_string());
            }
        }

        table.rows.push(row);
        rows += 1;
    }

    debug!("Read {} rows from {}", rows, path.display());

    table.sources.push(SourceFile {
        path: path.to_path_buf(),
        columns: headers,
        rows,
    });

    Ok(())
}
