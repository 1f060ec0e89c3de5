//! Removal of generated output.

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::models::ArtifactPaths;

const GENERATED_EXTENSIONS: [&str; 2] = ["png", "pdf"];

/// Files a cleanup pass would remove: the cleaned dataset plus every chart
/// and PDF directly inside the report folder.
pub fn generated_files(paths: &ArtifactPaths) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if paths.cleaned_csv.is_file() {
        files.push(paths.cleaned_csv.clone());
    }

    if paths.report_dir.is_dir() {
        let entries = WalkDir::new(&paths.report_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| has_generated_extension(p));
        files.extend(entries);
    }

    files
}

fn has_generated_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| GENERATED_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Delete generated files. Failures are logged and skipped.
///
/// Returns the paths that were actually removed.
pub fn clean_generated_files(paths: &ArtifactPaths) -> Vec<PathBuf> {
    info!("Cleaning generated output files...");

    let mut removed = Vec::new();
    for path in generated_files(paths) {
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted: {}", path.display());
                removed.push(path);
            }
            Err(e) => warn!("Could not delete {}: {}", path.display(), e),
        }
    }

    removed
}
