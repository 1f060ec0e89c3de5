//! Typed errors for the pipeline stages.
//!
//! Stage boundaries convert these into `anyhow::Error` with context; the
//! variants exist so callers and tests can match on what went wrong.

use std::path::PathBuf;
use thiserror::Error;

/// A purchase address that does not follow `street, city, state zip, country`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("expected at least 3 comma-separated segments, found {0}")]
    TooFewSegments(usize),
    #[error("city segment is empty")]
    MissingCity,
    #[error("state segment is empty")]
    MissingState,
}

/// Failures of the cleaning stage.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("input is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("failed to write cleaned data to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Failures of chart rendering and report assembly.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no cleaned records fall within analysis year {year}")]
    NoData { year: i32 },
    #[error("failed to load chart font")]
    Font,
    #[error("failed to render chart {path}: {message}")]
    Chart { path: PathBuf, message: String },
    #[error("failed to load chart image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: printpdf::image_crate::ImageError,
    },
    #[error("failed to build PDF document")]
    Pdf(#[from] printpdf::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures of a single object-storage upload.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("upload request failed: {0}")]
    Upload(String),
}
