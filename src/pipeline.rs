//! The end-to-end run: ingest, clean, analyse, report, publish, clean up.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::analysis::analyze;
use crate::clean::process_data;
use crate::cleanup::clean_generated_files;
use crate::config::Config;
use crate::ingest::ingest_csvs;
use crate::models::ArtifactPaths;
use crate::publish::{publish_artifacts, PublishOutcome, Publisher, S3Publisher};
use crate::report::generate_charts_and_report;

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub analysed_rows: usize,
    pub artifacts: ArtifactPaths,
    pub uploads: PublishOutcome,
    pub removed: Vec<PathBuf>,
}

/// Run the pipeline, publishing through S3 when enabled.
///
/// The object storage client is only built when publishing is switched on.
pub async fn run(config: &Config, show_progress: bool) -> Result<RunSummary> {
    if config.publish.enabled {
        let publisher = S3Publisher::new(&config.publish).await;
        run_with(config, Some(&publisher), show_progress).await
    } else {
        run_with::<S3Publisher>(config, None, show_progress).await
    }
}

/// Run the pipeline with an explicit publisher.
///
/// Ingestion, cleaning and report errors are fatal. Publishing and cleanup
/// problems are only logged.
pub async fn run_with<P: Publisher>(
    config: &Config,
    publisher: Option<&P>,
    show_progress: bool,
) -> Result<RunSummary> {
    let artifacts = config.artifact_paths();

    info!("Ingesting CSV files...");
    let table = ingest_csvs(&config.paths.data_dir, show_progress)
        .with_context(|| format!("Failed to ingest {}", config.paths.data_dir.display()))?;

    info!("Cleaning and processing data...");
    if let Some(parent) = artifacts.cleaned_csv.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let records = process_data(&table, &artifacts.cleaned_csv)?;

    info!("Analyzing and generating charts/report...");
    let analysis = analyze(
        &records,
        config.analysis.year,
        &config.analysis.reference_product,
        config.analysis.top_bundles,
    );
    generate_charts_and_report(&analysis, &artifacts)
        .context("Failed to generate charts and report")?;

    let uploads = match publisher {
        Some(publisher) => publish_artifacts(publisher, &config.publish, &artifacts).await,
        None => PublishOutcome::default(),
    };

    let removed = if config.general.clean_output {
        clean_generated_files(&artifacts)
    } else {
        Vec::new()
    };

    Ok(RunSummary {
        raw_rows: table.len(),
        cleaned_rows: records.len(),
        analysed_rows: analysis.records,
        artifacts,
        uploads,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PublishError, ReportError};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingPublisher {
        keys: Mutex<Vec<String>>,
    }

    impl Publisher for RecordingPublisher {
        async fn upload(&self, _local: &Path, _bucket: &str, key: &str) -> Result<(), PublishError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn fixture_config(out: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/sales");
        config.paths.cleaned_csv = out.path().join("cleaned_sales_data_2019.csv");
        config.paths.report_dir = out.path().join("reports");
        config
    }

    #[tokio::test]
    async fn test_run_produces_artifacts() {
        let out = TempDir::new().unwrap();
        let config = fixture_config(&out);

        let summary = run_with::<RecordingPublisher>(&config, None, false)
            .await
            .unwrap();

        assert_eq!(summary.raw_rows, 15);
        assert_eq!(summary.cleaned_rows, 12);
        assert_eq!(summary.analysed_rows, 11);
        assert_eq!(summary.uploads, PublishOutcome::default());
        assert!(summary.removed.is_empty());

        let cleaned = std::fs::read_to_string(&summary.artifacts.cleaned_csv).unwrap();
        assert_eq!(cleaned.lines().count(), 13);
        assert!(cleaned.contains("Dallas (TX)"));
        assert!(summary.artifacts.report_pdf.exists());
        assert!(summary.artifacts.bundle_chart.exists());
    }

    #[tokio::test]
    async fn test_run_publishes_and_cleans_up() {
        let out = TempDir::new().unwrap();
        let mut config = fixture_config(&out);
        config.publish.enabled = true;
        config.publish.bucket = Some("sales".to_string());
        config.general.clean_output = true;
        let publisher = RecordingPublisher::default();

        let summary = run_with(&config, Some(&publisher), false).await.unwrap();

        assert_eq!(summary.uploads, PublishOutcome { attempted: 2, succeeded: 2 });
        assert_eq!(
            *publisher.keys.lock().unwrap(),
            vec!["data/cleaned_sales_data_2019.csv", "reports/Sales_Report.pdf"]
        );
        // Cleaned data, four charts and the report
        assert_eq!(summary.removed.len(), 6);
        assert!(!summary.artifacts.cleaned_csv.exists());
        assert!(!summary.artifacts.report_pdf.exists());
    }

    #[tokio::test]
    async fn test_run_without_publishing() {
        let out = TempDir::new().unwrap();
        let mut config = fixture_config(&out);
        config.publish.bucket = Some("sales".to_string());

        let summary = run(&config, false).await.unwrap();

        assert_eq!(summary.uploads, PublishOutcome::default());
        assert!(summary.artifacts.report_pdf.exists());
    }

    #[tokio::test]
    async fn test_empty_year_is_fatal_but_keeps_cleaned_data() {
        let out = TempDir::new().unwrap();
        let mut config = fixture_config(&out);
        config.analysis.year = 2018;

        let err = run_with::<RecordingPublisher>(&config, None, false)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::NoData { year: 2018 })
        ));
        assert!(config.paths.cleaned_csv.exists());
    }

    #[tokio::test]
    async fn test_missing_data_dir_is_fatal() {
        let out = TempDir::new().unwrap();
        let mut config = fixture_config(&out);
        config.paths.data_dir = out.path().join("nope");

        assert!(run_with::<RecordingPublisher>(&config, None, false).await.is_err());
    }
}
