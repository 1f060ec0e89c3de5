//! Report generation module.
//!
//! Renders the four bar charts to PNG and assembles them, with short
//! narratives, into a PDF summary.

pub mod charts;
pub mod format;
pub mod generator;

use tracing::info;

use crate::error::ReportError;
use crate::models::{ArtifactPaths, SalesAnalysis};

pub use generator::{build_document, write_pdf};

/// Render every chart and the PDF report for one analysis.
///
/// The report folder is created when missing and existing artifacts are
/// overwritten. An analysis without records fails before anything is
/// drawn.
pub fn generate_charts_and_report(
    analysis: &SalesAnalysis,
    paths: &ArtifactPaths,
) -> Result<(), ReportError> {
    if analysis.records == 0 {
        return Err(ReportError::NoData {
            year: analysis.year,
        });
    }

    std::fs::create_dir_all(&paths.report_dir)?;

    let charts = [
        (charts::monthly_chart(analysis), &paths.monthly_chart),
        (charts::city_chart(analysis), &paths.city_chart),
        (charts::product_chart(analysis), &paths.product_chart),
        (charts::bundle_chart(analysis), &paths.bundle_chart),
    ];
    for (chart, path) in &charts {
        charts::render_bar_chart(chart, path)?;
    }
    info!("Rendered {} charts into {}", charts.len(), paths.report_dir.display());

    let document = build_document(analysis, paths)?;
    write_pdf(&document, &paths.report_pdf)?;
    info!("Report written to {}", paths.report_pdf.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BundlePartner, ProductVolume, RevenueTotal, YearMonth};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn analysis(records: usize) -> SalesAnalysis {
        SalesAnalysis {
            year: 2019,
            records,
            monthly: vec![RevenueTotal {
                key: YearMonth::new(2019, 4),
                revenue: Decimal::new(2398, 2),
            }],
            cities: vec![RevenueTotal {
                key: "Dallas (TX)".to_string(),
                revenue: Decimal::new(2398, 2),
            }],
            products: vec![ProductVolume {
                product: "USB-C Charging Cable".to_string(),
                units: 2,
            }],
            reference_product: "AAA Batteries (4-pack)".to_string(),
            bundles: Vec::new(),
        }
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("cleaned.csv"), dir.path().join("out"));
        let mut analysis = analysis(1);
        analysis.bundles.push(BundlePartner {
            product: "Wired Headphones".to_string(),
            orders: 1,
        });

        generate_charts_and_report(&analysis, &paths).unwrap();

        for path in [
            &paths.monthly_chart,
            &paths.city_chart,
            &paths.product_chart,
            &paths.bundle_chart,
            &paths.report_pdf,
        ] {
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    #[test]
    fn test_generate_rejects_empty_year() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::new(dir.path().join("cleaned.csv"), dir.path().join("out"));

        let result = generate_charts_and_report(&analysis(0), &paths);

        assert!(matches!(result, Err(ReportError::NoData { year: 2019 })));
        assert!(!paths.report_pdf.exists());
    }
}
