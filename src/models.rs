//! Data models for the sales pipeline.
//!
//! This module contains the raw table produced by ingestion, the typed
//! cleaned record, and the small value types shared by the analysis and
//! report stages.

use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Column holding the order identifier.
pub const ORDER_ID: &str = "Order ID";
/// Column holding the product name.
pub const PRODUCT: &str = "Product";
/// Column holding the ordered quantity.
pub const QUANTITY_ORDERED: &str = "Quantity Ordered";
/// Column holding the unit price.
pub const PRICE_EACH: &str = "Price Each";
/// Column holding the order timestamp.
pub const ORDER_DATE: &str = "Order Date";
/// Column holding the free-text purchase address.
pub const PURCHASE_ADDRESS: &str = "Purchase Address";

/// Columns the cleaner needs to find in the raw table.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_ID,
    PRODUCT,
    QUANTITY_ORDERED,
    PRICE_EACH,
    ORDER_DATE,
    PURCHASE_ADDRESS,
];

/// Header of the cleaned-data artifact, in serialization order.
pub const CLEANED_HEADERS: [&str; 10] = [
    ORDER_ID,
    PRODUCT,
    QUANTITY_ORDERED,
    PRICE_EACH,
    ORDER_DATE,
    PURCHASE_ADDRESS,
    "YearMonth",
    "Month",
    "City",
    "Sales",
];

/// One input file that contributed rows to a [`RawTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path of the file that was read.
    pub path: PathBuf,
    /// Column names in the order the file declared them.
    pub columns: Vec<String>,
    /// Number of data rows read from the file.
    pub rows: usize,
}

/// The unified, untyped table built from every input file.
///
/// Columns are the union of all file headers in first-seen order. A row
/// from a file that lacks a column holds no value for it.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Unified column names.
    pub columns: Vec<String>,
    /// Row cells, positionally aligned with `columns`. Rows may be shorter
    /// than `columns`; trailing cells are then missing.
    pub rows: Vec<Vec<Option<String>>>,
    /// Files that were read, in discovery order.
    pub sources: Vec<SourceFile>,
}

impl RawTable {
    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value of a cell, `None` when missing.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }

    /// Whether every unified column of the row holds a value.
    pub fn row_is_complete(&self, row: usize) -> bool {
        (0..self.columns.len()).all(|column| self.cell(row, column).is_some())
    }
}

/// Calendar bucket used for monthly aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Bucket containing the given timestamp.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::new(timestamp.year(), timestamp.month())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A fully typed sales line item after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity Ordered")]
    pub quantity: u32,
    #[serde(rename = "Price Each")]
    pub price_each: Decimal,
    #[serde(rename = "Order Date", serialize_with = "serialize_timestamp")]
    pub order_date: NaiveDateTime,
    #[serde(rename = "Purchase Address")]
    pub purchase_address: String,
    #[serde(rename = "YearMonth")]
    pub period: YearMonth,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Sales")]
    pub sales: Decimal,
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format("%Y-%m-%d %H:%M:%S"))
}

/// Revenue total for one grouping key.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueTotal<K> {
    pub key: K,
    pub revenue: Decimal,
}

/// Unit volume for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVolume {
    pub product: String,
    pub units: u64,
}

/// How often a product was bought together with the reference product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePartner {
    pub product: String,
    pub orders: usize,
}

/// All aggregate views computed for one analysis year.
#[derive(Debug, Clone)]
pub struct SalesAnalysis {
    /// Year the records were restricted to.
    pub year: i32,
    /// Number of records that fell inside the year.
    pub records: usize,
    /// Revenue per month, chronological.
    pub monthly: Vec<RevenueTotal<YearMonth>>,
    /// Revenue per city label, in first-seen order.
    pub cities: Vec<RevenueTotal<String>>,
    /// Units per product, highest volume first.
    pub products: Vec<ProductVolume>,
    /// Product bundled with.
    pub reference_product: String,
    /// Top co-purchased partners of the reference product.
    pub bundles: Vec<BundlePartner>,
}

impl SalesAnalysis {
    /// Month with the highest revenue. Ties go to the earliest month.
    pub fn best_month(&self) -> Option<&RevenueTotal<YearMonth>> {
        max_revenue(&self.monthly)
    }

    /// City with the highest revenue. Ties go to the first city seen.
    pub fn best_city(&self) -> Option<&RevenueTotal<String>> {
        max_revenue(&self.cities)
    }

    /// Product with the most units sold.
    pub fn top_product(&self) -> Option<&ProductVolume> {
        self.products.first()
    }
}

fn max_revenue<K>(totals: &[RevenueTotal<K>]) -> Option<&RevenueTotal<K>> {
    totals.iter().fold(None, |best, total| match best {
        Some(current) if current.revenue >= total.revenue => Some(current),
        _ => Some(total),
    })
}

/// Paths of every artifact a run writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub cleaned_csv: PathBuf,
    pub report_dir: PathBuf,
    pub monthly_chart: PathBuf,
    pub city_chart: PathBuf,
    pub product_chart: PathBuf,
    pub bundle_chart: PathBuf,
    pub report_pdf: PathBuf,
}

impl ArtifactPaths {
    /// Lay out artifact paths under the given cleaned file and report folder.
    pub fn new(cleaned_csv: impl Into<PathBuf>, report_dir: impl Into<PathBuf>) -> Self {
        let report_dir = report_dir.into();
        Self {
            cleaned_csv: cleaned_csv.into(),
            monthly_chart: report_dir.join("monthly_sales.png"),
            city_chart: report_dir.join("city_sales.png"),
            product_chart: report_dir.join("best_selling_products.png"),
            bundle_chart: report_dir.join("batteries_bundling.png"),
            report_pdf: report_dir.join("Sales_Report.pdf"),
            report_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn total(key: &str, revenue: &str) -> RevenueTotal<String> {
        RevenueTotal {
            key: key.to_string(),
            revenue: Decimal::from_str(revenue).unwrap(),
        }
    }

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::new(2019, 1);
        let dec = YearMonth::new(2018, 12);
        assert_eq!(jan.to_string(), "2019-01");
        assert!(dec < jan);

        let ts = NaiveDate::from_ymd_opt(2019, 4, 19)
            .unwrap()
            .and_hms_opt(8, 46, 0)
            .unwrap();
        assert_eq!(YearMonth::of(&ts), YearMonth::new(2019, 4));
    }

    #[test]
    fn test_raw_table_short_rows_are_missing() {
        let table = RawTable {
            columns: vec!["a".into(), "b".into()],
            rows: vec![
                vec![Some("1".into()), Some("2".into())],
                vec![Some("1".into())],
                vec![Some("1".into()), None],
            ],
            sources: Vec::new(),
        };

        assert!(table.row_is_complete(0));
        assert!(!table.row_is_complete(1));
        assert!(!table.row_is_complete(2));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.column_index("b"), Some(1));
    }

    #[test]
    fn test_max_revenue_prefers_first_on_tie() {
        let totals = vec![total("A", "10"), total("B", "30"), total("C", "30.00")];
        assert_eq!(max_revenue(&totals).map(|t| t.key.as_str()), Some("B"));
        assert!(max_revenue::<String>(&[]).is_none());
    }

    #[test]
    fn test_artifact_paths_layout() {
        let paths = ArtifactPaths::new("cleaned.csv", "reports");
        assert_eq!(paths.report_pdf, PathBuf::from("reports/Sales_Report.pdf"));
        assert_eq!(paths.monthly_chart, PathBuf::from("reports/monthly_sales.png"));
        assert_eq!(paths.cleaned_csv, PathBuf::from("cleaned.csv"));
    }
}
