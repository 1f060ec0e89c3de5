//! Profile of the raw input, printed by `--inspect`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use crate::clean::parse_timestamp;
use crate::models::{RawTable, YearMonth, ORDER_DATE, ORDER_ID};

/// Row and column counts of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProfile {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// Summary of the stacked raw table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetProfile {
    pub files: Vec<FileProfile>,
    pub total_rows: usize,
    pub missing_by_column: Vec<(String, usize)>,
    /// Present order IDs that are not all digits, usually leaked headers.
    pub non_numeric_order_ids: usize,
    pub years: BTreeSet<i32>,
    pub records_per_month: BTreeMap<YearMonth, usize>,
}

/// Build the profile of a raw table.
pub fn profile(table: &RawTable) -> DatasetProfile {
    let files = table
        .sources
        .iter()
        .map(|source| FileProfile {
            name: source
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| source.path.display().to_string()),
            rows: source.rows,
            columns: source.columns.len(),
        })
        .collect();

    let missing_by_column = table
        .columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let missing = (0..table.len())
                .filter(|&row| table.cell(row, col).is_none())
                .count();
            (name.clone(), missing)
        })
        .collect();

    let non_numeric_order_ids = table
        .column_index(ORDER_ID)
        .map(|col| {
            (0..table.len())
                .filter_map(|row| table.cell(row, col))
                .filter(|id| !id.chars().all(|c| c.is_ascii_digit()))
                .count()
        })
        .unwrap_or(0);

    let mut years = BTreeSet::new();
    let mut records_per_month = BTreeMap::new();
    if let Some(col) = table.column_index(ORDER_DATE) {
        for timestamp in (0..table.len())
            .filter_map(|row| table.cell(row, col))
            .filter_map(parse_timestamp)
        {
            let period = YearMonth::of(&timestamp);
            years.insert(period.year);
            *records_per_month.entry(period).or_insert(0) += 1;
        }
    }

    DatasetProfile {
        files,
        total_rows: table.len(),
        missing_by_column,
        non_numeric_order_ids,
        years,
        records_per_month,
    }
}

/// Render the profile as plain text.
pub fn render(profile: &DatasetProfile) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Found {} CSV files.", profile.files.len());
    for file in &profile.files {
        let _ = writeln!(
            out,
            "  - {} ({} rows, {} columns)",
            file.name, file.rows, file.columns
        );
    }

    let _ = writeln!(out, "\nCombined rows: {}", profile.total_rows);

    let _ = writeln!(out, "\nMissing values per column:");
    for (column, missing) in &profile.missing_by_column {
        let _ = writeln!(out, "  {}: {}", column, missing);
    }

    if profile.non_numeric_order_ids > 0 {
        let _ = writeln!(
            out,
            "\nFound {} non-numeric Order IDs (possibly header rows mixed in).",
            profile.non_numeric_order_ids
        );
    }

    let years: Vec<String> = profile.years.iter().map(|y| y.to_string()).collect();
    let _ = writeln!(
        out,
        "\nData includes records from the following years: {}",
        years.join(", ")
    );

    let _ = writeln!(out, "\nRecord count per year and month:");
    for (period, count) in &profile.records_per_month {
        let _ = writeln!(out, "  {}: {} records", period, count);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourceFile;
    use std::path::PathBuf;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect()
    }

    fn table() -> RawTable {
        RawTable {
            columns: vec!["Order ID".into(), "Product".into(), "Order Date".into()],
            rows: vec![
                cells(&["176558", "USB-C Charging Cable", "04/19/19 08:46"]),
                cells(&["", "", ""]),
                cells(&["Order ID", "Product", "Order Date"]),
                cells(&["176560", "Google Phone", "04/12/19 14:38"]),
                cells(&["295665", "Macbook Pro Laptop", "12/30/19 00:01"]),
                cells(&["319631", "34in Ultrawide Monitor", "01/01/20 03:07"]),
            ],
            sources: vec![
                SourceFile {
                    path: PathBuf::from("data/Sales_April_2019.csv"),
                    columns: vec!["Order ID".into(), "Product".into(), "Order Date".into()],
                    rows: 4,
                },
                SourceFile {
                    path: PathBuf::from("data/Sales_December_2019.csv"),
                    columns: vec!["Order ID".into(), "Product".into(), "Order Date".into()],
                    rows: 2,
                },
            ],
        }
    }

    #[test]
    fn test_profile_counts() {
        let profile = profile(&table());

        assert_eq!(profile.files.len(), 2);
        assert_eq!(profile.files[0].name, "Sales_April_2019.csv");
        assert_eq!(profile.files[0].rows, 4);
        assert_eq!(profile.total_rows, 6);
        assert_eq!(profile.missing_by_column[0], ("Order ID".to_string(), 1));
        assert_eq!(profile.non_numeric_order_ids, 1);
        assert_eq!(profile.years.iter().copied().collect::<Vec<_>>(), vec![2019, 2020]);

        let months: Vec<_> = profile
            .records_per_month
            .iter()
            .map(|(p, c)| (p.to_string(), *c))
            .collect();
        assert_eq!(
            months,
            vec![
                ("2019-04".to_string(), 2),
                ("2019-12".to_string(), 1),
                ("2020-01".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_render_mentions_sections() {
        let text = render(&profile(&table()));

        assert!(text.contains("Found 2 CSV files."));
        assert!(text.contains("Sales_April_2019.csv (4 rows, 3 columns)"));
        assert!(text.contains("Found 1 non-numeric Order IDs"));
        assert!(text.contains("following years: 2019, 2020"));
        assert!(text.contains("  2019-04: 2 records"));
    }

    #[test]
    fn test_profile_of_empty_table() {
        let profile = profile(&RawTable::default());
        assert_eq!(profile.total_rows, 0);
        assert!(profile.years.is_empty());
        assert!(render(&profile).contains("Found 0 CSV files."));
    }
}
