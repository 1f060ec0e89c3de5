//! Revenue and volume aggregation.
//!
//! This module restricts cleaned records to the analysis year and
//! computes the grouped views the report is built from.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::bundles::{count_pairs, top_partners};
use crate::models::{CleanedRecord, ProductVolume, RevenueTotal, SalesAnalysis, YearMonth};

/// Records whose order date falls in `year`.
pub fn filter_year(records: &[CleanedRecord], year: i32) -> Vec<CleanedRecord> {
    records
        .iter()
        .filter(|r| r.period.year == year)
        .cloned()
        .collect()
}

/// Revenue per month, chronological.
pub fn revenue_by_month(records: &[CleanedRecord]) -> Vec<RevenueTotal<YearMonth>> {
    let mut totals: BTreeMap<YearMonth, Decimal> = BTreeMap::new();

    for record in records {
        *totals.entry(record.period).or_default() += record.sales;
    }

    totals
        .into_iter()
        .map(|(key, revenue)| RevenueTotal { key, revenue })
        .collect()
}

/// Revenue per city label, in the order cities are first seen.
pub fn revenue_by_city(records: &[CleanedRecord]) -> Vec<RevenueTotal<String>> {
    let mut totals: IndexMap<&str, Decimal> = IndexMap::new();

    for record in records {
        *totals.entry(record.city.as_str()).or_default() += record.sales;
    }

    totals
        .into_iter()
        .map(|(city, revenue)| RevenueTotal {
            key: city.to_string(),
            revenue,
        })
        .collect()
}

/// Units sold per product, highest volume first.
pub fn units_by_product(records: &[CleanedRecord]) -> Vec<ProductVolume> {
    let mut totals: IndexMap<&str, u64> = IndexMap::new();

    for record in records {
        *totals.entry(record.product.as_str()).or_default() += u64::from(record.quantity);
    }

    let mut volumes: Vec<ProductVolume> = totals
        .into_iter()
        .map(|(product, units)| ProductVolume {
            product: product.to_string(),
            units,
        })
        .collect();

    volumes.sort_by_key(|v| std::cmp::Reverse(v.units));
    volumes
}

/// Compute every view for one analysis year.
pub fn analyze(
    records: &[CleanedRecord],
    year: i32,
    reference_product: &str,
    top_bundles: usize,
) -> SalesAnalysis {
    let scoped = filter_year(records, year);
    let pairs = count_pairs(&scoped);

    SalesAnalysis {
        year,
        records: scoped.len(),
        monthly: revenue_by_month(&scoped),
        cities: revenue_by_city(&scoped),
        products: units_by_product(&scoped),
        reference_product: reference_product.to_string(),
        bundles: top_partners(&pairs, reference_product, top_bundles),
    }
}
