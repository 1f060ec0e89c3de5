//! Cleaning and normalization of the raw table.
//!
//! Rows pass through a fixed sequence of filters and coercions. A row is
//! either turned into a fully typed [`CleanedRecord`] or dropped; no
//! record ever carries a missing field.

pub mod address;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::CleanError;
use crate::models::{
    CleanedRecord, RawTable, YearMonth, CLEANED_HEADERS, ORDER_DATE, ORDER_ID, PRICE_EACH,
    PRODUCT, PURCHASE_ADDRESS, QUANTITY_ORDERED,
};
pub use address::Address;

/// Pattern of the order timestamp in the raw extracts.
pub const ORDER_DATE_FORMAT: &str = "%m/%d/%y %H:%M";

/// Per-reason counts of dropped rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub raw_rows: usize,
    pub missing_values: usize,
    pub header_rows: usize,
    pub bad_quantity: usize,
    pub bad_price: usize,
    pub bad_timestamp: usize,
    pub bad_address: usize,
    pub cleaned_rows: usize,
}

impl CleanStats {
    /// Total rows removed.
    pub fn dropped(&self) -> usize {
        self.raw_rows - self.cleaned_rows
    }
}

/// Column positions of the required fields.
struct Columns {
    order_id: usize,
    product: usize,
    quantity: usize,
    price: usize,
    order_date: usize,
    address: usize,
}

impl Columns {
    fn locate(table: &RawTable) -> Result<Self, CleanError> {
        let find = |name: &'static str| {
            table
                .column_index(name)
                .ok_or(CleanError::MissingColumn(name))
        };

        Ok(Self {
            order_id: find(ORDER_ID)?,
            product: find(PRODUCT)?,
            quantity: find(QUANTITY_ORDERED)?,
            price: find(PRICE_EACH)?,
            order_date: find(ORDER_DATE)?,
            address: find(PURCHASE_ADDRESS)?,
        })
    }
}

/// Coerce a quantity cell. Negative or non-integer values fail.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// Coerce a unit-price cell. Negative values fail.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|price| !price.is_sign_negative())
}

/// Parse an order timestamp using [`ORDER_DATE_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), ORDER_DATE_FORMAT).ok()
}

/// Turn the raw table into cleaned records.
pub fn clean(table: &RawTable) -> Result<(Vec<CleanedRecord>, CleanStats), CleanError> {
    let mut stats = CleanStats {
        raw_rows: table.len(),
        ..CleanStats::default()
    };

    if table.is_empty() {
        return Ok((Vec::new(), stats));
    }

    let columns = Columns::locate(table)?;
    let mut records = Vec::with_capacity(table.len());

    for row in 0..table.len() {
        if !table.row_is_complete(row) {
            stats.missing_values += 1;
            continue;
        }

        // Complete rows hold a value in every column
        let cell = |column: usize| table.cell(row, column).unwrap_or_default();

        let order_id = cell(columns.order_id);
        if order_id == ORDER_ID {
            stats.header_rows += 1;
            continue;
        }

        let quantity = parse_quantity(cell(columns.quantity));
        let price = parse_price(cell(columns.price));
        let order_date = parse_timestamp(cell(columns.order_date));

        let Some(order_date) = order_date else {
            stats.bad_timestamp += 1;
            continue;
        };
        let Some(quantity) = quantity else {
            stats.bad_quantity += 1;
            continue;
        };
        let Some(price_each) = price else {
            stats.bad_price += 1;
            continue;
        };

        let raw_address = cell(columns.address);
        let city = match Address::parse(raw_address) {
            Ok(address) => address.city_label(),
            Err(e) => {
                debug!("Dropping row {} with address '{}': {}", row, raw_address, e);
                stats.bad_address += 1;
                continue;
            }
        };

        records.push(CleanedRecord {
            order_id: order_id.to_string(),
            product: cell(columns.product).to_string(),
            quantity,
            price_each,
            order_date,
            purchase_address: raw_address.to_string(),
            period: YearMonth::of(&order_date),
            month: order_date.month(),
            city,
            sales: Decimal::from(quantity) * price_each,
        });
    }

    stats.cleaned_rows = records.len();
    Ok((records, stats))
}

/// Write cleaned records to `path`, replacing any previous file.
pub fn write_cleaned(records: &[CleanedRecord], path: &Path) -> Result<(), CleanError> {
    let to_error = |source: csv::Error| CleanError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(to_error)?;

    writer.write_record(CLEANED_HEADERS).map_err(to_error)?;
    for record in records {
        writer.serialize(record).map_err(to_error)?;
    }
    writer.flush().map_err(|e| to_error(e.into()))?;

    Ok(())
}

/// Clean the raw table, persist the result and return it.
pub fn process_data(table: &RawTable, output: &Path) -> Result<Vec<CleanedRecord>> {
    let (records, stats) = clean(table).context("Failed to clean raw sales data")?;

    info!(
        "Cleaned {} of {} rows (dropped {}: {} missing values, {} header rows, {} bad quantity, {} bad price, {} bad timestamp, {} bad address)",
        stats.cleaned_rows,
        stats.raw_rows,
        stats.dropped(),
        stats.missing_values,
        stats.header_rows,
        stats.bad_quantity,
        stats.bad_price,
        stats.bad_timestamp,
        stats.bad_address
    );

    write_cleaned(&records, output)?;
    info!("Cleaned data written to {}", output.display());

    Ok(records)
}
