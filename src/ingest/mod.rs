//! Ingestion of raw CSV extracts.
//!
//! The scanner finds the input files; the reader parses them and stacks
//! their rows into one [`RawTable`](crate::models::RawTable).

pub mod reader;
pub mod scanner;

pub use reader::ingest_csvs;
