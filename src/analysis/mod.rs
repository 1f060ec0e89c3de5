//! Analysis modules.
//!
//! Grouped revenue and volume views plus bundle statistics over the
//! cleaned records of one analysis year.

pub mod aggregator;
pub mod bundles;

pub use aggregator::*;
