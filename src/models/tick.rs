//! Historical price series models.

use serde::{Deserialize, Serialize};

/// One bar of a historical price series.
///
/// The date is kept as the label found in the source file; it is never
/// parsed into calendar time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Top-level shape of a market-data file: `{ "data": [ ... ] }`.
///
/// Other top-level keys (such as the provider's `meta` block) are ignored.
#[derive(Debug, Deserialize)]
pub struct MarketDataFile {
    pub data: Vec<PricePoint>,
}

/// Extracts the closing prices of a series, in order.
pub fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.close).collect()
}
