//! Loading of historical price series from JSON files.
//!
//! Files have the shape `{ "data": [ { "date", "open", "high", "low",
//! "close", "volume" }, ... ] }`. Bars are returned in file order.

use std::path::Path;

use tracing::{info, warn};

use crate::Result;
use crate::models::tick::{MarketDataFile, PricePoint};

/// Reads and parses a market-data file.
///
/// # Errors
///
/// Returns [`TickdeckError::Io`](crate::TickdeckError::Io) if the file
/// cannot be read, or [`TickdeckError::Json`](crate::TickdeckError::Json) if
/// it is not a valid market-data document.
pub fn load_market_data(path: &Path) -> Result<Vec<PricePoint>> {
    let contents = std::fs::read_to_string(path)?;
    let series = parse_market_data(&contents)?;
    info!(path = %path.display(), bars = series.len(), "Loaded market data");
    Ok(series)
}

/// Parses a market-data document already held in memory.
///
/// # Errors
///
/// Returns [`TickdeckError::Json`](crate::TickdeckError::Json) on malformed
/// input.
pub fn parse_market_data(json: &str) -> Result<Vec<PricePoint>> {
    let file: MarketDataFile = serde_json::from_str(json)?;
    if file.data.is_empty() {
        warn!("Market data file contains no bars");
    }
    Ok(file.data)
}
