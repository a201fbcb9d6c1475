//! Volume-weighted average price.

use tracing::warn;

use crate::models::tick::PricePoint;

/// Cumulative VWAP of closing prices, one value per bar from bar 0.
///
/// Returns an empty vector for empty input, when the first bar has no
/// volume, or when any bar reports a negative volume.
///
/// ```
/// use tickdeck::models::tick::PricePoint;
///
/// let bar = PricePoint {
///     date: "2024-01-02".into(),
///     open: 10.0,
///     high: 10.0,
///     low: 10.0,
///     close: 10.0,
///     volume: 5,
/// };
/// assert_eq!(tickdeck::indicators::vwap(&[bar]), vec![10.0]);
/// ```
pub fn vwap(prices: &[PricePoint]) -> Vec<f64> {
    match prices.first() {
        None => {
            warn!("VWAP requested for empty series");
            return Vec::new();
        }
        Some(first) if first.volume == 0 => {
            warn!(date = %first.date, "VWAP first bar has zero volume");
            return Vec::new();
        }
        Some(_) => {}
    }
    if let Some(bad) = prices.iter().find(|p| p.volume < 0) {
        warn!(date = %bad.date, volume = bad.volume, "VWAP input has negative volume");
        return Vec::new();
    }

    let mut weighted = 0.0;
    let mut volume = 0.0;
    prices
        .iter()
        .map(|p| {
            weighted += p.close * p.volume as f64;
            volume += p.volume as f64;
            weighted / volume
        })
        .collect()
}
