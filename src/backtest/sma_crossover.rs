//! Fast/slow simple moving average crossover.

use tracing::warn;

use super::{CrossoverAxis, run_crossover};
use crate::indicators::{IndicatorSeries, sma};
use crate::models::tick::{PricePoint, closes};
use crate::models::trade::Trade;

/// Buys when the fast SMA crosses above the slow SMA and sells on the
/// opposite crossing.
///
/// Returns an empty log when `prices` is empty, `fast > slow`, or either
/// period does not fit the series.
pub fn sma_crossover(
    prices: &[PricePoint],
    fast: usize,
    slow: usize,
    starting_capital: f64,
) -> Vec<Trade> {
    if prices.is_empty() || fast > slow {
        warn!(fast, slow, len = prices.len(), "Invalid SMA crossover parameters");
        return Vec::new();
    }

    let close = closes(prices);
    let fast_sma = sma(fast, &close);
    let slow_sma = sma(slow, &close);
    if fast_sma.is_empty() || slow_sma.is_empty() {
        return Vec::new();
    }

    let axis = CrossoverAxis::new(
        IndicatorSeries::new(fast - 1, fast_sma),
        IndicatorSeries::new(slow - 1, slow_sma),
    );
    run_crossover(prices, &[axis], starting_capital)
}
