//! MACD crossover confirmed by price crossing VWAP.

use tracing::warn;

use super::{CrossoverAxis, run_crossover};
use crate::indicators::{IndicatorSeries, macd, vwap};
use crate::models::tick::{PricePoint, closes};
use crate::models::trade::Trade;

/// Trades when both the MACD line against its signal line and the close
/// against VWAP have latched the same direction.
///
/// The two crossings may happen on different bars. Returns an empty log when
/// `prices` is empty, `fast > slow`, or the MACD or VWAP series is empty.
pub fn macd_vwap(
    prices: &[PricePoint],
    fast: usize,
    slow: usize,
    signal: usize,
    starting_capital: f64,
) -> Vec<Trade> {
    if prices.is_empty() || fast > slow {
        warn!(fast, slow, len = prices.len(), "Invalid MACD/VWAP parameters");
        return Vec::new();
    }

    let close = closes(prices);
    let m = macd(fast, slow, signal, &close);
    let vw = vwap(prices);
    if m.is_empty() || vw.is_empty() {
        return Vec::new();
    }

    let start = slow + signal - 2;
    let axes = [
        CrossoverAxis::new(
            IndicatorSeries::new(start, m.macd),
            IndicatorSeries::new(start, m.signal),
        ),
        CrossoverAxis::new(IndicatorSeries::new(0, close), IndicatorSeries::new(0, vw)),
    ];
    run_crossover(prices, &axes, starting_capital)
}
