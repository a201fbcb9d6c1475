//! Grid search over strategy parameters.
//!
//! Each combination runs a full backtest. Results are ranked by total PnL,
//! best first; ties go to fewer round trips, then to the order in which the
//! combinations were generated.

use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::info;

use super::{BacktestReport, macd_vwap, sma_crossover};
use crate::models::tick::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmaParams {
    pub fast: usize,
    pub slow: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacdVwapParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// One evaluated parameter combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult<P> {
    pub params: P,
    pub report: BacktestReport,
}

/// Evaluates every `fast < slow` pair. Pairs that produce no trade log are
/// skipped.
pub fn sweep_sma(
    prices: &[PricePoint],
    fast: RangeInclusive<usize>,
    slow: RangeInclusive<usize>,
    starting_capital: f64,
) -> Vec<SweepResult<SmaParams>> {
    let mut results = Vec::new();
    for f in fast.filter(|&f| f > 0) {
        for s in slow.clone().filter(|&s| s > f) {
            let trades = sma_crossover(prices, f, s, starting_capital);
            if trades.is_empty() {
                continue;
            }
            results.push(SweepResult {
                params: SmaParams { fast: f, slow: s },
                report: BacktestReport::from_trades(&trades, starting_capital),
            });
        }
    }
    rank(&mut results);
    info!(evaluated = results.len(), "SMA sweep finished");
    results
}

/// Evaluates every `fast < slow` pair against every signal period.
/// Combinations that produce no trade log are skipped.
pub fn sweep_macd_vwap(
    prices: &[PricePoint],
    fast: RangeInclusive<usize>,
    slow: RangeInclusive<usize>,
    signal: RangeInclusive<usize>,
    starting_capital: f64,
) -> Vec<SweepResult<MacdVwapParams>> {
    let mut results = Vec::new();
    for f in fast.filter(|&f| f > 0) {
        for s in slow.clone().filter(|&s| s > f) {
            for g in signal.clone().filter(|&g| g > 0) {
                let trades = macd_vwap(prices, f, s, g, starting_capital);
                if trades.is_empty() {
                    continue;
                }
                results.push(SweepResult {
                    params: MacdVwapParams {
                        fast: f,
                        slow: s,
                        signal: g,
                    },
                    report: BacktestReport::from_trades(&trades, starting_capital),
                });
            }
        }
    }
    rank(&mut results);
    info!(evaluated = results.len(), "MACD/VWAP sweep finished");
    results
}

fn rank<P>(results: &mut [SweepResult<P>]) {
    // Stable sort keeps generation order among full ties.
    results.sort_by(|a, b| {
        b.report
            .total_pnl
            .total_cmp(&a.report.total_pnl)
            .then(a.report.round_trips.cmp(&b.report.round_trips))
    });
}
