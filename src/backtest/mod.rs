//! Crossover backtesting.
//!
//! A strategy is a set of [`CrossoverAxis`]es, each comparing a lead series
//! against a reference series. Each axis latches the direction of its most
//! recent crossover, and a trade fires only when every axis agrees. A
//! decision made on bar `t` executes at the open of bar `t + 1`.

mod macd_vwap;
mod report;
mod sma_crossover;
pub mod sweep;

use tracing::{debug, info};

use crate::indicators::IndicatorSeries;
use crate::models::tick::PricePoint;
use crate::models::trade::{OrderType, Trade};

pub use macd_vwap::macd_vwap;
pub use report::BacktestReport;
pub use sma_crossover::sma_crossover;

/// Latched direction of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    #[default]
    Neutral,
    Bullish,
    Bearish,
}

/// Two aligned series whose crossings drive one signal.
#[derive(Debug, Clone)]
pub struct CrossoverAxis {
    pub lead: IndicatorSeries,
    pub reference: IndicatorSeries,
}

impl CrossoverAxis {
    pub fn new(lead: IndicatorSeries, reference: IndicatorSeries) -> Self {
        Self { lead, reference }
    }

    /// First bar with both a previous and a current value on both series.
    fn first_bar(&self) -> usize {
        self.lead.start.max(self.reference.start) + 1
    }

    /// One past the last bar covered by both series.
    fn end_bar(&self) -> usize {
        self.lead.end().min(self.reference.end())
    }

    /// Crossover observed on bar `t`, if any.
    fn crossing(&self, t: usize) -> Option<Bias> {
        let (Some(lead_prev), Some(ref_prev), Some(lead), Some(reference)) = (
            self.lead.value_at(t - 1),
            self.reference.value_at(t - 1),
            self.lead.value_at(t),
            self.reference.value_at(t),
        ) else {
            return None;
        };

        if lead_prev <= ref_prev && lead > reference {
            Some(Bias::Bullish)
        } else if lead_prev >= ref_prev && lead < reference {
            Some(Bias::Bearish)
        } else {
            None
        }
    }
}

/// Runs a long-only crossover simulation and returns one row per bar.
///
/// Returns an empty log when `prices` or `axes` is empty, or when any axis
/// has no overlapping values.
pub fn run_crossover(
    prices: &[PricePoint],
    axes: &[CrossoverAxis],
    starting_capital: f64,
) -> Vec<Trade> {
    let degenerate = axes
        .iter()
        .any(|a| a.lead.is_empty() || a.reference.is_empty());
    if prices.is_empty() || axes.is_empty() || degenerate {
        return Vec::new();
    }

    let first = axes.iter().map(CrossoverAxis::first_bar).max().unwrap_or(1);
    let end = axes
        .iter()
        .map(CrossoverAxis::end_bar)
        .min()
        .unwrap_or(0)
        .min(prices.len() - 1);
    if first >= end {
        return Vec::new();
    }

    let mut latches = vec![Bias::Neutral; axes.len()];
    let mut cash = starting_capital;
    let mut held: u64 = 0;
    let mut last_buy = 0.0;
    let mut realized = 0.0;
    let mut trades = Vec::with_capacity(end - first);

    for t in first..end {
        for (latch, axis) in latches.iter_mut().zip(axes) {
            if let Some(bias) = axis.crossing(t) {
                *latch = bias;
            }
        }

        let next = &prices[t + 1];
        let open = next.open;
        let can_buy = held == 0 && open > 0.0 && cash >= open;
        let all_bullish = latches.iter().all(|&l| l == Bias::Bullish);
        let all_bearish = latches.iter().all(|&l| l == Bias::Bearish);

        let (order_type, shares, unrealized) = if all_bullish && can_buy {
            let shares = (cash / open).floor() as u64;
            cash -= shares as f64 * open;
            held = shares;
            last_buy = open;
            clear(&mut latches, Bias::Bearish);
            debug!(date = %next.date, shares, price = open, "BUY");
            (OrderType::Buy, shares, 0.0)
        } else if all_bearish && held > 0 {
            let shares = held;
            realized += (open - last_buy) * shares as f64;
            cash += shares as f64 * open;
            held = 0;
            clear(&mut latches, Bias::Bullish);
            debug!(date = %next.date, shares, price = open, realized, "SELL");
            (OrderType::Sell, shares, 0.0)
        } else {
            (OrderType::Hold, 0, held as f64 * (open - last_buy))
        };

        trades.push(Trade {
            execution_date: next.date.clone(),
            order_type,
            shares,
            strike_price: open,
            unrealized_pnl: unrealized,
            realized_pnl: realized,
            total_equity_value: starting_capital + realized + unrealized,
            held_shares: held,
        });
    }

    info!(rows = trades.len(), realized, cash, held, "Backtest finished");
    trades
}

fn clear(latches: &mut [Bias], bias: Bias) {
    for latch in latches.iter_mut().filter(|l| **l == bias) {
        *latch = Bias::Neutral;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint {
                date: format!("d{i}"),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1,
            })
            .collect()
    }

    #[test]
    fn crossing_detects_both_directions() {
        let axis = CrossoverAxis::new(
            IndicatorSeries::new(0, vec![1.0, 3.0, 1.0]),
            IndicatorSeries::new(0, vec![2.0, 2.0, 2.0]),
        );
        assert_eq!(axis.crossing(1), Some(Bias::Bullish));
        assert_eq!(axis.crossing(2), Some(Bias::Bearish));
    }

    #[test]
    fn touching_then_crossing_counts() {
        let axis = CrossoverAxis::new(
            IndicatorSeries::new(0, vec![2.0, 2.5]),
            IndicatorSeries::new(0, vec![2.0, 2.0]),
        );
        assert_eq!(axis.crossing(1), Some(Bias::Bullish));
    }

    #[test]
    fn both_axes_must_agree() {
        let prices = bars(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        let bullish = CrossoverAxis::new(
            IndicatorSeries::new(0, vec![1.0, 3.0, 3.0, 3.0, 3.0]),
            IndicatorSeries::new(0, vec![2.0; 5]),
        );
        let late = CrossoverAxis::new(
            IndicatorSeries::new(0, vec![1.0, 1.0, 1.0, 3.0, 3.0]),
            IndicatorSeries::new(0, vec![2.0; 5]),
        );
        let trades = run_crossover(&prices, &[bullish, late], 100.0);
        let types: Vec<OrderType> = trades.iter().map(|t| t.order_type).collect();
        // bar 1 latches axis one; bar 3 latches axis two and buys at bar 4
        assert_eq!(types, vec![OrderType::Hold, OrderType::Hold, OrderType::Buy]);
        assert_eq!(trades[2].execution_date, "d4");
        assert_eq!(trades[2].shares, 10);
    }

    #[test]
    fn insufficient_capital_holds() {
        let prices = bars(&[10.0, 10.0, 50.0]);
        let axis = CrossoverAxis::new(
            IndicatorSeries::new(0, vec![1.0, 3.0, 3.0]),
            IndicatorSeries::new(0, vec![2.0; 3]),
        );
        let trades = run_crossover(&prices, &[axis], 40.0);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].order_type, OrderType::Hold);
        assert_eq!(trades[0].total_equity_value, 40.0);
    }

    #[test]
    fn empty_inputs_yield_empty_log() {
        assert!(run_crossover(&[], &[], 1000.0).is_empty());
        let prices = bars(&[1.0, 2.0]);
        assert!(run_crossover(&prices, &[], 1000.0).is_empty());
    }
}
