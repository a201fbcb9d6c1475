//! Relative strength index.

use tracing::warn;

/// Relative strength index with Wilder smoothing.
///
/// Seed averages come from the first `period - 1` price changes, each
/// divided by `period`. Every later change updates only the side it moved:
/// a gain updates the average gain, a loss the average loss, and an
/// unchanged price neither.
///
/// The output has `values.len() - period + 1` points, the first lining up
/// with input bar `period - 1`. A zero average loss saturates at 100; when
/// both averages are zero the index is 50. Returns an empty vector when
/// `period` is zero or exceeds the input length.
pub fn rsi(period: usize, values: &[f64]) -> Vec<f64> {
    if period == 0 || period > values.len() {
        warn!(period, len = values.len(), "Invalid RSI period");
        return Vec::new();
    }

    let divisor = period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..period {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain += change / divisor;
        } else if change < 0.0 {
            avg_loss += -change / divisor;
        }
    }

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(index(avg_gain, avg_loss));

    for i in period..values.len() {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            avg_gain = (avg_gain * (divisor - 1.0) + change) / divisor;
        } else if change < 0.0 {
            avg_loss = (avg_loss * (divisor - 1.0) - change) / divisor;
        }
        out.push(index(avg_gain, avg_loss));
    }
    out
}

fn index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rising_series_saturates_at_100() {
        let values: Vec<f64> = (1..=20).map(f64::from).collect();
        let out = rsi(5, &values);
        assert_eq!(out.len(), 16);
        assert!(out.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn falling_series_reaches_zero() {
        let values: Vec<f64> = (1..=10).rev().map(f64::from).collect();
        let out = rsi(3, &values);
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn flat_series_is_neutral() {
        assert_eq!(rsi(3, &[5.0, 5.0, 5.0, 5.0]), vec![50.0, 50.0]);
    }

    #[test]
    fn equal_gains_and_losses_balance() {
        // changes: +1, -1 -> seed gain = loss = 1/3
        let out = rsi(3, &[1.0, 2.0, 1.0]);
        assert_eq!(out.len(), 1);
        assert!((out[0] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn period_one_reacts_to_every_change() {
        assert_eq!(rsi(1, &[1.0, 2.0, 1.0]), vec![50.0, 100.0, 50.0]);
    }

    #[test]
    fn invalid_periods_yield_empty() {
        assert!(rsi(0, &[1.0, 2.0]).is_empty());
        assert!(rsi(5, &[1.0, 2.0]).is_empty());
    }
}
