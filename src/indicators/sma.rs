//! Simple moving average.

use tracing::warn;

/// Simple moving average over `period` values.
///
/// Output index `i` covers inputs `i..i + period`, so the first value lines
/// up with input bar `period - 1`. Returns an empty vector when `period` is
/// zero or exceeds the input length.
///
/// ```
/// let out = tickdeck::indicators::sma(2, &[1.0, 2.0, 3.0, 4.0]);
/// assert_eq!(out, vec![1.5, 2.5, 3.5]);
/// ```
pub fn sma(period: usize, values: &[f64]) -> Vec<f64> {
    if period == 0 || period > values.len() {
        warn!(period, len = values.len(), "Invalid SMA period");
        return Vec::new();
    }

    let divisor = period as f64;
    let mut sum: f64 = values[..period].iter().sum();
    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(sum / divisor);

    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out.push(sum / divisor);
    }
    out
}
