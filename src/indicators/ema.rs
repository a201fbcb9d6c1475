//! Exponential moving average.

use tracing::warn;

/// Exponential moving average with smoothing `2 / (period + 1)`.
///
/// The first value is the simple mean of the first `period` inputs and lines
/// up with input bar `period - 1`; each later value is
/// `alpha * x + (1 - alpha) * previous`. Returns an empty vector when
/// `period` is zero or exceeds the input length.
pub fn ema(period: usize, values: &[f64]) -> Vec<f64> {
    if period == 0 || period > values.len() {
        warn!(period, len = values.len(), "Invalid EMA period");
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);
    let mut prev = seed;
    for &x in &values[period..] {
        prev = alpha * x + (1.0 - alpha) * prev;
        out.push(prev);
    }
    out
}
