//! Moving average convergence divergence.

use tracing::warn;

use super::ema;

/// The three aligned MACD series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdResult {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdResult {
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }
}

/// MACD line, signal line and histogram.
///
/// The fast EMA is offset by `slow - fast` so both EMAs start at input bar
/// `slow - 1`. The signal line is the `signal`-period EMA of the MACD line,
/// and the MACD line is trimmed from the front by `signal - 1` so that all
/// three series have equal length and their first value lines up with input
/// bar `slow + signal - 2`.
///
/// All three series are empty when any period is zero, `fast > slow`, a
/// period exceeds the input length, or the MACD line is too short for the
/// signal period.
pub fn macd(fast: usize, slow: usize, signal: usize, values: &[f64]) -> MacdResult {
    let len = values.len();
    if fast == 0 || slow == 0 || signal == 0 || fast > slow || slow > len || signal > len {
        warn!(fast, slow, signal, len, "Invalid MACD parameters");
        return MacdResult::default();
    }

    let fast_ema = ema(fast, values);
    let slow_ema = ema(slow, values);
    let offset = slow - fast;
    let line: Vec<f64> = slow_ema
        .iter()
        .zip(&fast_ema[offset..])
        .map(|(s, f)| f - s)
        .collect();

    if signal > line.len() {
        warn!(signal, line_len = line.len(), "MACD line shorter than signal period");
        return MacdResult::default();
    }

    let signal_line = ema(signal, &line);
    let macd_line = line[signal - 1..].to_vec();
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}
