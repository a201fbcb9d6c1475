//! Technical indicators over price series.
//!
//! Every function is pure: the same input always yields the same output, and
//! invalid parameters produce an empty result instead of an error. Outputs
//! are shorter than their input; [`IndicatorSeries`] records where each one
//! starts relative to the price series.

mod ema;
mod macd;
mod rsi;
mod sma;
mod vwap;

pub use ema::ema;
pub use macd::{MacdResult, macd};
pub use rsi::rsi;
pub use sma::sma;
pub use vwap::vwap;

use crate::config::BacktestConfig;
use crate::models::tick::{PricePoint, closes};

/// A derived series aligned to a price series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    /// Price bar the first value belongs to.
    pub start: usize,
    pub values: Vec<f64>,
}

impl IndicatorSeries {
    pub fn new(start: usize, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    /// Value at price bar `bar`, if the series covers it.
    pub fn value_at(&self, bar: usize) -> Option<f64> {
        bar.checked_sub(self.start)
            .and_then(|i| self.values.get(i))
            .copied()
    }

    /// One past the last price bar covered.
    pub fn end(&self) -> usize {
        self.start + self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Periods for the standard indicator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub fast_sma: usize,
    pub slow_sma: usize,
    pub ema: usize,
    pub rsi: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self::from(&BacktestConfig::default())
    }
}

impl From<&BacktestConfig> for IndicatorParams {
    fn from(config: &BacktestConfig) -> Self {
        Self {
            fast_sma: config.fast_sma,
            slow_sma: config.slow_sma,
            ema: config.ema_period,
            rsi: config.rsi_period,
            macd_fast: config.macd_fast,
            macd_slow: config.macd_slow,
            macd_signal: config.macd_signal,
        }
    }
}

/// The indicators shown alongside a price chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSet {
    pub fast_sma: IndicatorSeries,
    pub slow_sma: IndicatorSeries,
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd: IndicatorSeries,
    pub macd_signal: IndicatorSeries,
    pub macd_histogram: IndicatorSeries,
    pub vwap: IndicatorSeries,
}

impl IndicatorSet {
    /// Computes every indicator over `prices`.
    ///
    /// Indicators whose parameters do not fit the series come back empty.
    pub fn compute(prices: &[PricePoint], params: &IndicatorParams) -> Self {
        let close = closes(prices);
        let offset = |period: usize| period.saturating_sub(1);
        let macd_start = (params.macd_slow + params.macd_signal).saturating_sub(2);
        let m = macd(params.macd_fast, params.macd_slow, params.macd_signal, &close);

        Self {
            fast_sma: IndicatorSeries::new(offset(params.fast_sma), sma(params.fast_sma, &close)),
            slow_sma: IndicatorSeries::new(offset(params.slow_sma), sma(params.slow_sma, &close)),
            ema: IndicatorSeries::new(offset(params.ema), ema(params.ema, &close)),
            rsi: IndicatorSeries::new(offset(params.rsi), rsi(params.rsi, &close)),
            macd: IndicatorSeries::new(macd_start, m.macd),
            macd_signal: IndicatorSeries::new(macd_start, m.signal),
            macd_histogram: IndicatorSeries::new(macd_start, m.histogram),
            vwap: IndicatorSeries::new(0, vwap(prices)),
        }
    }
}
