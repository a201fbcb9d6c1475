//! OHLCV candlestick models and the bounded candle history.

use std::collections::VecDeque;

use serde::Deserialize;
use serde_json::Value;

use super::tick::PricePoint;

/// Maximum number of candles kept in a [`CandleHistory`].
pub const MAX_CANDLE_HISTORY: usize = 500;

/// A single candle as published on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct CandleMessage {
    #[serde(default)]
    pub open_time: Option<Value>,
    #[serde(default)]
    pub open_price: Option<Value>,
    #[serde(default)]
    pub high_price: Option<Value>,
    #[serde(default)]
    pub low_price: Option<Value>,
    #[serde(default)]
    pub close_price: Option<Value>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub close_time: Option<Value>,
}

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Candle {
    /// Start of the candle's window, in milliseconds since the epoch.
    pub open_time: u64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: u64,
}

/// Decoded candle-batch message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleBatch {
    pub candles: Vec<Candle>,
    /// Non-empty when the batch could not be decoded.
    pub error: String,
}

impl CandleBatch {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            candles: Vec::new(),
            error: error.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }
}

/// Rolling window of the most recent candles, oldest first.
#[derive(Debug, Clone)]
pub struct CandleHistory {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleHistory {
    /// Creates a history holding up to [`MAX_CANDLE_HISTORY`] candles.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_CANDLE_HISTORY)
    }

    /// Creates a history with a custom bound (at least one candle).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            candles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a candle, evicting the oldest one when full.
    pub fn push(&mut self, candle: Candle) {
        if self.candles.len() >= self.capacity {
            self.candles.pop_front();
        }
        self.candles.push_back(candle);
    }

    /// Appends every candle of a batch in order.
    pub fn extend_from_batch(&mut self, batch: &CandleBatch) {
        for candle in &batch.candles {
            self.push(*candle);
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent candle, if any.
    pub fn latest(&self) -> Option<&Candle> {
        self.candles.back()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    /// Converts the history into a price series for the indicator engine.
    ///
    /// The date label is the candle's open time and the volume is truncated
    /// to whole units.
    pub fn to_price_points(&self) -> Vec<PricePoint> {
        self.candles
            .iter()
            .map(|c| PricePoint {
                date: c.open_time.to_string(),
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume: c.volume as i64,
            })
            .collect()
    }
}

impl Default for CandleHistory {
    fn default() -> Self {
        Self::new()
    }
}
