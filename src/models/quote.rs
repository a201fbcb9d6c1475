//! Best bid/offer quote models.

use serde::Deserialize;
use serde_json::Value;

/// Error carried by a record when the buffer was empty.
pub const NO_DATA_ERROR: &str = "no data received yet";

/// Error carried by a record when the buffer could not be parsed.
pub const INVALID_DATA_ERROR: &str = "invalid data received";

/// A quote message as published on the wire.
///
/// Every field is optional and loosely typed so each one degrades on its
/// own; numeric fields arrive as string-encoded decimals.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteMessage {
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub best_bid: Option<Value>,
    #[serde(default)]
    pub bid_qty: Option<Value>,
    #[serde(default)]
    pub best_ask: Option<Value>,
    #[serde(default)]
    pub ask_qty: Option<Value>,
}

/// Normalized top-of-book snapshot.
///
/// A non-empty `error` means the snapshot carries no market data and all
/// numeric fields are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub bid_price: f64,
    pub bid_quantity: f64,
    pub ask_price: f64,
    pub ask_quantity: f64,
    pub error: String,
}

impl QuoteSnapshot {
    /// Builds an empty snapshot that only carries an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the snapshot holds usable market data.
    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }

    /// Midpoint of bid and ask.
    pub fn mid_price(&self) -> f64 {
        (self.bid_price + self.ask_price) / 2.0
    }

    /// Ask minus bid.
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }
}
