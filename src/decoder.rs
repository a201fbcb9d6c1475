//! Decoding of raw publisher payloads into domain records.
//!
//! Decoding never fails outright. A buffer that cannot be used yields a
//! record whose `error` field is set, and every numeric field that cannot be
//! parsed falls back to `0.0` independently of the others.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::models::StreamKind;
use crate::models::candle::{Candle, CandleBatch, CandleMessage};
use crate::models::quote::{INVALID_DATA_ERROR, NO_DATA_ERROR, QuoteMessage, QuoteSnapshot};

/// Symbol used when a quote arrives without one.
pub const MISSING_SYMBOL: &str = "[null]";

/// Round-trip latency notice emitted by the publisher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyReport {
    pub message: String,
    pub error: String,
}

impl LatencyReport {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            message: String::new(),
            error: error.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct LatencyMessage {
    #[serde(default)]
    message: Option<String>,
}

/// A decoded record from any stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Quote(QuoteSnapshot),
    CandleBatch(CandleBatch),
    Latency(LatencyReport),
}

impl Payload {
    /// The in-band decode error, empty on success.
    pub fn error(&self) -> &str {
        match self {
            Payload::Quote(q) => &q.error,
            Payload::CandleBatch(b) => &b.error,
            Payload::Latency(l) => &l.error,
        }
    }
}

/// Decodes a buffer according to the stream it arrived on.
pub fn decode(stream: StreamKind, bytes: &[u8]) -> Payload {
    match stream {
        StreamKind::Quote => Payload::Quote(decode_quote(bytes)),
        StreamKind::Candle => Payload::CandleBatch(decode_candles(bytes)),
        StreamKind::Latency => Payload::Latency(decode_latency(bytes)),
    }
}

/// Decodes a best bid/offer quote.
///
/// ```
/// let quote = tickdeck::decoder::decode_quote(br#"{"symbol":"btcusdt","best_bid":"101.5"}"#);
/// assert_eq!(quote.bid_price, 101.5);
/// assert_eq!(quote.ask_price, 0.0);
/// assert!(quote.is_valid());
/// ```
pub fn decode_quote(bytes: &[u8]) -> QuoteSnapshot {
    if bytes.is_empty() {
        return QuoteSnapshot::failed(NO_DATA_ERROR);
    }
    let Some(msg) = parse_object::<QuoteMessage>(bytes) else {
        return QuoteSnapshot::failed(INVALID_DATA_ERROR);
    };

    QuoteSnapshot {
        symbol: match msg.symbol {
            Some(Value::String(symbol)) => symbol,
            _ => MISSING_SYMBOL.to_string(),
        },
        bid_price: number_or_zero(msg.best_bid.as_ref()),
        bid_quantity: number_or_zero(msg.bid_qty.as_ref()),
        ask_price: number_or_zero(msg.best_ask.as_ref()),
        ask_quantity: number_or_zero(msg.ask_qty.as_ref()),
        error: String::new(),
    }
}

/// Decodes a batch of candles published as a JSON array.
pub fn decode_candles(bytes: &[u8]) -> CandleBatch {
    if bytes.is_empty() {
        return CandleBatch::failed(NO_DATA_ERROR);
    }
    let messages = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .map(object_into::<CandleMessage>)
            .collect::<Option<Vec<_>>>(),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "Rejected candle payload");
            None
        }
    };
    let Some(messages) = messages else {
        return CandleBatch::failed(INVALID_DATA_ERROR);
    };

    let candles = messages
        .iter()
        .map(|m| Candle {
            open_time: timestamp_or_zero(m.open_time.as_ref()),
            open: number_or_zero(m.open_price.as_ref()),
            high: number_or_zero(m.high_price.as_ref()),
            low: number_or_zero(m.low_price.as_ref()),
            close: number_or_zero(m.close_price.as_ref()),
            volume: number_or_zero(m.volume.as_ref()),
            close_time: timestamp_or_zero(m.close_time.as_ref()),
        })
        .collect();

    CandleBatch {
        candles,
        error: String::new(),
    }
}

/// Decodes a latency notice: `{"message": "..."}`, a JSON string, or plain text.
pub fn decode_latency(bytes: &[u8]) -> LatencyReport {
    if bytes.is_empty() {
        return LatencyReport::failed(NO_DATA_ERROR);
    }
    if let Some(msg) = parse_object::<LatencyMessage>(bytes) {
        return LatencyReport {
            message: msg.message.unwrap_or_default(),
            error: String::new(),
        };
    }
    if let Ok(message) = serde_json::from_slice::<String>(bytes) {
        return LatencyReport {
            message,
            error: String::new(),
        };
    }
    match std::str::from_utf8(bytes) {
        Ok(text) if !text.trim().is_empty() => LatencyReport {
            message: text.trim().to_string(),
            error: String::new(),
        },
        _ => LatencyReport::failed(INVALID_DATA_ERROR),
    }
}

/// Parses a buffer whose top level must be a JSON object.
fn parse_object<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => object_into(value),
        Err(e) => {
            debug!(error = %e, "Rejected payload");
            None
        }
    }
}

/// Converts an object into a wire struct. Arrays are refused even though
/// serde would read them positionally.
fn object_into<T: DeserializeOwned>(value: Value) -> Option<T> {
    if !value.is_object() {
        debug!("Rejected non-object payload");
        return None;
    }
    serde_json::from_value(value)
        .map_err(|e| debug!(error = %e, "Rejected payload fields"))
        .ok()
}

/// Lenient numeric parse: string decimals and JSON numbers, else `0.0`.
fn number_or_zero(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::String(s)) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
                .and_then(|d| d.to_f64())
        }
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn timestamp_or_zero(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}
