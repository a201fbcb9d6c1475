//! Domain records for the market-data pipeline and the backtester.
//!
//! Contains the stream definitions shared by the subscriber and the decoder,
//! plus the wire and domain types for quotes, candles, price series, trades
//! and per-window subscription state.

pub mod candle;
pub mod quote;
pub mod tick;
pub mod trade;
pub mod window;

/// Publisher streams, one subscribing endpoint each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Best bid/offer snapshots.
    Quote,
    /// Batches of OHLCV candles.
    Candle,
    /// Free-form latency reports from the publisher.
    Latency,
}

impl StreamKind {
    /// Returns the stream name used in logs and topic prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Quote => "quote",
            StreamKind::Candle => "candle",
            StreamKind::Latency => "latency",
        }
    }

    /// Returns the framing the publisher uses for this stream.
    pub fn framing(&self) -> Framing {
        match self {
            StreamKind::Quote => Framing::TopicPayload,
            StreamKind::Candle | StreamKind::Latency => Framing::Single,
        }
    }
}

/// How one logical message is split into wire frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// A topic frame followed by a payload frame.
    TopicPayload,
    /// A single payload frame.
    Single,
}
