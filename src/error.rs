//! Crate-level error types.
//!
//! [`TickdeckError`] unifies every error source (configuration, transport,
//! control timeouts, JSON, file IO) behind a single enum so callers can match
//! on the variant they care about while still using the `?` operator.
//!
//! Decode failures and invalid indicator parameters are not
//! represented here: decoders report them in-band through the record's
//! `error` field and indicator functions return empty series.

use std::time::Duration;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TickdeckError>;

/// Top-level error type returned by all fallible public APIs.
#[derive(Debug, thiserror::Error)]
pub enum TickdeckError {
    /// An environment variable or configuration file was invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The transport was closed in an orderly way by either side.
    #[error("transport terminated")]
    Terminated,

    /// A control request received no reply within its time budget.
    #[error("no reply to {request:?} within {timeout:?}")]
    Timeout { request: String, timeout: Duration },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a file or spawning a thread failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A window id did not refer to a slot in the registry.
    #[error("unknown window id {0}")]
    UnknownWindow(usize),

    /// A symbol was not in the list of tradable symbols.
    #[error("invalid symbol {0:?}")]
    InvalidSymbol(String),
}
