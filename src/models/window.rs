//! Per-window subscription state.
//!
//! Each quote window of the dashboard owns a slot in a [`WindowRegistry`],
//! addressed by its window id. Windows never talk to the control channel
//! directly: they queue [`SymbolRequest`]s, which
//! [`dispatch_symbol_requests`](crate::control::dispatch_symbol_requests)
//! later turns into control commands.

use super::quote::{NO_DATA_ERROR, QuoteSnapshot};
use crate::{Result, TickdeckError};

/// What a window asks the backend to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    StartStream,
    CloseStream,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::StartStream => "start_stream",
            RequestType::CloseStream => "close_stream",
        }
    }
}

/// A window's pending intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRequest {
    pub window_id: usize,
    pub requested_symbol: String,
    pub request_type: RequestType,
}

/// Live state of one quote window.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionState {
    pub active: bool,
    /// Symbol the window wants to display.
    pub desired_symbol: String,
    /// Symbol the publisher last acknowledged for this window.
    pub streaming_symbol: Option<String>,
    pub current_quote: QuoteSnapshot,
}

impl SubscriptionState {
    fn fresh() -> Self {
        Self {
            active: true,
            desired_symbol: String::new(),
            streaming_symbol: None,
            current_quote: QuoteSnapshot::failed(NO_DATA_ERROR),
        }
    }
}

/// Arena of window states indexed by window id.
///
/// Closed windows keep their slot; [`open_window`](Self::open_window) reuses
/// the first inactive slot before growing the arena.
#[derive(Debug)]
pub struct WindowRegistry {
    windows: Vec<SubscriptionState>,
    max_windows: usize,
    available_symbols: Vec<String>,
    pending: Vec<SymbolRequest>,
}

impl WindowRegistry {
    /// Creates an empty registry.
    ///
    /// An empty `available_symbols` list accepts any non-blank symbol.
    #[must_use]
    pub fn new(max_windows: usize, available_symbols: Vec<String>) -> Self {
        Self {
            windows: Vec::with_capacity(max_windows),
            max_windows,
            available_symbols,
            pending: Vec::new(),
        }
    }

    /// Opens a window and returns its id, or `None` when every slot is in use.
    pub fn open_window(&mut self) -> Option<usize> {
        if let Some(id) = self.windows.iter().position(|w| !w.active) {
            self.windows[id] = SubscriptionState::fresh();
            return Some(id);
        }
        if self.windows.len() < self.max_windows {
            self.windows.push(SubscriptionState::fresh());
            return Some(self.windows.len() - 1);
        }
        None
    }

    /// Marks a window inactive and queues a `close_stream` request for it.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::UnknownWindow`] if the id has no active slot.
    pub fn close_window(&mut self, window_id: usize) -> Result<()> {
        let window = self.active_mut(window_id)?;
        window.active = false;
        let symbol = window.desired_symbol.clone();
        self.pending.push(SymbolRequest {
            window_id,
            requested_symbol: symbol,
            request_type: RequestType::CloseStream,
        });
        Ok(())
    }

    /// Records the symbol a window wants and queues a `start_stream` request.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::UnknownWindow`] for an unknown or closed
    /// window and [`TickdeckError::InvalidSymbol`] for a symbol outside the
    /// available list.
    pub fn request_symbol(&mut self, window_id: usize, symbol: &str) -> Result<()> {
        let symbol = symbol.trim();
        if !self.is_valid_symbol(symbol) {
            return Err(TickdeckError::InvalidSymbol(symbol.to_string()));
        }
        let window = self.active_mut(window_id)?;
        window.desired_symbol = symbol.to_string();
        self.pending.push(SymbolRequest {
            window_id,
            requested_symbol: symbol.to_string(),
            request_type: RequestType::StartStream,
        });
        Ok(())
    }

    /// Removes and returns all queued requests, oldest first.
    pub fn take_pending(&mut self) -> Vec<SymbolRequest> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Records that the publisher now streams `symbol` for the window.
    pub fn mark_streaming(&mut self, window_id: usize, symbol: &str) {
        if let Some(window) = self.windows.get_mut(window_id) {
            window.streaming_symbol = Some(symbol.to_string());
        }
    }

    /// Forgets the streamed symbol of a window.
    pub fn clear_streaming(&mut self, window_id: usize) {
        if let Some(window) = self.windows.get_mut(window_id) {
            window.streaming_symbol = None;
        }
    }

    /// Routes a decoded quote to every active window that wants its symbol.
    ///
    /// Symbols match case-insensitively. Quotes carrying an error are not
    /// routed. Returns the number of windows updated.
    pub fn apply_quote(&mut self, quote: &QuoteSnapshot) -> usize {
        if !quote.is_valid() {
            return 0;
        }
        let mut updated = 0;
        for window in self.windows.iter_mut().filter(|w| w.active) {
            if window.desired_symbol.eq_ignore_ascii_case(&quote.symbol) {
                window.current_quote = quote.clone();
                updated += 1;
            }
        }
        updated
    }

    pub fn get(&self, window_id: usize) -> Option<&SubscriptionState> {
        self.windows.get(window_id)
    }

    /// Ids of all active windows.
    pub fn active_ids(&self) -> Vec<usize> {
        self.windows
            .iter()
            .enumerate()
            .filter(|(_, w)| w.active)
            .map(|(id, _)| id)
            .collect()
    }

    fn is_valid_symbol(&self, symbol: &str) -> bool {
        if symbol.is_empty() {
            return false;
        }
        self.available_symbols.is_empty() || self.available_symbols.iter().any(|s| s == symbol)
    }

    fn active_mut(&mut self, window_id: usize) -> Result<&mut SubscriptionState> {
        match self.windows.get_mut(window_id) {
            Some(window) if window.active => Ok(window),
            _ => Err(TickdeckError::UnknownWindow(window_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, bid: f64) -> QuoteSnapshot {
        QuoteSnapshot {
            symbol: symbol.to_string(),
            bid_price: bid,
            bid_quantity: 1.0,
            ask_price: bid + 1.0,
            ask_quantity: 1.0,
            error: String::new(),
        }
    }

    #[test]
    fn open_window_reuses_inactive_slot() {
        let mut registry = WindowRegistry::new(4, Vec::new());
        let first = registry.open_window().unwrap();
        let second = registry.open_window().unwrap();
        assert_eq!((first, second), (0, 1));

        registry.close_window(first).unwrap();
        assert_eq!(registry.open_window(), Some(0));
        assert_eq!(registry.get(0).unwrap().current_quote.error, NO_DATA_ERROR);
    }

    #[test]
    fn open_window_respects_limit() {
        let mut registry = WindowRegistry::new(1, Vec::new());
        assert_eq!(registry.open_window(), Some(0));
        assert_eq!(registry.open_window(), None);
    }

    #[test]
    fn request_symbol_validates_against_available_list() {
        let mut registry = WindowRegistry::new(2, vec!["btcusdt".to_string()]);
        let id = registry.open_window().unwrap();

        let err = registry.request_symbol(id, "dogeusdt").unwrap_err();
        assert!(matches!(err, TickdeckError::InvalidSymbol(_)));
        assert_eq!(registry.pending_len(), 0);

        registry.request_symbol(id, " btcusdt ").unwrap();
        let pending = registry.take_pending();
        assert_eq!(
            pending,
            vec![SymbolRequest {
                window_id: id,
                requested_symbol: "btcusdt".to_string(),
                request_type: RequestType::StartStream,
            }]
        );
        assert_eq!(registry.pending_len(), 0);
    }

    #[test]
    fn close_window_queues_close_request() {
        let mut registry = WindowRegistry::new(2, Vec::new());
        let id = registry.open_window().unwrap();
        registry.request_symbol(id, "ethusdt").unwrap();
        registry.take_pending();

        registry.close_window(id).unwrap();
        let pending = registry.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].request_type, RequestType::CloseStream);
        assert_eq!(pending[0].requested_symbol, "ethusdt");
        assert!(registry.active_ids().is_empty());
    }

    #[test]
    fn unknown_or_closed_window_is_rejected() {
        let mut registry = WindowRegistry::new(2, Vec::new());
        assert!(matches!(
            registry.request_symbol(3, "btcusdt"),
            Err(TickdeckError::UnknownWindow(3))
        ));

        let id = registry.open_window().unwrap();
        registry.close_window(id).unwrap();
        assert!(registry.close_window(id).is_err());
    }

    #[test]
    fn apply_quote_routes_by_symbol() {
        let mut registry = WindowRegistry::new(3, Vec::new());
        let a = registry.open_window().unwrap();
        let b = registry.open_window().unwrap();
        registry.request_symbol(a, "btcusdt").unwrap();
        registry.request_symbol(b, "ethusdt").unwrap();

        assert_eq!(registry.apply_quote(&quote("BTCUSDT", 100.0)), 1);
        assert_eq!(registry.get(a).unwrap().current_quote.bid_price, 100.0);
        assert!(!registry.get(b).unwrap().current_quote.is_valid());

        assert_eq!(registry.apply_quote(&QuoteSnapshot::failed("bad")), 0);
    }
}
