//! Synchronous request/reply control channel to the publisher.
//!
//! Commands are plain text, `"<verb> <symbol>"`. Any reply received before
//! the timeout counts as success; its content is returned verbatim.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::Result;
use crate::error::TickdeckError;
use crate::models::window::{RequestType, WindowRegistry};
use crate::transport::{FrameSocket, WsSocket};

/// Default time to wait for a reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// Receive timeout used while discarding stale replies.
const DRAIN_POLL: Duration = Duration::from_millis(1);

/// A command understood by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    /// Begin streaming quotes for a symbol.
    StartSymbol(String),
    /// Replace the streamed symbol.
    SwitchSymbol(String),
    /// Request historical candles for a symbol.
    FireKlines(String),
}

impl ControlCommand {
    pub fn verb(&self) -> &'static str {
        match self {
            ControlCommand::StartSymbol(_) => "start_symbol",
            ControlCommand::SwitchSymbol(_) => "switch_symbol",
            ControlCommand::FireKlines(_) => "fire_klines",
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ControlCommand::StartSymbol(s)
            | ControlCommand::SwitchSymbol(s)
            | ControlCommand::FireKlines(s) => s,
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb(), self.symbol())
    }
}

/// Blocking request/reply client.
///
/// Must not be used from a subscriber's receive thread: a request blocks its
/// caller for up to the timeout.
pub struct ControlClient<S: FrameSocket = WsSocket> {
    socket: S,
    timeout: Duration,
}

impl ControlClient<WsSocket> {
    /// Connects to the publisher's control endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`TickdeckError`] if the connection fails.
    pub fn connect(endpoint: &str, timeout: Duration) -> Result<Self> {
        let socket = WsSocket::connect(endpoint)?;
        Ok(Self::new(socket, timeout))
    }
}

impl<S: FrameSocket> ControlClient<S> {
    #[must_use]
    pub fn new(socket: S, timeout: Duration) -> Self {
        Self { socket, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a command and waits for the reply using the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Timeout`] if no reply arrives in time, or a
    /// transport error.
    pub fn request(&mut self, command: &ControlCommand) -> Result<String> {
        self.request_with_timeout(command, self.timeout)
    }

    /// Sends a command and waits up to `timeout` for the reply.
    ///
    /// Replies left over from an earlier timed-out request are discarded
    /// first so they are not mistaken for this request's reply.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Timeout`] if no reply arrives in time, or a
    /// transport error.
    pub fn request_with_timeout(
        &mut self,
        command: &ControlCommand,
        timeout: Duration,
    ) -> Result<String> {
        self.drain_stale()?;

        let request = command.to_string();
        self.socket.send_frame(request.as_bytes())?;
        debug!(request = %request, "Sent control request");

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Some(reply) = self.socket.recv_frame(remaining)? {
                let reply = String::from_utf8_lossy(&reply).into_owned();
                info!(request = %request, reply = %reply, "Control request acknowledged");
                return Ok(reply);
            }
            if Instant::now() >= deadline {
                warn!(
                    request = %request,
                    timeout_ms = timeout.as_millis() as u64,
                    "Control request timed out"
                );
                return Err(TickdeckError::Timeout { request, timeout });
            }
        }
    }

    fn drain_stale(&mut self) -> Result<()> {
        while let Some(stale) = self.socket.recv_frame(DRAIN_POLL)? {
            debug!(reply = %String::from_utf8_lossy(&stale), "Discarded stale control reply");
        }
        Ok(())
    }
}

/// Sends the control command for every request queued in `registry`.
///
/// A `start_stream` request becomes `start_symbol` for a window that is not
/// streaming yet and `switch_symbol` otherwise; on success the window is
/// marked as streaming the symbol. The protocol has no stop verb, so a
/// `close_stream` request only clears the window's streaming state.
///
/// Failed requests are logged and dropped. Returns the number of requests
/// the publisher acknowledged.
pub fn dispatch_symbol_requests<S: FrameSocket>(
    registry: &mut WindowRegistry,
    client: &mut ControlClient<S>,
) -> usize {
    let mut acknowledged = 0;
    for request in registry.take_pending() {
        match request.request_type {
            RequestType::StartStream => {
                let streaming = registry
                    .get(request.window_id)
                    .and_then(|w| w.streaming_symbol.as_ref())
                    .is_some();
                let symbol = request.requested_symbol.clone();
                let command = if streaming {
                    ControlCommand::SwitchSymbol(symbol)
                } else {
                    ControlCommand::StartSymbol(symbol)
                };

                match client.request(&command) {
                    Ok(_) => {
                        registry.mark_streaming(request.window_id, &request.requested_symbol);
                        acknowledged += 1;
                    }
                    Err(e) => warn!(
                        window_id = request.window_id,
                        symbol = %request.requested_symbol,
                        "Symbol request failed: {e}"
                    ),
                }
            }
            RequestType::CloseStream => {
                registry.clear_streaming(request.window_id);
                debug!(
                    window_id = request.window_id,
                    symbol = %request.requested_symbol,
                    "Closed stream locally"
                );
            }
        }
    }
    acknowledged
}
