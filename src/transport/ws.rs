//! Blocking WebSocket transport.

use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::{Duration, Instant};

use tracing::{debug, info};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use super::FrameSocket;
use crate::Result;
use crate::error::TickdeckError;

/// Smallest read timeout handed to the OS; a zero timeout means "block forever".
const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);

/// A WebSocket client connection where each message is one frame.
pub struct WsSocket {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    endpoint: String,
}

impl WsSocket {
    /// Connects to `endpoint` (a `ws://` URL) and completes the handshake.
    ///
    /// # Errors
    ///
    /// Returns a [`TickdeckError`] if the connection or handshake fails.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let (socket, _) = tungstenite::connect(endpoint)?;
        info!(endpoint = %endpoint, "WebSocket handshake completed");

        Ok(Self {
            socket,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        let timeout = timeout.max(MIN_READ_TIMEOUT);
        match self.socket.get_mut() {
            MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout))?,
            _ => debug!(endpoint = %self.endpoint, "Read timeout not supported on stream"),
        }
        Ok(())
    }
}

impl FrameSocket for WsSocket {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        let message = match std::str::from_utf8(frame) {
            Ok(text) => Message::text(text.to_owned()),
            Err(_) => Message::binary(frame.to_vec()),
        };
        self.socket.send(message).map_err(map_closed)
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.set_read_timeout(remaining)?;

            match self.socket.read() {
                Ok(Message::Text(text)) => return Ok(Some(text.as_bytes().to_vec())),
                Ok(Message::Binary(bytes)) => return Ok(Some(bytes.to_vec())),
                Ok(Message::Close(frame)) => {
                    debug!(endpoint = %self.endpoint, ?frame, "Peer closed connection");
                    return Err(TickdeckError::Terminated);
                }
                // Pings are answered by tungstenite on the next read or write.
                Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => {}
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(map_closed(e)),
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }
}

impl Drop for WsSocket {
    fn drop(&mut self) {
        let _ = self.socket.close(None);
        let _ = self.socket.flush();
    }
}

fn map_closed(e: tungstenite::Error) -> TickdeckError {
    match e {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            TickdeckError::Terminated
        }
        other => TickdeckError::WebSocket(other),
    }
}
