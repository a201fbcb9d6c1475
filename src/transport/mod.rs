//! Message transport used by the ingestion and control paths.
//!
//! Everything above this module talks to a [`FrameSocket`]: a blocking,
//! message-oriented connection where each frame is one opaque byte buffer.
//! [`WsSocket`] is the WebSocket implementation used in production; tests
//! substitute in-memory sockets.

mod ws;

use std::time::Duration;

use crate::Result;

pub use ws::WsSocket;

/// A blocking, message-framed connection.
///
/// Implementations must be movable to the subscriber's receive thread.
pub trait FrameSocket: Send {
    /// Sends one frame.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Terminated`](crate::TickdeckError::Terminated)
    /// if the peer has closed the connection, or a transport error.
    fn send_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Waits up to `timeout` for the next frame.
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing to read.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Terminated`](crate::TickdeckError::Terminated)
    /// on orderly closure, or a transport error.
    fn recv_frame(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>>;
}

impl<S: FrameSocket + ?Sized> FrameSocket for Box<S> {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        (**self).send_frame(frame)
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        (**self).recv_frame(timeout)
    }
}
