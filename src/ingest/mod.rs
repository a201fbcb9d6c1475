//! Market-data ingestion pipeline.
//!
//! A [`Subscriber`] thread receives frames and pushes them as [`Envelope`]s
//! into a bounded SPSC [`queue`]; the consumer side pops them and decodes them
//! into [`Payload`]s. [`Feed`] bundles the three for one stream.

pub mod queue;
mod subscriber;

use tracing::debug;

use crate::Result;
use crate::decoder::{self, Payload};
use crate::models::StreamKind;
use crate::transport::{FrameSocket, WsSocket};

pub use queue::{Consumer, Producer};
pub use subscriber::{DEFAULT_POLL_INTERVAL, StopHandle, Subscriber};

/// One received message, copied out of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Topic frame, present for topic-framed streams.
    pub topic: Option<String>,
    pub payload: Vec<u8>,
}

/// A running subscription to one stream together with its consumer.
pub struct Feed<S: FrameSocket + 'static = WsSocket> {
    subscriber: Subscriber<S>,
    consumer: Consumer<Envelope>,
    stream: StreamKind,
}

impl Feed<WsSocket> {
    /// Connects to a WebSocket publisher and starts receiving.
    ///
    /// # Errors
    ///
    /// Returns a [`TickdeckError`](crate::TickdeckError) if the connection
    /// fails or the receive thread cannot be spawned.
    pub fn connect(endpoint: &str, stream: StreamKind, capacity: usize) -> Result<Self> {
        let socket = WsSocket::connect(endpoint)?;
        Self::start(socket, stream, capacity)
    }
}

impl<S: FrameSocket + 'static> Feed<S> {
    /// Starts receiving `stream` from an already connected socket.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Io`](crate::TickdeckError::Io) if the receive
    /// thread cannot be spawned.
    pub fn start(socket: S, stream: StreamKind, capacity: usize) -> Result<Self> {
        let (producer, consumer) = queue::channel(capacity);
        let mut subscriber = Subscriber::new(socket, producer, stream);
        subscriber.start()?;

        Ok(Self {
            subscriber,
            consumer,
            stream,
        })
    }

    /// Pops and decodes at most one message. Never blocks.
    pub fn poll(&mut self) -> Option<Payload> {
        let envelope = self.consumer.pop()?;
        let payload = decoder::decode(self.stream, &envelope.payload);
        if !payload.error().is_empty() {
            debug!(
                stream = self.stream.as_str(),
                topic = envelope.topic.as_deref(),
                error = payload.error(),
                "Decoded message carries an error"
            );
        }
        Some(payload)
    }

    /// Number of messages waiting to be polled.
    pub fn pending(&self) -> usize {
        self.consumer.len()
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn is_running(&self) -> bool {
        self.subscriber.is_running()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.subscriber.stop_handle()
    }

    /// Stops the receive thread and waits for it.
    pub fn shutdown(&mut self) {
        self.subscriber.join();
    }
}
