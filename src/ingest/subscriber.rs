//! Background receive thread feeding an ingestion queue.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::Envelope;
use super::queue::Producer;
use crate::Result;
use crate::error::TickdeckError;
use crate::models::{Framing, StreamKind};
use crate::transport::FrameSocket;

/// How long one receive call waits before the running flag is checked again.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Back-off between push attempts while the queue is full.
const FULL_QUEUE_BACKOFF: Duration = Duration::from_millis(1);

/// Stops a subscriber from any thread.
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the receive loop to exit. Takes effect within one poll interval.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Everything the receive thread owns. Handed back when the thread exits so
/// the subscriber can be restarted.
struct Worker<S> {
    socket: S,
    producer: Producer<Envelope>,
    stream: StreamKind,
    framing: Framing,
    poll_interval: Duration,
}

/// Receives frames on a dedicated thread and pushes them into a queue.
///
/// A subscriber is either stopped or running. [`start`](Self::start) while
/// running does nothing; dropping a subscriber stops it and waits for its
/// thread.
pub struct Subscriber<S: FrameSocket + 'static> {
    running: Arc<AtomicBool>,
    idle: Option<Worker<S>>,
    handle: Option<JoinHandle<Worker<S>>>,
    stream: StreamKind,
}

impl<S: FrameSocket + 'static> Subscriber<S> {
    /// Creates a stopped subscriber reading `stream` from `socket`.
    #[must_use]
    pub fn new(socket: S, producer: Producer<Envelope>, stream: StreamKind) -> Self {
        Self::with_poll_interval(socket, producer, stream, DEFAULT_POLL_INTERVAL)
    }

    /// Like [`new`](Self::new) with a custom receive timeout.
    #[must_use]
    pub fn with_poll_interval(
        socket: S,
        producer: Producer<Envelope>,
        stream: StreamKind,
        poll_interval: Duration,
    ) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            idle: Some(Worker {
                socket,
                producer,
                stream,
                framing: stream.framing(),
                poll_interval,
            }),
            handle: None,
            stream,
        }
    }

    /// Spawns the receive thread.
    ///
    /// Does nothing if already running. A subscriber whose loop has ended,
    /// either through [`stop`](Self::stop) or a transport error, is restarted
    /// with the same socket and queue.
    ///
    /// # Errors
    ///
    /// Returns [`TickdeckError::Io`] if the thread cannot be spawned.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() && self.is_running() {
            return Ok(());
        }
        self.reclaim_worker();

        let Some(worker) = self.idle.take() else {
            return Err(TickdeckError::Terminated);
        };

        self.running.store(true, Ordering::Release);
        let running = self.running.clone();
        let spawned = thread::Builder::new()
            .name(format!("tickdeck-{}", self.stream.as_str()))
            .spawn(move || receive_loop(worker, running));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                info!(stream = self.stream.as_str(), "Subscriber started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }

    /// Asks the receive thread to exit without waiting for it.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stops the thread and waits for it to finish.
    pub fn join(&mut self) {
        self.stop();
        self.reclaim_worker();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: self.running.clone(),
        }
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    fn reclaim_worker(&mut self) {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(worker) => self.idle = Some(worker),
                Err(_) => error!(stream = self.stream.as_str(), "Receive thread panicked"),
            }
        }
    }
}

impl<S: FrameSocket + 'static> Drop for Subscriber<S> {
    fn drop(&mut self) {
        self.join();
    }
}

fn receive_loop<S: FrameSocket>(mut worker: Worker<S>, running: Arc<AtomicBool>) -> Worker<S> {
    let stream = worker.stream.as_str();
    while running.load(Ordering::Acquire) {
        let envelope = match read_message(&mut worker, &running) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => continue,
            Err(TickdeckError::Terminated) => {
                debug!(stream, "Transport terminated");
                break;
            }
            Err(e) => {
                error!(stream, "Receive failed: {e}");
                break;
            }
        };

        let mut pending = envelope;
        loop {
            match worker.producer.push(pending) {
                Ok(()) => break,
                Err(rejected) => {
                    if !running.load(Ordering::Acquire) {
                        warn!(stream, "Dropped message queued during shutdown");
                        break;
                    }
                    pending = rejected;
                    thread::sleep(FULL_QUEUE_BACKOFF);
                }
            }
        }
    }

    running.store(false, Ordering::Release);
    info!(stream, "Subscriber stopped");
    worker
}

/// Reads one logical message. `Ok(None)` means the poll interval elapsed.
fn read_message<S: FrameSocket>(
    worker: &mut Worker<S>,
    running: &AtomicBool,
) -> Result<Option<Envelope>> {
    let Some(first) = worker.socket.recv_frame(worker.poll_interval)? else {
        return Ok(None);
    };

    match worker.framing {
        Framing::Single => Ok(Some(Envelope {
            topic: None,
            payload: first,
        })),
        Framing::TopicPayload => {
            let topic = String::from_utf8_lossy(&first).into_owned();
            // The payload frame follows its topic immediately.
            let payload = loop {
                if let Some(frame) = worker.socket.recv_frame(worker.poll_interval)? {
                    break frame;
                }
                if !running.load(Ordering::Acquire) {
                    return Ok(None);
                }
            };
            debug!(topic = %topic, bytes = payload.len(), "Received message");
            Ok(Some(Envelope {
                topic: Some(topic),
                payload,
            }))
        }
    }
}
