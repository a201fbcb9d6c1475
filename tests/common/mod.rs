//! Shared test utilities.

#![allow(dead_code)]

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tickdeck::models::tick::PricePoint;
use tickdeck::transport::FrameSocket;
use tickdeck::{Result, TickdeckError};

/// Something the peer pushed towards the socket.
enum Inbound {
    Frame(Vec<u8>),
    /// Surfaces as an I/O error on the next receive.
    Fault(io::ErrorKind),
}

/// In-memory socket: frames pushed by the [`MockPeer`] are received here and
/// frames sent here show up at the peer.
pub struct MockSocket {
    inbound: Receiver<Inbound>,
    outbound: Sender<Vec<u8>>,
}

/// The far end of a [`MockSocket`]. Dropping it terminates the socket.
pub struct MockPeer {
    to_socket: Sender<Inbound>,
    pub from_socket: Receiver<Vec<u8>>,
}

impl MockPeer {
    pub fn send(&self, frame: &str) {
        self.to_socket
            .send(Inbound::Frame(frame.as_bytes().to_vec()))
            .expect("socket dropped");
    }

    /// Makes the socket's next receive fail with a connection reset.
    pub fn fail(&self) {
        self.to_socket
            .send(Inbound::Fault(io::ErrorKind::ConnectionReset))
            .expect("socket dropped");
    }
}

pub fn mock_pair() -> (MockSocket, MockPeer) {
    let (to_socket, inbound) = mpsc::channel();
    let (outbound, from_socket) = mpsc::channel();
    (
        MockSocket { inbound, outbound },
        MockPeer {
            to_socket,
            from_socket,
        },
    )
}

impl FrameSocket for MockSocket {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.outbound
            .send(frame.to_vec())
            .map_err(|_| TickdeckError::Terminated)
    }

    fn recv_frame(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>> {
        match self.inbound.recv_timeout(timeout) {
            Ok(Inbound::Frame(frame)) => Ok(Some(frame)),
            Ok(Inbound::Fault(kind)) => {
                Err(TickdeckError::Io(io::Error::new(kind, "mock fault")))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TickdeckError::Terminated),
        }
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Bars whose open and close are both the given price, dated `d0`, `d1`, ...
pub fn flat_bars(prices: &[f64]) -> Vec<PricePoint> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| PricePoint {
            date: format!("d{i}"),
            open: p,
            high: p,
            low: p,
            close: p,
            volume: 100,
        })
        .collect()
}
