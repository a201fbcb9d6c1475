//! Control client request/reply and window dispatch tests.

mod common;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tickdeck::TickdeckError;
use tickdeck::control::{ControlClient, ControlCommand, dispatch_symbol_requests};
use tickdeck::models::window::WindowRegistry;

use common::{MockPeer, mock_pair};

const TIMEOUT: Duration = Duration::from_millis(200);

/// Answers every request with `ack <request>` and reports what it saw.
fn spawn_acknowledger(peer: MockPeer) -> (thread::JoinHandle<()>, mpsc::Receiver<String>) {
    let (seen_tx, seen_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        while let Ok(request) = peer.from_socket.recv() {
            let request = String::from_utf8(request).unwrap();
            peer.send(&format!("ack {request}"));
            seen_tx.send(request).unwrap();
        }
    });
    (handle, seen_rx)
}

#[test]
fn test_request_returns_reply() {
    let (socket, peer) = mock_pair();
    let (responder, seen) = spawn_acknowledger(peer);
    let mut client = ControlClient::new(socket, TIMEOUT);

    let reply = client
        .request(&ControlCommand::StartSymbol("btcusdt".to_string()))
        .unwrap();
    assert_eq!(reply, "ack start_symbol btcusdt");
    assert_eq!(seen.recv().unwrap(), "start_symbol btcusdt");

    drop(client);
    responder.join().unwrap();
}

#[test]
fn test_unanswered_request_times_out() {
    let (socket, peer) = mock_pair();
    let mut client = ControlClient::new(socket, TIMEOUT);

    let started = Instant::now();
    let err = client
        .request_with_timeout(
            &ControlCommand::FireKlines("ethusdt".to_string()),
            Duration::from_millis(50),
        )
        .unwrap_err();

    assert!(started.elapsed() >= Duration::from_millis(50));
    match err {
        TickdeckError::Timeout { request, timeout } => {
            assert_eq!(request, "fire_klines ethusdt");
            assert_eq!(timeout, Duration::from_millis(50));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(peer.from_socket.recv().unwrap(), b"fire_klines ethusdt");
}

#[test]
fn test_late_reply_is_not_mistaken_for_next_reply() {
    let (socket, peer) = mock_pair();
    let responder = thread::spawn(move || {
        let first = peer.from_socket.recv().unwrap();
        thread::sleep(Duration::from_millis(100));
        peer.send(&format!("late {}", String::from_utf8(first).unwrap()));

        let second = peer.from_socket.recv().unwrap();
        peer.send(&format!("fresh {}", String::from_utf8(second).unwrap()));
    });
    let mut client = ControlClient::new(socket, Duration::from_millis(20));

    let first = client.request(&ControlCommand::StartSymbol("btcusdt".to_string()));
    assert!(matches!(first, Err(TickdeckError::Timeout { .. })));

    thread::sleep(Duration::from_millis(200));
    let second = client
        .request_with_timeout(&ControlCommand::SwitchSymbol("ethusdt".to_string()), TIMEOUT)
        .unwrap();
    assert_eq!(second, "fresh switch_symbol ethusdt");
    responder.join().unwrap();
}

#[test]
fn test_closed_peer_is_terminated() {
    let (socket, peer) = mock_pair();
    drop(peer);
    let mut client = ControlClient::new(socket, TIMEOUT);

    let err = client
        .request(&ControlCommand::StartSymbol("btcusdt".to_string()))
        .unwrap_err();
    assert!(matches!(err, TickdeckError::Terminated));
}

#[test]
fn test_dispatch_starts_then_switches_per_window() {
    let (socket, peer) = mock_pair();
    let (responder, seen) = spawn_acknowledger(peer);
    let mut client = ControlClient::new(socket, TIMEOUT);
    let mut registry = WindowRegistry::new(4, Vec::new());

    let first = registry.open_window().unwrap();
    let second = registry.open_window().unwrap();
    registry.request_symbol(first, "btcusdt").unwrap();
    registry.request_symbol(second, "ethusdt").unwrap();
    assert_eq!(dispatch_symbol_requests(&mut registry, &mut client), 2);
    assert_eq!(
        registry.get(first).unwrap().streaming_symbol.as_deref(),
        Some("btcusdt")
    );

    registry.request_symbol(first, "solusdt").unwrap();
    registry.close_window(second).unwrap();
    assert_eq!(dispatch_symbol_requests(&mut registry, &mut client), 1);
    assert_eq!(
        registry.get(first).unwrap().streaming_symbol.as_deref(),
        Some("solusdt")
    );
    assert_eq!(registry.get(second).unwrap().streaming_symbol, None);
    assert_eq!(registry.pending_len(), 0);

    drop(client);
    responder.join().unwrap();
    let requests: Vec<String> = seen.try_iter().collect();
    assert_eq!(
        requests,
        vec![
            "start_symbol btcusdt",
            "start_symbol ethusdt",
            "switch_symbol solusdt",
        ]
    );
}

#[test]
fn test_failed_dispatch_leaves_window_not_streaming() {
    let (socket, _peer) = mock_pair();
    let mut client = ControlClient::new(socket, Duration::from_millis(20));
    let mut registry = WindowRegistry::new(1, Vec::new());

    let window = registry.open_window().unwrap();
    registry.request_symbol(window, "btcusdt").unwrap();
    assert_eq!(dispatch_symbol_requests(&mut registry, &mut client), 0);
    assert_eq!(registry.get(window).unwrap().streaming_symbol, None);
}
