//! SPSC queue behavior, single-threaded and across threads.

use std::thread;

use tickdeck::ingest::queue;

#[test]
fn test_fifo_up_to_capacity() {
    let (mut tx, mut rx) = queue::channel(8);
    for i in 0..8 {
        tx.push(i).unwrap();
    }
    assert_eq!(rx.len(), 8);

    let popped: Vec<i32> = std::iter::from_fn(|| rx.pop()).collect();
    assert_eq!(popped, (0..8).collect::<Vec<_>>());
    assert!(rx.is_empty());
}

#[test]
fn test_overflow_hands_item_back_without_corruption() {
    let (mut tx, mut rx) = queue::channel(3);
    for word in ["alpha", "beta", "gamma"] {
        tx.push(word.to_string()).unwrap();
    }

    let rejected = tx.push("delta".to_string());
    assert_eq!(rejected, Err("delta".to_string()));
    assert!(tx.is_full());

    assert_eq!(rx.pop().as_deref(), Some("alpha"));
    tx.push("epsilon".to_string()).unwrap();
    assert_eq!(rx.pop().as_deref(), Some("beta"));
    assert_eq!(rx.pop().as_deref(), Some("gamma"));
    assert_eq!(rx.pop().as_deref(), Some("epsilon"));
    assert_eq!(rx.pop(), None);
}

#[test]
fn test_pop_on_empty_returns_none() {
    let (_tx, mut rx) = queue::channel::<u8>(4);
    assert_eq!(rx.pop(), None);
}

#[test]
fn test_transfer_across_threads_preserves_order() {
    const COUNT: u64 = 100_000;
    let (mut tx, mut rx) = queue::channel(64);

    let producer = thread::spawn(move || {
        for i in 0..COUNT {
            let mut item = i;
            while let Err(back) = tx.push(item) {
                item = back;
                thread::yield_now();
            }
        }
    });

    let mut expected = 0;
    while expected < COUNT {
        match rx.pop() {
            Some(value) => {
                assert_eq!(value, expected);
                expected += 1;
            }
            None => thread::yield_now(),
        }
    }
    producer.join().unwrap();
    assert!(rx.is_empty());
}
