//! Lock-free single-producer single-consumer ring buffer.
//!
//! [`channel`] returns a [`Producer`] and a [`Consumer`] sharing a fixed
//! number of slots. Neither handle is `Clone`, so exactly one thread can push
//! and exactly one thread can pop. `head` and `tail` are monotonically
//! increasing counters; a slot index is the counter modulo capacity.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Ring<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Next slot to read. Written only by the consumer.
    head: AtomicUsize,
    /// Next slot to write. Written only by the producer.
    tail: AtomicUsize,
}

// SAFETY: a slot is accessed by at most one side at a time. The producer
// writes slot `tail` only while `tail - head < capacity`, and publishes it with
// a release store of `tail`; the consumer reads slot `head` only after an
// acquire load of `tail` shows it published, and frees it with a release store
// of `head`.
unsafe impl<T: Send> Send for Ring<T> {}
unsafe impl<T: Send> Sync for Ring<T> {}

impl<T> Ring<T> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, counter: usize) -> *mut MaybeUninit<T> {
        self.slots[counter % self.capacity()].get()
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        let tail = *self.tail.get_mut();
        let mut head = *self.head.get_mut();
        while head != tail {
            // SAFETY: slots in [head, tail) hold initialized items that were
            // never popped, and no handle is left to observe them.
            unsafe { (*self.slot(head)).assume_init_drop() };
            head = head.wrapping_add(1);
        }
    }
}

/// Creates a bounded SPSC queue holding up to `capacity` items (at least one).
///
/// ```
/// let (mut tx, mut rx) = tickdeck::ingest::queue::channel(2);
/// assert!(tx.push(1).is_ok());
/// assert!(tx.push(2).is_ok());
/// assert_eq!(tx.push(3), Err(3));
/// assert_eq!(rx.pop(), Some(1));
/// ```
pub fn channel<T: Send>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let capacity = capacity.max(1);
    let slots = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect();
    let ring = Arc::new(Ring {
        slots,
        head: AtomicUsize::new(0),
        tail: AtomicUsize::new(0),
    });

    (
        Producer { ring: ring.clone() },
        Consumer { ring },
    )
}

/// The writing half of a queue.
pub struct Producer<T> {
    ring: Arc<Ring<T>>,
}

impl<T> Producer<T> {
    /// Appends an item without blocking.
    ///
    /// # Errors
    ///
    /// Hands the item back if the queue is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= self.ring.capacity() {
            return Err(item);
        }

        // SAFETY: the slot at `tail` is free (checked above) and only this
        // producer writes to it until `tail` is published.
        unsafe { (*self.ring.slot(tail)).write(item) };
        self.ring.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Returns `true` if the queue currently has no free slot.
    pub fn is_full(&self) -> bool {
        let tail = self.ring.tail.load(Ordering::Relaxed);
        let head = self.ring.head.load(Ordering::Acquire);
        tail.wrapping_sub(head) >= self.ring.capacity()
    }
}

/// The reading half of a queue.
pub struct Consumer<T> {
    ring: Arc<Ring<T>>,
}

impl<T> Consumer<T> {
    /// Removes the oldest item, or returns `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<T> {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }

        // SAFETY: the acquire load of `tail` makes the producer's write of
        // this slot visible, and the producer will not reuse it until `head`
        // moves past it.
        let item = unsafe { (*self.ring.slot(head)).assume_init_read() };
        self.ring.head.store(head.wrapping_add(1), Ordering::Release);
        Some(item)
    }

    /// Number of items waiting. May be stale by the time it is read.
    pub fn len(&self) -> usize {
        let head = self.ring.head.load(Ordering::Relaxed);
        let tail = self.ring.tail.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_wrap_around_slots() {
        let (mut tx, mut rx) = channel(3);
        for round in 0..10 {
            tx.push(round * 2).unwrap();
            tx.push(round * 2 + 1).unwrap();
            assert_eq!(rx.pop(), Some(round * 2));
            assert_eq!(rx.pop(), Some(round * 2 + 1));
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let (mut tx, mut rx) = channel(0);
        assert_eq!(tx.capacity(), 1);
        tx.push("a").unwrap();
        assert!(tx.is_full());
        assert_eq!(tx.push("b"), Err("b"));
        assert_eq!(rx.pop(), Some("a"));
    }

    #[test]
    fn unpopped_items_are_dropped_once() {
        let marker = Arc::new(());
        {
            let (mut tx, mut rx) = channel(4);
            for _ in 0..3 {
                tx.push(marker.clone()).unwrap();
            }
            drop(rx.pop());
            assert_eq!(Arc::strong_count(&marker), 3);
        }
        assert_eq!(Arc::strong_count(&marker), 1);
    }
}
