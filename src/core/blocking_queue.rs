//! Bounded multi-producer hand-off queue
//!
//! Wraps a [`RingBuffer`] with one mutex and two condition variables.
//! Producers block in [`enqueue`](BlockingQueue::enqueue) while the ring is
//! full, which is the only backpressure in the pipeline: nothing is ever
//! dropped to make room. The single consumer drains with
//! [`dequeue_batch`](BlockingQueue::dequeue_batch), which waits at most
//! [`BATCH_WAIT`] for the first item and then takes everything available up
//! to the batch limit under the same lock acquisition.

use super::error::{LoggerError, Result};
use super::ring_buffer::RingBuffer;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Longest time `dequeue_batch` waits for an item to appear
pub const BATCH_WAIT: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct QueueState<T> {
    ring: RingBuffer<T>,
    closed: bool,
    /// Number of `enqueue` calls that had to wait for space
    blocked_pushes: u64,
}

#[derive(Debug)]
pub struct BlockingQueue<T> {
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BlockingQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                ring: RingBuffer::new(capacity),
                closed: false,
                blocked_pushes: 0,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Append `item`, waiting while the queue is full
    ///
    /// Items leave the queue in the order their `enqueue` calls stored them
    /// under the lock.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::QueueClosed`] (dropping the item) once the
    /// consumer has closed the queue, including when the close happens while
    /// this call is waiting.
    pub fn enqueue(&self, item: T) -> Result<()> {
        self.enqueue_waited(item).map(|_| ())
    }

    /// [`enqueue`](Self::enqueue), reporting whether the call had to wait for room
    pub fn enqueue_waited(&self, item: T) -> Result<bool> {
        let waited = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(LoggerError::QueueClosed);
            }
            let waited = state.ring.is_full();
            if waited {
                state.blocked_pushes += 1;
                self.not_full
                    .wait_while(&mut state, |s| s.ring.is_full() && !s.closed);
                if state.closed {
                    return Err(LoggerError::QueueClosed);
                }
            }
            let pushed = state.ring.push(item);
            debug_assert!(pushed.is_ok(), "ring has room after waiting on not_full");
            waited
        };
        self.not_empty.notify_one();
        Ok(waited)
    }

    /// Remove one item, waiting while the queue is empty
    ///
    /// Returns `None` only when the queue is closed and empty.
    pub fn dequeue(&self) -> Option<T> {
        let item = {
            let mut state = self.state.lock();
            self.not_empty
                .wait_while(&mut state, |s| s.ring.is_empty() && !s.closed);
            state.ring.pop()
        };
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Move up to `max_items` queued items into `out`
    ///
    /// Waits at most [`BATCH_WAIT`] for the first item; when nothing arrives
    /// returns 0 so the caller can re-check its stop condition. Once items are
    /// present, drains without releasing the lock until `max_items` have been
    /// taken or the queue is empty. Returns the number of items moved.
    pub fn dequeue_batch(&self, max_items: usize, out: &mut Vec<T>) -> usize {
        let taken = {
            let mut state = self.state.lock();
            if state.ring.is_empty() && !state.closed {
                self.not_empty
                    .wait_while_for(&mut state, |s| s.ring.is_empty() && !s.closed, BATCH_WAIT);
            }
            let mut taken = 0;
            while taken < max_items {
                match state.ring.pop() {
                    Some(item) => {
                        out.push(item);
                        taken += 1;
                    }
                    None => break,
                }
            }
            taken
        };
        match taken {
            0 => {}
            1 => {
                self.not_full.notify_one();
            }
            _ => {
                self.not_full.notify_all();
            }
        }
        taken
    }

    /// Stop accepting items and wake every waiter
    ///
    /// Items already queued stay available to `dequeue`/`dequeue_batch`.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().ring.capacity()
    }

    /// Number of `enqueue` calls that found the queue full and waited
    pub fn blocked_pushes(&self) -> u64 {
        self.state.lock().blocked_pushes
    }

    /// Change the capacity while holding the queue lock
    ///
    /// # Errors
    ///
    /// Fails if `capacity` is zero or below the current item count.
    pub fn resize(&self, capacity: usize) -> Result<()> {
        self.state.lock().ring.set_capacity(capacity)?;
        self.not_full.notify_all();
        Ok(())
    }
}
