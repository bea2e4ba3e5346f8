//! Fixed-capacity circular storage
//!
//! The buffer keeps `capacity + 1` slots and leaves one permanently unused so
//! that `head == tail` always means empty and `tail + 1 == head` always means
//! full. It does no synchronization of its own; [`BlockingQueue`] owns it and
//! only touches it under its mutex.
//!
//! [`BlockingQueue`]: super::blocking_queue::BlockingQueue

use super::error::{LoggerError, Result};

#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
}

impl<T> RingBuffer<T> {
    /// Create a buffer that holds at most `capacity` items
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or `usize::MAX`
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Ring buffer capacity must be non-zero");
        assert!(capacity < usize::MAX, "Ring buffer capacity leaves no room for the spare slot");
        Self {
            slots: Self::empty_slots(capacity + 1),
            head: 0,
            tail: 0,
        }
    }

    fn empty_slots(len: usize) -> Vec<Option<T>> {
        std::iter::repeat_with(|| None).take(len).collect()
    }

    /// Maximum number of items the buffer can hold
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        let slots = self.slots.len();
        (self.tail + slots - self.head) % slots
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        (self.tail + 1) % self.slots.len() == self.head
    }

    /// Store `item` at the tail
    ///
    /// Never blocks. When the buffer is full nothing changes and the item is
    /// handed back in `Err`.
    pub fn push(&mut self, item: T) -> std::result::Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        Ok(())
    }

    /// Remove the item at the head, `None` when empty
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        item
    }

    /// Change the capacity, keeping queued items in FIFO order
    ///
    /// Requires exclusive access, which the caller's lock provides.
    ///
    /// # Errors
    ///
    /// Fails without modifying the buffer if `capacity` is zero or smaller
    /// than the number of items currently held.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(LoggerError::config("ring buffer", "capacity must be non-zero"));
        }
        if capacity < self.len() {
            return Err(LoggerError::config(
                "ring buffer",
                format!(
                    "cannot shrink to {} while {} items are queued",
                    capacity,
                    self.len()
                ),
            ));
        }

        let slot_count = capacity.checked_add(1).ok_or_else(|| {
            LoggerError::config("ring buffer", format!("capacity {} is too large", capacity))
        })?;
        let mut slots = Self::empty_slots(slot_count);
        let mut tail = 0;
        while let Some(item) = self.pop() {
            slots[tail] = Some(item);
            tail += 1;
        }
        self.slots = slots;
        self.head = 0;
        self.tail = tail;
        Ok(())
    }
}
