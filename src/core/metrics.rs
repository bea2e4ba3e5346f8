//! Logger metrics for observability
//!
//! Counters describing pipeline health: how many records went in and came
//! out, how often producers hit backpressure, and how the sinks are doing.

use std::sync::atomic::{AtomicU64, Ordering};

/// # Example
///
/// ```
/// use ringlog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_written(1);
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records accepted by the queue
    enqueued: AtomicU64,

    /// Records formatted by the worker
    written: AtomicU64,

    /// Records rejected because the logger had stopped
    dropped: AtomicU64,

    /// Enqueue calls that had to wait for room in a full queue
    producer_blocks: AtomicU64,

    /// Buffer writes to the active log file
    file_flushes: AtomicU64,

    /// Buffer writes to the console
    console_flushes: AtomicU64,

    /// Completed file rotations
    rotations: AtomicU64,

    /// Failed writes, flushes, renames and opens
    io_errors: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            producer_blocks: AtomicU64::new(0),
            file_flushes: AtomicU64::new(0),
            console_flushes: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            io_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn producer_blocks(&self) -> u64 {
        self.producer_blocks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn file_flushes(&self) -> u64 {
        self.file_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn console_flushes(&self) -> u64 {
        self.console_flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn io_errors(&self) -> u64 {
        self.io_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self, count: u64) -> u64 {
        self.written.fetch_add(count, Ordering::Relaxed)
    }

    /// Record a dropped record, returning the previous count
    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_producer_block(&self) -> u64 {
        self.producer_blocks.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_file_flush(&self) -> u64 {
        self.file_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_console_flush(&self) -> u64 {
        self.console_flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rotation(&self) -> u64 {
        self.rotations.fetch_add(1, Ordering::Relaxed)
    }

    /// Record an I/O failure, returning the previous count
    #[inline]
    pub fn record_io_error(&self) -> u64 {
        self.io_errors.fetch_add(1, Ordering::Relaxed)
    }

    /// Whether the `previous`-th event should be reported on stderr:
    /// the first one and every 1000th after it
    #[inline]
    pub fn should_alert(previous: u64) -> bool {
        previous == 0 || (previous + 1) % 1000 == 0
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            dropped: AtomicU64::new(self.dropped()),
            producer_blocks: AtomicU64::new(self.producer_blocks()),
            file_flushes: AtomicU64::new(self.file_flushes()),
            console_flushes: AtomicU64::new(self.console_flushes()),
            rotations: AtomicU64::new(self.rotations()),
            io_errors: AtomicU64::new(self.io_errors()),
        }
    }
}
