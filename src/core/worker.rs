//! The single consumer of the record queue
//!
//! State machine:
//!
//! - `Running`: pull a batch (waiting at most 1 ms), hand it to the sinks,
//!   then check the stop flag. A set flag moves the worker to `Draining`.
//! - `Draining`: same cycle until the queue reports empty. Every record
//!   enqueued before the stop request is therefore written.
//! - `Stopped`: the queue is closed, stragglers that slipped in before the
//!   close are written, both sink buffers are force-flushed and the file
//!   handle is released. Terminal.

use super::blocking_queue::BlockingQueue;
use super::config::LoggerConfig;
use super::log_record::LogRecord;
use super::metrics::LoggerMetrics;
use crate::sinks::SinkManager;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Running => write!(f, "Running"),
            WorkerState::Draining => write!(f, "Draining"),
            WorkerState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// State shared between the logger facade and its worker
#[derive(Debug)]
pub(crate) struct Shared {
    pub config: RwLock<LoggerConfig>,
    /// Bumped under the config write lock on every change
    pub generation: AtomicU64,
    pub stopping: AtomicBool,
    pub flush_requested: AtomicBool,
    state: AtomicU8,
    pub metrics: Arc<LoggerMetrics>,
}

impl Shared {
    pub fn new(config: LoggerConfig, metrics: Arc<LoggerMetrics>) -> Self {
        Self {
            config: RwLock::new(config),
            generation: AtomicU64::new(0),
            stopping: AtomicBool::new(false),
            flush_requested: AtomicBool::new(false),
            state: AtomicU8::new(WorkerState::Running as u8),
            metrics,
        }
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

pub(crate) struct Worker {
    queue: Arc<BlockingQueue<LogRecord>>,
    shared: Arc<Shared>,
    sinks: SinkManager,
    /// Scratch vector reused for every batch
    batch: Vec<LogRecord>,
    batch_size: usize,
    seen_generation: u64,
    state: WorkerState,
}

impl Worker {
    pub fn new(
        queue: Arc<BlockingQueue<LogRecord>>,
        shared: Arc<Shared>,
        sinks: SinkManager,
        batch_size: usize,
    ) -> Self {
        let batch_size = batch_size.max(1);
        let seen_generation = shared.generation.load(Ordering::Acquire);
        Self {
            queue,
            shared,
            sinks,
            batch: Vec::with_capacity(batch_size),
            batch_size,
            seen_generation,
            state: WorkerState::Running,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    #[cfg(test)]
    pub fn sinks(&self) -> &SinkManager {
        &self.sinks
    }

    /// Advance the state machine by one cycle
    pub fn step(&mut self) -> WorkerState {
        match self.state {
            WorkerState::Running => {
                self.cycle();
                if self.shared.stopping.load(Ordering::Acquire) {
                    self.transition(WorkerState::Draining);
                }
            }
            WorkerState::Draining => {
                self.cycle();
                if self.queue.is_empty() {
                    self.finish();
                }
            }
            WorkerState::Stopped => {}
        }
        self.state
    }

    /// Drive the worker until it stops
    ///
    /// A panic inside a sink is caught: the queue is closed so producers
    /// cannot block forever, the state is set to `Stopped` and the panic
    /// message is returned.
    pub fn run(mut self) -> std::result::Result<(), String> {
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            while self.step() != WorkerState::Stopped {}
        }));

        match outcome {
            Ok(()) => Ok(()),
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Log worker panicked: {}. Queued records are lost.",
                    panic_msg
                );
                self.queue.close();
                self.shared.set_state(WorkerState::Stopped);
                Err(panic_msg)
            }
        }
    }

    fn cycle(&mut self) {
        self.refresh_config();
        if self.queue.dequeue_batch(self.batch_size, &mut self.batch) > 0 {
            self.sinks.process_batch(&mut self.batch);
        }
        if self.shared.flush_requested.swap(false, Ordering::AcqRel) {
            self.sinks.flush_all();
        }
    }

    fn refresh_config(&mut self) {
        let generation = self.shared.generation.load(Ordering::Acquire);
        if generation == self.seen_generation {
            return;
        }
        let config = self.shared.config.read().clone();
        self.seen_generation = generation;
        self.sinks.reconfigure(config);
    }

    fn finish(&mut self) {
        self.queue.close();
        // Producers that won the race against close
        while self.queue.dequeue_batch(self.batch_size, &mut self.batch) > 0 {
            self.sinks.process_batch(&mut self.batch);
        }
        self.sinks.close();
        self.transition(WorkerState::Stopped);
    }

    fn transition(&mut self, state: WorkerState) {
        self.state = state;
        self.shared.set_state(state);
    }
}
