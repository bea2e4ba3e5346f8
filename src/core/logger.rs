//! Logger facade
//!
//! Owns the record queue and the worker thread. Producers call the per-level
//! methods from any thread; each builds a [`LogRecord`] and enqueues it,
//! blocking only while the queue is full. [`Logger::shutdown`] sets the stop
//! flag and joins the worker, which drains the queue first.

use super::{
    blocking_queue::BlockingQueue,
    config::LoggerConfig,
    error::{LoggerError, Result},
    log_context::LogContext,
    log_level::LogLevel,
    log_record::LogRecord,
    metrics::LoggerMetrics,
    worker::{Shared, Worker, WorkerState},
};
use crate::sinks::SinkManager;
use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::{Arc, OnceLock};
use std::thread;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

type WorkerHandle = thread::JoinHandle<std::result::Result<(), String>>;

pub struct Logger {
    queue: Arc<BlockingQueue<LogRecord>>,
    shared: Arc<Shared>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl Logger {
    /// Build a logger from `config` and start its worker
    ///
    /// # Errors
    ///
    /// See [`LoggerBuilder::build`].
    pub fn new(config: LoggerConfig) -> Result<Self> {
        LoggerBuilder::new().config(config).build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```no_run
    /// use ringlog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .prefix_path("/var/tmp")
    ///     .log_file_name("server")
    ///     .rotate(true)
    ///     .file_max_bytes(16 * 1024 * 1024)
    ///     .build()
    ///     .unwrap();
    /// logger.info("ready");
    /// logger.shutdown().unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// The process-wide logger, created with default settings on first use
    ///
    /// Initialization failures are reported on stderr and degrade the
    /// logger instead of failing the caller: without a usable log file the
    /// file sink is disabled, and if the worker cannot start at all records
    /// are dropped.
    ///
    /// The global logger is never dropped; call `shutdown()` on it before the
    /// process exits to write out buffered records.
    pub fn global() -> &'static Logger {
        GLOBAL.get_or_init(|| LoggerBuilder::new().build_or_degrade())
    }

    /// Install a configured process-wide logger before its first use
    ///
    /// # Errors
    ///
    /// Fails with [`LoggerError::AlreadyInitialized`] if the global logger
    /// already exists, or with the builder's error if construction fails.
    pub fn init_global(builder: LoggerBuilder) -> Result<&'static Logger> {
        if GLOBAL.get().is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }
        let logger = builder.build()?;
        GLOBAL.set(logger).map_err(|rejected| {
            // Lost a race with another initializer; stop the spare worker
            let _ = rejected.shutdown();
            LoggerError::AlreadyInitialized
        })?;
        Self::global_if_initialized().ok_or(LoggerError::AlreadyInitialized)
    }

    fn global_if_initialized() -> Option<&'static Logger> {
        GLOBAL.get()
    }

    /// A logger that rejects every record
    fn inert(config: LoggerConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let shared = Arc::new(Shared::new(config, Arc::new(LoggerMetrics::new())));
        shared.stopping.store(true, Ordering::Release);
        shared.set_state(WorkerState::Stopped);
        let queue = Arc::new(BlockingQueue::new(capacity));
        queue.close();
        Self {
            queue,
            shared,
            worker: Mutex::new(None),
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let _ = self.submit(LogRecord::new(level, message.into(), LogContext::caller()));
    }

    /// Log with an explicit call-site context
    pub fn log_with_context(&self, level: LogLevel, message: impl Into<String>, context: LogContext) {
        let _ = self.submit(LogRecord::new(level, message.into(), context));
    }

    /// Like [`log`](Self::log), but report a rejected record to the caller
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::LoggerStopped`] once the worker has stopped.
    #[track_caller]
    pub fn try_log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        self.submit(LogRecord::new(level, message.into(), LogContext::caller()))
    }

    fn submit(&self, record: LogRecord) -> Result<()> {
        let metrics = &self.shared.metrics;
        match self.queue.enqueue_waited(record) {
            Ok(waited) => {
                if waited {
                    metrics.record_producer_block();
                }
                metrics.record_enqueued();
                Ok(())
            }
            Err(_) => {
                let previous = metrics.record_dropped();
                if LoggerMetrics::should_alert(previous) {
                    eprintln!(
                        "[LOGGER WARNING] Logger is stopped, {} records dropped.",
                        previous + 1
                    );
                }
                Err(LoggerError::LoggerStopped)
            }
        }
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl Into<String>) {
        self.log(LogLevel::Fatal, message);
    }

    /// Apply a configuration change; the worker picks it up before its next batch
    fn update(&self, change: impl FnOnce(&mut LoggerConfig)) -> &Self {
        let mut config = self.shared.config.write();
        let mut candidate = config.clone();
        change(&mut candidate);
        match candidate.validate() {
            Ok(()) => {
                *config = candidate;
                self.shared.generation.fetch_add(1, Ordering::Release);
            }
            Err(e) => eprintln!("[LOGGER WARNING] Ignoring configuration change: {}", e),
        }
        self
    }

    pub fn set_console(&self, enabled: bool) -> &Self {
        self.update(|c| c.console = enabled)
    }

    pub fn set_color(&self, enabled: bool) -> &Self {
        self.update(|c| c.color = enabled)
    }

    pub fn set_write_file(&self, enabled: bool) -> &Self {
        self.update(|c| c.write_file = enabled)
    }

    pub fn set_rotate(&self, enabled: bool) -> &Self {
        self.update(|c| c.rotate = enabled)
    }

    /// Rotation threshold in bytes; also rescales both flush thresholds
    pub fn set_file_max_size(&self, bytes: u64) -> &Self {
        self.update(|c| c.file_max_bytes = bytes)
    }

    /// Number of rotated files to keep (0 keeps all)
    pub fn set_file_count(&self, count: u32) -> &Self {
        self.update(|c| c.file_count = count)
    }

    pub fn set_log_dir_name(&self, name: impl Into<PathBuf>) -> &Self {
        let name = name.into();
        self.update(|c| c.dir = name)
    }

    pub fn set_prefix_path(&self, path: impl Into<PathBuf>) -> &Self {
        let path = path.into();
        self.update(|c| c.prefix = path)
    }

    /// Change the active file's base name
    ///
    /// Safe while records are flowing: the worker writes what it has buffered
    /// to the old file before switching.
    pub fn set_log_file_name(&self, name: impl Into<String>) -> &Self {
        let name = name.into();
        self.update(|c| c.base_name = name)
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> LoggerConfig {
        self.shared.config.read().clone()
    }

    /// # Example
    ///
    /// ```no_run
    /// use ringlog::Logger;
    ///
    /// let logger = Logger::builder().build().unwrap();
    /// logger.info("hello");
    /// logger.shutdown().unwrap();
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.written(), metrics.enqueued());
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    /// Records waiting in the queue
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Ask the worker to write both buffers at its next cycle
    ///
    /// Returns immediately; the write happens within one batch cycle.
    pub fn request_flush(&self) {
        self.shared.flush_requested.store(true, Ordering::Release);
    }

    /// Stop the worker after it has written every queued record
    ///
    /// Blocks until the worker reaches `Stopped`. Calling it again, or from
    /// several threads, is harmless: later callers wait for the first one.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::WorkerPanicked`] if the worker died.
    pub fn shutdown(&self) -> Result<()> {
        self.shared.stopping.store(true, Ordering::Release);
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return Ok(());
        };
        match handle.join() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(panic_msg)) => Err(LoggerError::WorkerPanicked(panic_msg)),
            Err(_) => {
                self.queue.close();
                self.shared.set_state(WorkerState::Stopped);
                Err(LoggerError::WorkerPanicked("worker thread aborted".to_string()))
            }
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            eprintln!("[LOGGER ERROR] Logger shutdown failed: {}", e);
        }

        let dropped = self.shared.metrics.dropped();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shut down after rejecting {} records",
                dropped
            );
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```no_run
/// use ringlog::prelude::*;
///
/// let logger = Logger::builder()
///     .console(true)
///     .color(false)
///     .log_dir_name("logs")
///     .queue_capacity(1024)
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    console_writer: Option<Box<dyn Write + Send>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            console_writer: None,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn color(mut self, enabled: bool) -> Self {
        self.config.color = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn write_file(mut self, enabled: bool) -> Self {
        self.config.write_file = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotate(mut self, enabled: bool) -> Self {
        self.config.rotate = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_max_bytes(mut self, bytes: u64) -> Self {
        self.config.file_max_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_count(mut self, count: u32) -> Self {
        self.config.file_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_dir_name(mut self, name: impl Into<PathBuf>) -> Self {
        self.config.dir = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.prefix = path.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_file_name(mut self, name: impl Into<String>) -> Self {
        self.config.base_name = name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Records drained per worker cycle (defaults to half the queue capacity)
    #[must_use = "builder methods return a new value"]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = Some(size);
        self
    }

    /// Send console output somewhere other than stdout
    #[must_use = "builder methods return a new value"]
    pub fn console_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.console_writer = Some(Box::new(writer));
        self
    }

    /// Build the Logger and start its worker thread
    ///
    /// # Errors
    ///
    /// - [`LoggerError::InvalidConfiguration`] for unusable settings
    /// - [`LoggerError::Initialization`] if the log directory or file cannot
    ///   be created, or the worker thread cannot be spawned
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            console_writer,
        } = self;
        config.validate()?;

        let metrics = Arc::new(LoggerMetrics::new());
        let writer = console_writer.unwrap_or_else(|| Box::new(std::io::stdout()));
        let sinks = SinkManager::with_console_writer(config.clone(), Arc::clone(&metrics), writer)?;

        let queue = Arc::new(BlockingQueue::new(config.queue_capacity));
        let batch_size = config.effective_batch_size();
        let shared = Arc::new(Shared::new(config, metrics));
        let worker = Worker::new(Arc::clone(&queue), Arc::clone(&shared), sinks, batch_size);

        let handle = thread::Builder::new()
            .name("ringlog-worker".to_string())
            .spawn(move || worker.run())
            .map_err(|e| LoggerError::initialization("ringlog-worker", format!("Failed to spawn worker thread: {}", e)))?;

        Ok(Logger {
            queue,
            shared,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Build, falling back to console-only and finally to an inert logger
    fn build_or_degrade(self) -> Logger {
        let config = self.config.clone();
        match self.build() {
            Ok(logger) => logger,
            Err(first) => {
                eprintln!(
                    "[LOGGER ERROR] {}. Continuing without file output.",
                    first
                );
                let fallback = LoggerConfig {
                    write_file: false,
                    ..config.clone()
                };
                match LoggerBuilder::new().config(fallback).build() {
                    Ok(logger) => logger,
                    Err(second) => {
                        eprintln!("[LOGGER ERROR] {}. Log records will be dropped.", second);
                        Logger::inert(config)
                    }
                }
            }
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
