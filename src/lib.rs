//! # ringlog
//!
//! An in-process asynchronous logger. Producer threads hand records to a
//! bounded queue and return; a single worker thread formats them, buffers
//! the output per sink and writes it to a log file and/or the console.
//!
//! ## Features
//!
//! - **Backpressure**: producers block while the queue is full, nothing is silently dropped
//! - **Batched output**: file and console buffers flush on size thresholds
//! - **Rotation**: the active file is renamed with a timestamp once it grows too large
//! - **Orderly shutdown**: every accepted record is written before the worker stops
//!
//! ```no_run
//! use ringlog::prelude::*;
//!
//! let logger = Logger::builder().console(true).build().unwrap();
//! logger.info("service started");
//! ringlog::warn!(logger, "{} retries left", 3);
//! logger.shutdown().unwrap();
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        LogContext, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
        Result, WorkerState,
    };
}

pub use core::{
    BlockingQueue, Formatter, LogContext, LogLevel, LogRecord, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, LoggerMetrics, RenderedLine, Result, RingBuffer, Sink, WorkerState,
};
pub use sinks::{ConsoleSink, FileSink, Rotator, SinkManager};
