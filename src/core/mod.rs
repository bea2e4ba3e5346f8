//! Core logger types: records, the queue, the worker and the facade

pub mod blocking_queue;
pub mod config;
pub mod error;
pub mod formatter;
pub mod log_context;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod ring_buffer;
pub mod sink;
pub mod worker;

pub use blocking_queue::{BlockingQueue, BATCH_WAIT};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use formatter::{Formatter, RenderedLine};
pub use log_context::LogContext;
pub use log_level::LogLevel;
pub use log_record::LogRecord;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use ring_buffer::RingBuffer;
pub use sink::Sink;
pub use worker::WorkerState;
