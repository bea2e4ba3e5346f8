//! Log record structure

use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};

/// A single log entry, built at the call site and moved through the queue to the worker
///
/// Message text is kept verbatim; embedded newlines are not escaped.
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: LogLevel,
    message: String,
    context: LogContext,
    produced_at: DateTime<Local>,
}

impl LogRecord {
    pub fn new(level: LogLevel, message: String, context: LogContext) -> Self {
        Self {
            level,
            message,
            context,
            produced_at: Local::now(),
        }
    }

    /// Override the production time (used to render deterministic lines)
    #[must_use]
    pub fn with_produced_at(mut self, produced_at: DateTime<Local>) -> Self {
        self.produced_at = produced_at;
        self
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn context(&self) -> &LogContext {
        &self.context
    }

    #[inline]
    pub fn produced_at(&self) -> &DateTime<Local> {
        &self.produced_at
    }
}
