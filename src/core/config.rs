//! Logger configuration
//!
//! Holds the sink settings (console/color/file/rotation toggles, size
//! threshold, retention count and path components) plus the queue sizing.
//! Loadable from JSON; every field is optional and falls back to its default.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default rotation threshold (128 MiB)
pub const DEFAULT_FILE_MAX_BYTES: u64 = 128 * 1024 * 1024;

/// Default queue capacity (8192 records)
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 13;

/// Largest accepted queue capacity (4Mi records)
///
/// The ring's slots are allocated up front, so the capacity has to stay
/// within what a process can actually allocate.
pub const MAX_QUEUE_CAPACITY: usize = 1 << 22;

/// Extension of active and rotated log files
pub const LOG_FILE_EXTENSION: &str = "log";

/// Layout of the timestamp appended to rotated file names
pub const ROTATION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// # Example
///
/// ```
/// use ringlog::LoggerConfig;
///
/// let config = LoggerConfig::from_json_str(r#"{ "base_name": "server", "rotate": true }"#).unwrap();
/// assert!(config.rotate);
/// assert!(config.active_file_path().ends_with("log/server.log"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Print records to the console sink
    pub console: bool,
    /// Wrap console lines in level colors
    pub color: bool,
    /// Persist records to the active log file
    pub write_file: bool,
    /// Rotate the active file once it reaches `file_max_bytes`
    pub rotate: bool,
    /// Rotation threshold; the file buffer flushes at half of it, the console buffer at a quarter
    pub file_max_bytes: u64,
    /// Number of rotated files kept on disk (0 keeps all)
    pub file_count: u32,
    pub dir: PathBuf,
    pub prefix: PathBuf,
    pub base_name: String,
    /// Records the queue holds before producers block
    pub queue_capacity: usize,
    /// Records drained per worker cycle; `None` means half the queue capacity
    pub batch_size: Option<usize>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: false,
            color: true,
            write_file: true,
            rotate: false,
            file_max_bytes: DEFAULT_FILE_MAX_BYTES,
            file_count: 10,
            dir: PathBuf::from("log"),
            prefix: PathBuf::from("."),
            base_name: "app".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            batch_size: None,
        }
    }
}

impl LoggerConfig {
    /// Parse a configuration from JSON
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::JsonError`] for malformed input and
    /// [`LoggerError::InvalidConfiguration`] if the values fail validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger config",
                format!("Failed to read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&text)
    }

    /// Check the values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config("queue_capacity", "must be non-zero"));
        }
        if self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(LoggerError::config(
                "queue_capacity",
                format!("must be at most {}, got {}", MAX_QUEUE_CAPACITY, self.queue_capacity),
            ));
        }
        match self.batch_size {
            Some(0) => return Err(LoggerError::config("batch_size", "must be non-zero")),
            Some(batch) if batch > self.queue_capacity => {
                return Err(LoggerError::config(
                    "batch_size",
                    format!(
                        "must not exceed queue_capacity ({}), got {}",
                        self.queue_capacity, batch
                    ),
                ))
            }
            _ => {}
        }
        if self.file_max_bytes == 0 {
            return Err(LoggerError::config("file_max_bytes", "must be non-zero"));
        }
        if self.base_name.is_empty() {
            return Err(LoggerError::config("base_name", "must not be empty"));
        }
        Ok(())
    }

    /// Effective batch size, between 1 and the queue capacity
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size
            .unwrap_or(self.queue_capacity / 2)
            .min(self.queue_capacity)
            .max(1)
    }

    /// File buffer flush threshold in bytes
    pub fn file_flush_threshold(&self) -> usize {
        usize::try_from(self.file_max_bytes / 2).unwrap_or(usize::MAX)
    }

    /// Console buffer flush threshold in bytes
    pub fn console_flush_threshold(&self) -> usize {
        usize::try_from(self.file_max_bytes / 4).unwrap_or(usize::MAX)
    }

    /// `{prefix}/{dir}`
    pub fn log_dir(&self) -> PathBuf {
        self.prefix.join(&self.dir)
    }

    /// `{prefix}/{dir}/{base_name}.log`
    pub fn active_file_path(&self) -> PathBuf {
        self.log_dir()
            .join(format!("{}.{}", self.base_name, LOG_FILE_EXTENSION))
    }

    /// `{prefix}/{dir}/{base_name}_{timestamp}.log`
    pub fn rotated_file_path(&self, timestamp: &str) -> PathBuf {
        self.log_dir().join(format!(
            "{}_{}.{}",
            self.base_name, timestamp, LOG_FILE_EXTENSION
        ))
    }
}
