//! File sink with size-triggered rotation

use super::rotator::{open_log_file, Rotator};
use crate::core::{Formatter, LogRecord, LoggerConfig, LoggerError, LoggerMetrics, Result, Sink};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Buffers plain lines for the active log file
///
/// The buffer is written in a single call once it grows past half the
/// rotation threshold; each successful write is followed by a rotation check.
pub struct FileSink {
    path: PathBuf,
    handle: Option<File>,
    buffer: String,
    threshold: usize,
    formatter: Formatter,
    rotator: Rotator,
    metrics: Arc<LoggerMetrics>,
}

impl FileSink {
    /// Open (or create) the active file described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be created or the file
    /// cannot be opened.
    pub fn open(config: &LoggerConfig, metrics: Arc<LoggerMetrics>) -> Result<Self> {
        let path = config.active_file_path();
        let handle = open_log_file(&path)?;
        let threshold = config.file_flush_threshold();
        Ok(Self {
            path,
            handle: Some(handle),
            buffer: String::with_capacity(threshold.min(1 << 20)),
            threshold,
            formatter: Formatter::new(),
            rotator: Rotator::new(config),
            metrics,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Pick up new thresholds and rotation settings for the same file
    pub fn apply(&mut self, config: &LoggerConfig) {
        self.threshold = config.file_flush_threshold();
        self.rotator = Rotator::new(config);
    }

    /// Flush the buffer and release the file handle
    pub fn close(&mut self) -> Result<()> {
        let flushed = self.flush();
        drop(self.handle.take());
        flushed
    }

    fn write_buffer(&mut self) -> Result<()> {
        if self.handle.is_none() {
            // A failed rotation can leave us without a handle; reopen once per flush
            self.handle = Some(open_log_file(&self.path)?);
        }
        let file = match self.handle.as_mut() {
            Some(file) => file,
            None => return Err(LoggerError::file_sink(self.path.display().to_string(), "no open file")),
        };
        let written = file.write_all(self.buffer.as_bytes()).and_then(|()| file.flush());
        written.map_err(|e| {
            // Drop the handle so the next flush starts from a fresh open
            self.handle = None;
            LoggerError::file_sink(
                self.path.display().to_string(),
                format!("Failed to write {} buffered bytes: {}", self.buffer.len(), e),
            )
        })
    }

    /// Swap the open handle, e.g. for one whose writes fail
    #[cfg(test)]
    pub(crate) fn replace_handle(&mut self, handle: Option<File>) {
        self.handle = handle;
    }

    fn rotate(&mut self) -> Result<()> {
        if !self.rotator.is_enabled() {
            return Ok(());
        }
        if self.rotator.rotate_if_needed(&mut self.handle)?.is_some() {
            self.metrics.record_rotation();
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn append(&mut self, record: &LogRecord) {
        self.formatter.append_plain(&mut self.buffer, record);
    }

    fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn maybe_flush(&mut self) -> Result<bool> {
        if self.buffer.len() <= self.threshold {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Write the buffer, then run the rotation check
    ///
    /// The buffer is cleared even when the write fails; rotation only runs
    /// after a successful write.
    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let written = self.write_buffer();
        self.buffer.clear();
        written?;
        self.metrics.record_file_flush();
        self.rotate()
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Best effort - the worker closes the sink explicitly on shutdown
        let _ = self.close();
    }
}
