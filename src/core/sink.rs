//! Sink trait for buffered log output destinations

use super::{error::Result, log_record::LogRecord};

/// An output destination that accumulates rendered lines and writes them in bulk
///
/// Sinks are owned by the worker thread; none of these methods synchronize.
pub trait Sink: Send {
    /// Render `record` into the sink's buffer
    fn append(&mut self, record: &LogRecord);

    /// Bytes rendered but not yet written
    fn pending(&self) -> usize;

    /// Write the buffer if it has grown past the sink's threshold
    ///
    /// Returns `Ok(true)` when a write happened. The buffer is cleared whether
    /// or not the write succeeded.
    fn maybe_flush(&mut self) -> Result<bool>;

    /// Write whatever is buffered, regardless of the threshold
    fn flush(&mut self) -> Result<()>;

    /// Short label used in diagnostics
    fn name(&self) -> &'static str;
}
