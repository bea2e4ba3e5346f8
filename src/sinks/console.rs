//! Console sink

use crate::core::{Formatter, LogRecord, Result, Sink};
use std::io::{self, Write};

/// Buffers console lines and writes them in one call once the buffer passes its threshold
///
/// Writes to stdout unless another writer is supplied (tests capture output
/// this way).
pub struct ConsoleSink {
    buffer: String,
    threshold: usize,
    use_colors: bool,
    formatter: Formatter,
    writer: Box<dyn Write + Send>,
}

impl ConsoleSink {
    pub fn new(threshold: usize, use_colors: bool) -> Self {
        Self::with_writer(threshold, use_colors, Box::new(io::stdout()))
    }

    pub fn with_writer(threshold: usize, use_colors: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            buffer: String::new(),
            threshold,
            use_colors,
            formatter: Formatter::new(),
            writer,
        }
    }

    pub fn set_colors(&mut self, use_colors: bool) {
        self.use_colors = use_colors;
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Sink for ConsoleSink {
    fn append(&mut self, record: &LogRecord) {
        if self.use_colors {
            self.formatter.append_decorated(&mut self.buffer, record);
        } else {
            self.formatter.append_plain(&mut self.buffer, record);
        }
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

    fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let written = self
            .writer
            .write_all(self.buffer.as_bytes())
            .and_then(|()| self.writer.flush());
        self.buffer.clear();
        written?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn record(level: LogLevel, msg: &str) -> LogRecord {
        LogRecord::new(level, msg.to_string(), LogContext::new("t.rs", "t", 1))
    }

    #[test]
    fn test_holds_output_until_threshold() {
        let out = Captured::default();
        let mut sink = ConsoleSink::with_writer(200, false, Box::new(out.clone()));

        sink.append(&record(LogLevel::Info, "short"));
        assert!(!sink.maybe_flush().unwrap());
        assert!(out.0.lock().is_empty());

        while sink.pending() <= 200 {
            sink.append(&record(LogLevel::Info, "filler"));
        }
        assert!(sink.maybe_flush().unwrap());
        assert_eq!(sink.pending(), 0);
        let text = String::from_utf8(out.0.lock().clone()).unwrap();
        assert!(text.contains("[short]"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_colored_lines_end_with_reset() {
        let out = Captured::default();
        let mut sink = ConsoleSink::with_writer(0, true, Box::new(out.clone()));
        sink.append(&record(LogLevel::Fatal, "boom"));
        sink.flush().unwrap();

        let text = String::from_utf8(out.0.lock().clone()).unwrap();
        assert!(text.starts_with("\x1b[35m"));
        assert!(text.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn test_failed_write_clears_buffer() {
        let mut sink = ConsoleSink::with_writer(0, false, Box::new(Broken));
        sink.append(&record(LogLevel::Error, "lost"));
        assert!(sink.maybe_flush().is_err());
        assert_eq!(sink.pending(), 0);
    }
}
