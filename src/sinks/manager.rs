//! Sink manager: routes formatted records to the file and console sinks
//!
//! Owned by the worker thread. Each sink flushes on its own threshold, so a
//! burst of file-only or console-only traffic only touches that sink. I/O
//! failures are reported on stderr and counted; they never reach producers.

use super::console::ConsoleSink;
use super::file::FileSink;
use crate::core::{LogRecord, LoggerConfig, LoggerError, LoggerMetrics, Result, Sink};
use std::io::Write;
use std::sync::Arc;

pub struct SinkManager {
    config: LoggerConfig,
    file: Option<FileSink>,
    console: ConsoleSink,
    metrics: Arc<LoggerMetrics>,
}

impl SinkManager {
    /// Build the sinks for `config`, writing console output to stdout
    pub fn new(config: LoggerConfig, metrics: Arc<LoggerMetrics>) -> Result<Self> {
        Self::with_console_writer(config, metrics, Box::new(std::io::stdout()))
    }

    /// Build the sinks for `config`, writing console output to `writer`
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Initialization`] if the file sink is enabled and
    /// its directory or file cannot be created.
    pub fn with_console_writer(
        config: LoggerConfig,
        metrics: Arc<LoggerMetrics>,
        writer: Box<dyn Write + Send>,
    ) -> Result<Self> {
        let file = if config.write_file {
            let sink = FileSink::open(&config, Arc::clone(&metrics)).map_err(|e| {
                LoggerError::initialization(config.active_file_path().display().to_string(), e.to_string())
            })?;
            Some(sink)
        } else {
            None
        };
        let console = ConsoleSink::with_writer(config.console_flush_threshold(), config.color, writer);
        Ok(Self {
            config,
            file,
            console,
            metrics,
        })
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Render one record into every enabled sink's buffer
    pub fn append(&mut self, record: &LogRecord) {
        if self.config.write_file {
            if let Some(file) = self.file.as_mut() {
                file.append(record);
            }
        }
        if self.config.console {
            self.console.append(record);
        }
    }

    /// Write the file buffer if it passed half the rotation threshold
    pub fn maybe_flush_file(&mut self) -> bool {
        let Some(file) = self.file.as_mut() else {
            return false;
        };
        let sink = file.name();
        match file.maybe_flush() {
            Ok(flushed) => flushed,
            Err(e) => {
                self.report(sink, "flush", &e);
                true
            }
        }
    }

    /// Write the console buffer if it passed a quarter of the rotation threshold
    pub fn maybe_flush_console(&mut self) -> bool {
        match self.console.maybe_flush() {
            Ok(flushed) => {
                if flushed {
                    self.metrics.record_console_flush();
                }
                flushed
            }
            Err(e) => {
                self.report(self.console.name(), "flush", &e);
                true
            }
        }
    }

    /// Append every record of `batch`, flushing sinks as thresholds are crossed
    ///
    /// The batch is left empty with its allocation intact.
    pub fn process_batch(&mut self, batch: &mut Vec<LogRecord>) {
        let count = batch.len() as u64;
        for record in batch.drain(..) {
            self.append(&record);
            self.maybe_flush_file();
            self.maybe_flush_console();
        }
        self.metrics.record_written(count);
    }

    /// Write both buffers regardless of their thresholds
    pub fn flush_all(&mut self) {
        if let Some(file) = self.file.as_mut() {
            let sink = file.name();
            if let Err(e) = file.flush() {
                self.report(sink, "flush", &e);
            }
        }
        let had_console = self.console.pending() > 0;
        match self.console.flush() {
            Ok(()) if had_console => {
                self.metrics.record_console_flush();
            }
            Ok(()) => {}
            Err(e) => self.report(self.console.name(), "flush", &e),
        }
    }

    /// Final flush, then release the file handle
    pub fn close(&mut self) {
        self.flush_all();
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.close() {
                self.report(file.name(), "close", &e);
            }
        }
    }

    /// Switch to a new configuration between batches
    ///
    /// A changed file path writes the pending buffer to the old file before
    /// the new one is opened. Disabling a sink flushes what it still holds.
    pub fn reconfigure(&mut self, config: LoggerConfig) {
        let path_changed = config.active_file_path() != self.config.active_file_path();

        if self.file.is_some() && (!config.write_file || path_changed) {
            if let Some(mut old) = self.file.take() {
                if let Err(e) = old.close() {
                    self.report(old.name(), "close", &e);
                }
            }
        }
        if let Some(file) = self.file.as_mut() {
            file.apply(&config);
        } else if config.write_file {
            match FileSink::open(&config, Arc::clone(&self.metrics)) {
                Ok(sink) => self.file = Some(sink),
                Err(e) => self.report("file", "open", &e),
            }
        }

        if self.config.console && !config.console {
            if let Err(e) = self.console.flush() {
                self.report(self.console.name(), "flush", &e);
            }
        }
        self.console.set_colors(config.color);
        self.console.set_threshold(config.console_flush_threshold());

        self.config = config;
    }

    /// Bytes waiting in the file buffer
    pub fn pending_file_bytes(&self) -> usize {
        self.file.as_ref().map_or(0, |f| f.pending())
    }

    /// Bytes waiting in the console buffer
    pub fn pending_console_bytes(&self) -> usize {
        self.console.pending()
    }

    pub fn has_open_file(&self) -> bool {
        self.file.is_some()
    }

    fn report(&self, sink: &str, operation: &str, err: &LoggerError) {
        let previous = self.metrics.record_io_error();
        if LoggerMetrics::should_alert(previous) {
            eprintln!(
                "[LOGGER ERROR] {} {} failed: {} ({} I/O errors so far, buffered output discarded)",
                sink,
                operation,
                err,
                previous + 1
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogContext, LogLevel};
    use parking_lot::Mutex;
    use std::fs;
    use std::io;
    use std::path::Path;
    use tempfile::tempdir;

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

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn record(msg: &str) -> LogRecord {
        LogRecord::new(LogLevel::Info, msg.to_string(), LogContext::new("m.rs", "m", 3))
    }

    fn config_in(dir: &Path) -> LoggerConfig {
        LoggerConfig {
            prefix: dir.to_path_buf(),
            console: true,
            color: false,
            file_max_bytes: 1 << 20,
            ..LoggerConfig::default()
        }
    }

    #[test]
    fn test_file_disabled_creates_nothing() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            write_file: false,
            ..config_in(dir.path())
        };
        let out = Captured::default();
        let mut manager =
            SinkManager::with_console_writer(config.clone(), Arc::new(LoggerMetrics::new()), Box::new(out.clone()))
                .unwrap();
        manager.append(&record("console only"));
        manager.close();
        assert!(!config.log_dir().exists());
        assert!(out.text().contains("[console only]"));
    }

    #[test]
    fn test_sinks_flush_independently() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            console: false,
            file_max_bytes: 400,
            ..config_in(dir.path())
        };
        let metrics = Arc::new(LoggerMetrics::new());
        let out = Captured::default();
        let mut manager =
            SinkManager::with_console_writer(config, Arc::clone(&metrics), Box::new(out.clone())).unwrap();

        let mut batch: Vec<LogRecord> = (0..20).map(|i| record(&format!("line {}", i))).collect();
        manager.process_batch(&mut batch);
        assert!(batch.is_empty());
        assert!(metrics.file_flushes() > 0);
        assert_eq!(metrics.console_flushes(), 0);
        assert_eq!(metrics.written(), 20);
        assert!(out.text().is_empty());
    }

    #[test]
    fn test_close_flushes_both_buffers() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let out = Captured::default();
        let mut manager =
            SinkManager::with_console_writer(config.clone(), Arc::new(LoggerMetrics::new()), Box::new(out.clone()))
                .unwrap();

        manager.append(&record("pending"));
        assert!(manager.pending_file_bytes() > 0);
        assert!(manager.pending_console_bytes() > 0);

        manager.close();
        assert_eq!(manager.pending_file_bytes(), 0);
        assert_eq!(manager.pending_console_bytes(), 0);
        assert!(!manager.has_open_file());
        assert!(fs::read_to_string(config.active_file_path()).unwrap().contains("[pending]"));
        assert!(out.text().contains("[pending]"));
    }

    #[test]
    fn test_reconfigure_switches_file() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let mut manager = SinkManager::with_console_writer(
            config.clone(),
            Arc::new(LoggerMetrics::new()),
            Box::new(io::sink()),
        )
        .unwrap();

        manager.append(&record("old file"));
        let renamed = LoggerConfig {
            base_name: "renamed".to_string(),
            ..config.clone()
        };
        manager.reconfigure(renamed.clone());
        manager.append(&record("new file"));
        manager.close();

        let old = fs::read_to_string(config.active_file_path()).unwrap();
        let new = fs::read_to_string(renamed.active_file_path()).unwrap();
        assert!(old.contains("[old file]") && !old.contains("[new file]"));
        assert!(new.contains("[new file]") && !new.contains("[old file]"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_file_write_failure_is_counted_and_logging_continues() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            console: false,
            ..config_in(dir.path())
        };
        let metrics = Arc::new(LoggerMetrics::new());
        let mut manager =
            SinkManager::with_console_writer(config.clone(), Arc::clone(&metrics), Box::new(io::sink()))
                .unwrap();

        let full = fs::OpenOptions::new().write(true).open("/dev/full").unwrap();
        manager.file.as_mut().unwrap().replace_handle(Some(full));
        manager.append(&record("lost"));
        manager.flush_all();
        assert_eq!(metrics.io_errors(), 1);
        assert_eq!(manager.pending_file_bytes(), 0);
        assert!(manager.has_open_file());

        manager.append(&record("kept"));
        manager.close();
        assert_eq!(metrics.io_errors(), 1);
        let content = fs::read_to_string(config.active_file_path()).unwrap();
        assert!(!content.contains("[lost]"));
        assert!(content.contains("[kept]"));
    }

    #[test]
    fn test_console_write_failure_is_counted() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            write_file: false,
            ..config_in(dir.path())
        };
        let metrics = Arc::new(LoggerMetrics::new());
        let mut manager =
            SinkManager::with_console_writer(config, Arc::clone(&metrics), Box::new(Broken)).unwrap();
        manager.append(&record("nowhere"));
        manager.close();
        assert_eq!(metrics.io_errors(), 1);
        assert_eq!(metrics.console_flushes(), 0);
        assert_eq!(manager.pending_console_bytes(), 0);
    }

    #[test]
    fn test_open_failure_is_initialization_error() {
        let dir = tempdir().unwrap();
        // A regular file where the log directory should be
        let blocker = dir.path().join("log");
        fs::write(&blocker, "not a directory").unwrap();

        let result = SinkManager::with_console_writer(
            config_in(dir.path()),
            Arc::new(LoggerMetrics::new()),
            Box::new(io::sink()),
        );
        assert!(matches!(result, Err(LoggerError::Initialization { .. })));
    }
}
