//! Line rendering for log records
//!
//! Every record renders to a plain line for the file sink and a decorated
//! line for the console:
//!
//! ```text
//! [2026-10-16 09:30:45.123][INFO][src/main.rs][app::run][42][Server started]
//! ```
//!
//! The decorated line is the same text wrapped in the level's color escape and
//! a reset. Message text is passed through untouched.

use super::log_level::COLOR_RESET;
use super::log_record::LogRecord;
use std::fmt::Write as _;

/// Timestamp layout used in every rendered line (local time, milliseconds)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Both renderings of one record, without trailing newlines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub plain: String,
    pub decorated: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Self
    }

    /// Render `record` both ways
    pub fn render(&self, record: &LogRecord) -> RenderedLine {
        let plain = self.plain_line(record);
        let decorated = self.decorated_line(record);
        RenderedLine { plain, decorated }
    }

    /// `[timestamp][LEVEL][file][function][line][text]`
    pub fn plain_line(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(64 + record.message().len());
        self.write_plain(&mut line, record);
        line
    }

    /// Plain line wrapped in the level's color and a reset
    pub fn decorated_line(&self, record: &LogRecord) -> String {
        let mut line = String::with_capacity(80 + record.message().len());
        line.push_str(&record.level().color_prefix());
        self.write_plain(&mut line, record);
        line.push_str(COLOR_RESET);
        line
    }

    /// Append the plain rendering plus `'\n'` to `buf`
    pub fn append_plain(&self, buf: &mut String, record: &LogRecord) {
        self.write_plain(buf, record);
        buf.push('\n');
    }

    /// Append the decorated rendering plus `'\n'` to `buf`
    pub fn append_decorated(&self, buf: &mut String, record: &LogRecord) {
        buf.push_str(&record.level().color_prefix());
        self.write_plain(buf, record);
        buf.push_str(COLOR_RESET);
        buf.push('\n');
    }

    fn write_plain(&self, buf: &mut String, record: &LogRecord) {
        let ctx = record.context();
        // Writing into a String cannot fail
        let _ = write!(
            buf,
            "[{}][{}][{}][{}][{}][{}]",
            record.produced_at().format(TIMESTAMP_FORMAT),
            record.level().to_str(),
            ctx.file,
            ctx.function,
            ctx.line,
            record.message()
        );
    }
}
