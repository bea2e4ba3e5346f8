//! Call-site context captured when a record is produced

use std::cell::RefCell;
use std::fmt;

// Thread-local cache so the thread id string is built once per thread
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn current_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Where a record came from: producing thread, source file, function and line
///
/// # Example
///
/// ```
/// use ringlog::LogContext;
///
/// let ctx = LogContext::new("src/main.rs", "app::startup", 42);
/// assert_eq!(ctx.line, 42);
/// assert_eq!(ctx.function, "app::startup");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogContext {
    pub thread_id: String,
    pub file: &'static str,
    pub function: &'static str,
    pub line: u32,
}

impl LogContext {
    /// Build a context for the calling thread with an explicit location
    pub fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            thread_id: current_thread_id(),
            file,
            function,
            line,
        }
    }

    /// Capture the caller's file and line
    ///
    /// Rust has no stable way to name the calling function, so `function` is
    /// left as `"-"`. The logging macros fill it with `module_path!()`.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), "-", location.line())
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.function, self.line)
    }
}
