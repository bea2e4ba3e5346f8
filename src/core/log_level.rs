//! Log level definitions

use colored::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ANSI sequence written after every decorated console line
pub const COLOR_RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Fixed console color for this level
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Blue,
            LogLevel::Debug => Color::Yellow,
            LogLevel::Info => Color::Cyan,
            LogLevel::Warning => Color::Green,
            LogLevel::Error => Color::Red,
            LogLevel::Fatal => Color::Magenta,
        }
    }

    /// Escape sequence that switches the terminal to this level's color
    ///
    /// Built from the color table directly instead of through `Colorize`, so the
    /// output does not depend on whether stdout is a terminal.
    pub fn color_prefix(&self) -> String {
        format!("\x1b[{}m", self.color().to_fg_str())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_table() {
        assert_eq!(LogLevel::Info.color_prefix(), "\x1b[36m");
        assert_eq!(LogLevel::Warning.color_prefix(), "\x1b[32m");
        assert_eq!(LogLevel::Debug.color_prefix(), "\x1b[33m");
        assert_eq!(LogLevel::Error.color_prefix(), "\x1b[31m");
        assert_eq!(LogLevel::Fatal.color_prefix(), "\x1b[35m");
        assert_eq!(LogLevel::Trace.color_prefix(), "\x1b[34m");
    }

    #[test]
    fn test_colors_are_distinct() {
        let mut prefixes: Vec<String> = LogLevel::ALL.iter().map(|l| l.color_prefix()).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), 6);
    }

    #[test]
    fn test_parse_warning_aliases() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert!("verbose".parse::<LogLevel>().is_err());
    }
}
