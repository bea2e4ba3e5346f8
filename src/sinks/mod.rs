//! Output sinks and the manager that drives them

pub mod console;
pub mod file;
pub mod manager;
pub mod rotator;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use manager::SinkManager;
pub use rotator::Rotator;

// Re-export the trait next to its implementations
pub use crate::core::Sink;
