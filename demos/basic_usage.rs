//! Basic logger usage example
//!
//! Demonstrates console output with colors and the six record levels.
//!
//! Run with: cargo run --example basic_usage

use ringlog::prelude::*;
use ringlog::{info, warn};

fn main() -> Result<()> {
    println!("=== ringlog - Basic Usage Example ===\n");

    // Console only, colored by level
    let logger = Logger::builder().console(true).color(true).write_file(false).build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("2. Macros record the enclosing module as the function field:");
    let port = 8080;
    info!(logger, "Server listening on port {}", port);
    warn!(logger, "Retry attempt {} of {}", 3, 5);

    // Console output is buffered; shutdown writes it out
    logger.shutdown()?;

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
