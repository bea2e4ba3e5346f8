//! File logging example
//!
//! Demonstrates writing to a log file with size-triggered rotation and
//! retention of the most recent rotated files.
//!
//! Run with: cargo run --example file_logging

use ringlog::prelude::*;
use ringlog::Rotator;

fn main() -> Result<()> {
    println!("=== ringlog - File Logging Example ===\n");

    let logger = Logger::builder()
        .prefix_path(std::env::temp_dir())
        .log_dir_name("ringlog-demo")
        .log_file_name("application")
        .rotate(true)
        .file_max_bytes(4 * 1024)
        .file_count(3)
        .build()?;

    println!("1. Writing to {}", logger.config().active_file_path().display());
    logger.info("Application started");
    logger.debug("Loading configuration...");
    logger.warn("Using default settings for some options");

    println!("2. Generating enough records to rotate a few times");
    for i in 1..=500 {
        logger.info(format!("Processing item {}/500", i));
        if i % 100 == 0 {
            logger.warn(format!("Checkpoint at item {}", i));
        }
    }

    let config = logger.config();
    logger.shutdown()?;

    println!("\n3. Rotations performed: {}", logger.metrics().rotations());
    for path in Rotator::new(&config).rotated_files()? {
        println!("   kept {}", path.display());
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
