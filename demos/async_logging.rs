//! Concurrent logging example
//!
//! Several producer threads share one logger. A small queue makes producers
//! wait for the worker instead of losing records, and shutdown writes
//! everything that was accepted.
//!
//! Run with: cargo run --example async_logging

use ringlog::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() -> Result<()> {
    println!("=== ringlog - Concurrent Logging Example ===\n");

    let logger = Arc::new(
        Logger::builder()
            .prefix_path(std::env::temp_dir())
            .log_dir_name("ringlog-demo")
            .log_file_name("concurrent")
            .queue_capacity(256)
            .build()?,
    );

    let start = Instant::now();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..10_000 {
                    logger.info(format!("worker {} event {}", t, i));
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            eprintln!("producer thread panicked");
        }
    }
    let produced = start.elapsed();

    // Changes apply at the worker's next batch
    logger.set_log_file_name("concurrent-tail");
    logger.info("written to the renamed file");

    logger.shutdown()?;
    let metrics = logger.metrics();

    println!("Produced {} records in {:?}", metrics.enqueued(), produced);
    println!("Written:  {}", metrics.written());
    println!("Flushes:  {} file", metrics.file_flushes());
    println!("State:    {}", logger.state());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
