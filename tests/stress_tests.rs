//! Stress tests for the record pipeline under load
//!
//! These tests verify:
//! - Per-producer ordering survives many concurrent producers
//! - A tiny queue blocks producers instead of losing records
//! - Rotation under sustained load neither loses nor duplicates records
//! - Producers racing shutdown either get written or get counted as dropped

use rand::Rng;
use ringlog::prelude::*;
use ringlog::{BlockingQueue, Rotator};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn builder_in(dir: &Path) -> LoggerBuilder {
    Logger::builder()
        .prefix_path(dir)
        .console_writer(std::io::sink())
}

/// Parse `[producer P seq S ...]` from the message field of a line
fn producer_and_seq(line: &str) -> Option<(usize, usize)> {
    let start = line.find("[producer ")?;
    let mut words = line[start + 1..].split_whitespace();
    words.next()?;
    let producer = words.next()?.parse().ok()?;
    words.next()?;
    let seq = words.next()?.trim_end_matches(']').parse().ok()?;
    Some((producer, seq))
}

fn all_lines(config: &LoggerConfig) -> Vec<String> {
    let mut files = Rotator::new(config).rotated_files().expect("Failed to list rotated files");
    files.push(config.active_file_path());
    files
        .iter()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .flat_map(|content| content.lines().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

fn assert_per_producer_order(lines: &[String], producers: usize, per_producer: usize) {
    let mut next: HashMap<usize, usize> = HashMap::new();
    for line in lines {
        let (producer, seq) = producer_and_seq(line).unwrap_or_else(|| panic!("malformed line: {}", line));
        let expected = next.entry(producer).or_insert(0);
        assert_eq!(seq, *expected, "producer {} out of order", producer);
        *expected += 1;
    }
    assert_eq!(next.len(), producers);
    assert!(next.values().all(|&count| count == per_producer));
}

/// Many producers, exact count and per-producer order in the output
#[test]
fn test_concurrent_producers_keep_order() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        builder_in(temp_dir.path())
            .queue_capacity(256)
            .batch_size(32)
            .build()
            .expect("Failed to build logger"),
    );

    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 2_000;

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    logger.info(format!("producer {} seq {}", p, seq));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    let config = logger.config();
    logger.shutdown().expect("Failed to shut down");

    let lines = all_lines(&config);
    assert_eq!(lines.len(), PRODUCERS * PER_PRODUCER);
    assert_per_producer_order(&lines, PRODUCERS, PER_PRODUCER);
    assert_eq!(logger.metrics().written(), (PRODUCERS * PER_PRODUCER) as u64);
}

/// A queue of four records forces producers to wait on the worker
#[test]
fn test_tiny_queue_applies_backpressure() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        builder_in(temp_dir.path())
            .queue_capacity(4)
            .build()
            .expect("Failed to build logger"),
    );

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 500;

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for seq in 0..PER_PRODUCER {
                    let padding = "x".repeat(rng.gen_range(0..200));
                    logger.warn(format!("producer {} seq {} {}", p, seq, padding));
                    assert!(logger.queued() <= 4);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    let config = logger.config();
    logger.shutdown().expect("Failed to shut down");

    let lines = all_lines(&config);
    assert_eq!(lines.len(), PRODUCERS * PER_PRODUCER);
    assert_per_producer_order(&lines, PRODUCERS, PER_PRODUCER);
    assert_eq!(logger.metrics().dropped(), 0);
    assert!(logger.metrics().producer_blocks() > 0);
}

/// Rotation every few kilobytes while several threads write
#[test]
fn test_rotation_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        builder_in(temp_dir.path())
            .rotate(true)
            .file_max_bytes(8 * 1024)
            .file_count(0)
            .queue_capacity(64)
            .build()
            .expect("Failed to build logger"),
    );

    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 1_000;

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    logger.error(format!("producer {} seq {}", p, seq));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    let config = logger.config();
    logger.shutdown().expect("Failed to shut down");

    assert!(logger.metrics().rotations() > 1);
    let lines = all_lines(&config);
    assert_eq!(lines.len(), PRODUCERS * PER_PRODUCER);
    assert_per_producer_order(&lines, PRODUCERS, PER_PRODUCER);
}

/// Records are either written or counted as dropped, never lost silently
#[test]
fn test_producers_racing_shutdown() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        builder_in(temp_dir.path())
            .queue_capacity(32)
            .build()
            .expect("Failed to build logger"),
    );
    let attempted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|p| {
            let logger = Arc::clone(&logger);
            let attempted = Arc::clone(&attempted);
            thread::spawn(move || {
                for seq in 0..5_000 {
                    logger.debug(format!("producer {} seq {}", p, seq));
                    attempted.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    logger.shutdown().expect("Failed to shut down");
    for handle in handles {
        handle.join().expect("producer panicked");
    }

    let metrics = logger.metrics();
    let attempted = attempted.load(Ordering::Relaxed) as u64;
    assert_eq!(metrics.enqueued() + metrics.dropped(), attempted);
    assert_eq!(metrics.written(), metrics.enqueued());

    let config = logger.config();
    assert_eq!(all_lines(&config).len() as u64, metrics.written());
}

/// The queue alone: producers blocked on a full queue all get through
#[test]
fn test_blocking_queue_many_producers() {
    let queue = Arc::new(BlockingQueue::new(2));
    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut batch = Vec::new();
            let mut received = Vec::new();
            while received.len() < 4_000 {
                queue.dequeue_batch(3, &mut batch);
                assert!(batch.len() <= 3);
                received.append(&mut batch);
            }
            received
        })
    };

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..1_000usize {
                    queue.enqueue((p, seq)).expect("queue closed early");
                }
            })
        })
        .collect();
    for handle in producers {
        handle.join().expect("producer panicked");
    }

    let received = consumer.join().expect("consumer panicked");
    assert_eq!(received.len(), 4_000);
    let mut next = [0usize; 4];
    for (p, seq) in received {
        assert_eq!(seq, next[p]);
        next[p] += 1;
    }
    assert!(queue.blocked_pushes() > 0);
}
