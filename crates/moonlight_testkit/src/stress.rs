//! Stress tests for MoonlightDB.
//!
//! These tests verify behavior under heavy load and concurrent access.

use moonlight_core::{Collection, Filter, Record, Update};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Length of the text payload in each record.
    pub payload_size: usize,
    /// Number of distinct keys records are spread over. Zero acts as one.
    pub key_count: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 1_000,
            threads: 4,
            payload_size: 64,
            key_count: 50,
        }
    }
}

fn keyed_record(key: usize, payload: &str) -> Record {
    Record::new()
        .with("key", key as i64)
        .with("payload", payload)
}

/// Run a sequential insert stress test.
pub fn stress_sequential_inserts(collection: &Collection, config: &StressConfig) -> StressTestResult {
    let payload = "x".repeat(config.payload_size);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        match collection.insert_one(keyed_record(i % config.key_count.max(1), &payload)) {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run a mixed find/update/delete/insert stress test.
///
/// Misses from `find_one` and `delete_one` count as successful calls.
pub fn stress_mixed_operations(collection: &Collection, config: &StressConfig) -> StressTestResult {
    let payload = "x".repeat(config.payload_size);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = i % config.key_count.max(1);
        let filter = Filter::eq("key", key as i64);

        let result = match i % 4 {
            0 => collection
                .insert_one(keyed_record(key, &payload))
                .map(|_| ()),
            1 => collection
                .update(&filter, &Update::set(Record::new().with("touched", true)))
                .map(|_| ()),
            2 => match collection.find_one(&filter) {
                Err(e) if e.is_not_found() => Ok(()),
                other => other.map(|_| ()),
            },
            _ => match collection.delete_one(&filter) {
                Err(e) if e.is_not_found() => Ok(()),
                other => other.map(|_| ()),
            },
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Run inserts from several threads against handles to one collection.
///
/// Every handle must share the collection lock, so no insert may be lost.
/// All `config.operations` inserts are spread over the threads, the first
/// threads taking one extra when the split is uneven. Zero threads runs
/// everything on one thread.
pub fn stress_concurrent_inserts(collection: &Collection, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let threads = config.threads.max(1);
    let payload = Arc::new("x".repeat(config.payload_size));

    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let (first_key, count) = thread_share(config.operations, threads, t);
            let collection = collection.clone();
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let payload = Arc::clone(&payload);

            thread::spawn(move || {
                for key in first_key..first_key + count {
                    let record = keyed_record(key, &payload).with("thread", t as i64);
                    match collection.insert_one(record) {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Returns the first key and the operation count for thread `t`.
fn thread_share(operations: usize, threads: usize, t: usize) -> (usize, usize) {
    let base = operations / threads;
    let extra = operations % threads;
    let first_key = t * base + t.min(extra);
    (first_key, base + usize::from(t < extra))
}
