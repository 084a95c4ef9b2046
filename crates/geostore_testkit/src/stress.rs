//! Stress runs for the write-then-read cache life cycle.
//!
//! These runs verify behavior under concurrent batch writers and readers.

use geostore_codec::{Coordinate, CoordinateDataType};
use geostore_core::{import_entries, DataMap, DenseDataMap, ImportStats};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress run.
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
}

/// Configuration for stress runs.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Nodes written per thread.
    pub nodes_per_thread: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Entries per batch.
    pub batch_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            nodes_per_thread: 10_000,
            threads: 4,
            batch_size: 1_000,
        }
    }
}

/// The coordinate stored for node `id` by the stress runs.
pub fn node_coordinate(id: i64) -> Coordinate {
    Coordinate::new((id % 360) as f64 - 180.0, (id % 180) as f64 - 90.0)
}

/// Writes disjoint id ranges from `config.threads` batch writers into one map.
pub fn stress_concurrent_writes(
    map: &Mutex<DenseDataMap<CoordinateDataType>>,
    config: &StressConfig,
) -> StressTestResult {
    let stats = ImportStats::new();
    let failed = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for worker in 0..config.threads {
            let (stats, failed) = (&stats, &failed);
            scope.spawn(move || {
                let first = (worker * config.nodes_per_thread) as i64;
                let entries = (first..first + config.nodes_per_thread as i64)
                    .map(|id| (id, node_coordinate(id)));
                if import_entries(map, entries, config.batch_size, stats).is_err() {
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    StressTestResult::new(
        stats.entries_written() as usize,
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

/// Reads every id in `0..len` from `config.threads` threads sharing `map`.
pub fn stress_concurrent_reads<M>(map: &M, len: i64, config: &StressConfig) -> StressTestResult
where
    M: DataMap<Coordinate>,
{
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for _ in 0..config.threads {
            let (successful, failed) = (&successful, &failed);
            scope.spawn(move || {
                for id in 0..len {
                    match map.get(id) {
                        Ok(Some(c)) if c == node_coordinate(id) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        _ => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}
