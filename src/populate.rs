//! Populate command: generate course records and bulk-insert them.
//!
//! Records are written in contiguous fixed-size batches, one blocking store
//! call at a time. A failed batch is counted and logged, and the run moves on
//! to the next batch; nothing is retried or rolled back. A configured pause
//! between batches keeps the request rate under provisioned throughput.

use std::time::{Duration, Instant};

use anyhow::Context;

use crate::config::RunConfig;
use crate::course::Course;
use crate::export;
use crate::generate::CourseGenerator;
use crate::store::{CourseStore, DynamoStore};

/// Metrics from a populate run.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Records written by successful batches.
    pub inserted: u64,
    /// Records belonging to failed batches.
    pub failed: u64,
    /// Bulk-write calls issued.
    pub batch_count: u64,
    /// Wall-clock time for the whole write loop.
    pub duration: Duration,
}

impl PopulateMetrics {
    /// Calculate inserted rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.inserted as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Insert `courses` in contiguous batches of `batch_size`, in order,
/// continuing past per-batch failures.
///
/// Returns the metrics and the records that were actually written, so the
/// caller can exclude failed batches from the audit export. `batch_size`
/// must be non-zero (enforced by [`RunConfig::validate`]).
pub async fn write_in_batches<S: CourseStore + ?Sized>(
    store: &S,
    courses: Vec<Course>,
    batch_size: usize,
    delay: Duration,
) -> (PopulateMetrics, Vec<Course>) {
    let start = Instant::now();
    let mut metrics = PopulateMetrics::default();
    let mut written = Vec::with_capacity(courses.len());
    let total_batches = courses.len().div_ceil(batch_size.max(1));

    for (index, batch) in courses.chunks(batch_size.max(1)).enumerate() {
        match store.put_batch(batch).await {
            Ok(()) => {
                metrics.inserted += batch.len() as u64;
                written.extend_from_slice(batch);
                tracing::info!(
                    "Batch {}/{}: {} records inserted (total {})",
                    index + 1,
                    total_batches,
                    batch.len(),
                    metrics.inserted
                );
            }
            Err(e) => {
                metrics.failed += batch.len() as u64;
                tracing::error!(
                    "Batch {}/{}: insert failed, continuing with next batch: {}",
                    index + 1,
                    total_batches,
                    e
                );
            }
        }
        metrics.batch_count += 1;

        if index + 1 < total_batches && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    metrics.duration = start.elapsed();
    (metrics, written)
}

/// Run the populate command against the configured DynamoDB table.
pub async fn run_populate(config: &RunConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Populating table '{}' with {} records for tenant '{}'",
        config.table,
        config.total_records,
        config.tenant_id
    );
    let store = DynamoStore::connect(&config.region, &config.table)
        .await
        .context("failed to reach the course table")?;
    run_populate_with(&store, config).await
}

/// Populate against any store implementation.
pub async fn run_populate_with<S: CourseStore>(store: &S, config: &RunConfig) -> anyhow::Result<()> {
    let generator = CourseGenerator::new(&config.tenant_id);
    let mut rng = rand::thread_rng();
    let courses: Vec<Course> = (0..config.total_records)
        .map(|_| generator.generate(&mut rng))
        .collect();

    let (metrics, written) =
        write_in_batches(store, courses, config.batch_size, config.batch_delay()).await;

    tracing::info!(
        "Insert summary: {} inserted, {} failed across {} batches ({:.1} rows/sec)",
        metrics.inserted,
        metrics.failed,
        metrics.batch_count,
        metrics.rows_per_second()
    );

    if !written.is_empty() {
        // Export failures never affect already-committed store writes.
        match export::write_csv(&written, &config.output_dir) {
            Ok(path) => tracing::info!("Audit CSV written to {}", path.display()),
            Err(e) => tracing::error!("CSV export failed: {:#}", e),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_courses(n: usize) -> Vec<Course> {
        let generator = CourseGenerator::new("TENANT_A");
        let mut rng = StdRng::seed_from_u64(42);
        (0..n).map(|_| generator.generate(&mut rng)).collect()
    }

    #[tokio::test]
    async fn test_batch_count_is_ceil() {
        for (n, batch_size, expected) in [(0, 20, 0), (1, 20, 1), (20, 20, 1), (21, 20, 2), (47, 20, 3)] {
            let store = MemoryStore::new();
            let (metrics, _) =
                write_in_batches(&store, make_courses(n), batch_size, Duration::ZERO).await;
            assert_eq!(metrics.batch_count, expected, "n={n} batch_size={batch_size}");
            assert_eq!(store.put_batch_calls(), expected);
            assert_eq!(metrics.inserted, n as u64);
            assert_eq!(metrics.failed, 0);
        }
    }

    #[tokio::test]
    async fn test_continues_past_failed_batch() {
        let store = MemoryStore::new().fail_put_batch(2);
        let (metrics, written) =
            write_in_batches(&store, make_courses(47), 20, Duration::ZERO).await;

        assert_eq!(metrics.batch_count, 3);
        assert_eq!(metrics.inserted, 27);
        assert_eq!(metrics.failed, 20);
        assert_eq!(written.len(), 27);
        assert_eq!(store.put_batch_calls(), 3);
        assert_eq!(store.len_for("TENANT_A"), 27);
    }

    #[tokio::test]
    async fn test_inserted_never_exceeds_input() {
        let store = MemoryStore::new().fail_put_batch(1).fail_put_batch(3);
        let (metrics, written) =
            write_in_batches(&store, make_courses(50), 7, Duration::ZERO).await;

        assert_eq!(metrics.batch_count, 8);
        assert!(metrics.inserted <= 50);
        assert_eq!(metrics.inserted + metrics.failed, 50);
        assert_eq!(written.len() as u64, metrics.inserted);
    }

    #[test]
    fn test_rows_per_second() {
        let metrics = PopulateMetrics {
            inserted: 1000,
            failed: 0,
            batch_count: 50,
            duration: Duration::from_secs(10),
        };
        assert_eq!(metrics.rows_per_second(), 100.0);
        assert_eq!(PopulateMetrics::default().rows_per_second(), 0.0);
    }
}
