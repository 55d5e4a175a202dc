//! Verify command: counts, samples, and grouped distributions for a tenant.
//!
//! The aggregation walks the entire tenant partition, paginating past the
//! store's per-call page limit, so the returned counts reflect every record
//! in the partition rather than just the first page.

use std::collections::BTreeMap;

use anyhow::Context;

use crate::config::RunConfig;
use crate::course::{Course, CourseKey};
use crate::store::{CourseStore, DynamoStore, StoreError};

/// Bucket for records missing an optional `categories` or `level` field.
pub const UNSPECIFIED_BUCKET: &str = "unspecified";

/// Grouped distributions over one tenant partition. Each map's counts sum to
/// the partition's record count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Count per coarse category label.
    pub by_category: BTreeMap<String, u64>,
    /// Count per difficulty level label.
    pub by_level: BTreeMap<String, u64>,
}

impl AggregateReport {
    pub fn category_total(&self) -> u64 {
        self.by_category.values().sum()
    }

    pub fn level_total(&self) -> u64 {
        self.by_level.values().sum()
    }
}

/// Read-side view over a [`CourseStore`].
pub struct Verifier<'a, S: CourseStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CourseStore + ?Sized> Verifier<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Full-table record count, across all tenants.
    pub async fn count_all(&self) -> Result<u64, StoreError> {
        self.store.count_all().await
    }

    /// Record count for one tenant partition.
    pub async fn count_for_tenant(&self, tenant_id: &str) -> Result<u64, StoreError> {
        self.store.count_for_tenant(tenant_id).await
    }

    /// First `limit` records of the partition in store iteration order.
    /// No ordering guarantee beyond that.
    pub async fn sample(&self, tenant_id: &str, limit: u32) -> Result<Vec<Course>, StoreError> {
        let mut out: Vec<Course> = Vec::new();
        let mut start_key = None;
        while (out.len() as u32) < limit {
            let remaining = limit - out.len() as u32;
            let page = self
                .store
                .query_page(tenant_id, Some(remaining), start_key)
                .await?;
            let exhausted = page.last_key.is_none();
            out.extend(page.items);
            if exhausted {
                break;
            }
            start_key = page.last_key;
        }
        out.truncate(limit as usize);
        Ok(out)
    }

    /// Distributions by coarse category and by level over the whole
    /// partition. Records missing an optional field land in the
    /// [`UNSPECIFIED_BUCKET`] rather than being dropped.
    pub async fn aggregate(&self, tenant_id: &str) -> Result<AggregateReport, StoreError> {
        let mut report = AggregateReport::default();
        self.walk(tenant_id, |course| {
            let category = course
                .categories
                .as_ref()
                .map(|pair| pair.coarse.clone())
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| UNSPECIFIED_BUCKET.to_string());
            *report.by_category.entry(category).or_insert(0) += 1;

            let level = course
                .level
                .map(|l| l.to_string())
                .unwrap_or_else(|| UNSPECIFIED_BUCKET.to_string());
            *report.by_level.entry(level).or_insert(0) += 1;
        })
        .await?;
        Ok(report)
    }

    /// Every key in the partition, in store iteration order. The cleanup
    /// path uses this to size its delete run.
    pub async fn scan_keys(&self, tenant_id: &str) -> Result<Vec<CourseKey>, StoreError> {
        let mut keys = Vec::new();
        self.walk(tenant_id, |course| keys.push(course.key())).await?;
        Ok(keys)
    }

    /// Apply `visit` to every record in the partition, following page keys
    /// until the store reports exhaustion.
    async fn walk<F>(&self, tenant_id: &str, mut visit: F) -> Result<(), StoreError>
    where
        F: FnMut(&Course),
    {
        let mut start_key = None;
        loop {
            let page = self.store.query_page(tenant_id, None, start_key).await?;
            for course in &page.items {
                visit(course);
            }
            match page.last_key {
                Some(key) => start_key = Some(key),
                None => return Ok(()),
            }
        }
    }
}

/// Run the verify command against the configured DynamoDB table.
pub async fn run_verify(config: &RunConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Verifying records in table '{}' for tenant '{}'",
        config.table,
        config.tenant_id
    );
    let store = DynamoStore::connect(&config.region, &config.table)
        .await
        .context("failed to reach the course table")?;
    run_verify_with(&store, config).await
}

/// Verify against any store implementation.
pub async fn run_verify_with<S: CourseStore>(store: &S, config: &RunConfig) -> anyhow::Result<()> {
    let verifier = Verifier::new(store);

    let total = verifier.count_all().await?;
    tracing::info!("Total records in table: {}", total);

    let tenant_total = verifier.count_for_tenant(&config.tenant_id).await?;
    tracing::info!(
        "Records for tenant '{}': {}",
        config.tenant_id,
        tenant_total
    );

    let sample = verifier.sample(&config.tenant_id, 3).await?;
    for (i, course) in sample.iter().enumerate() {
        let original = course
            .original_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let level = course.level.map(|l| l.as_str()).unwrap_or(UNSPECIFIED_BUCKET);
        let categories = course
            .categories
            .as_ref()
            .map(|pair| pair.to_json_literal())
            .unwrap_or_else(|| "[]".to_string());
        tracing::info!(
            "Sample {}: '{}' by {}, ${} (list ${}), rating {}/5.0, level {}, categories {}, {}",
            i + 1,
            course.name,
            course.instructor,
            course.price,
            original,
            course.rating,
            level,
            categories,
            course.duration
        );
    }

    let report = verifier.aggregate(&config.tenant_id).await?;
    tracing::info!("Distribution by category:");
    for (category, count) in &report.by_category {
        tracing::info!("  {}: {} courses", category, count);
    }
    tracing::info!("Distribution by level:");
    for (level, count) in &report.by_level {
        tracing::info!("  {}: {} courses", level, count);
    }

    if tenant_total >= config.total_records as u64 {
        tracing::info!(
            "Record target met: {} records present (target {})",
            tenant_total,
            config.total_records
        );
    } else {
        tracing::warn!(
            "Only {} records present for tenant '{}' (target {})",
            tenant_total,
            config.tenant_id,
            config.total_records
        );
    }

    Ok(())
}
