//! Store boundary for the partitioned course table.
//!
//! The pipeline only needs a handful of primitives from the store: bulk put,
//! bulk delete, paginated query-by-partition, and two counts. [`CourseStore`]
//! captures exactly those, so the populate/verify/cleanup logic can run
//! against the real DynamoDB table or the in-memory double in
//! [`crate::testing`].

use async_trait::async_trait;
use thiserror::Error;

use crate::course::{Course, CourseKey};

mod dynamodb;

pub use dynamodb::DynamoStore;

/// Store-imposed cap on bulk write/delete calls (DynamoDB BatchWriteItem).
pub const MAX_BATCH_ITEMS: usize = 25;

/// Errors surfaced by a [`CourseStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected or failed a request (network, throttling,
    /// validation). The caller decides whether that fails the run.
    #[error("store request failed: {0}")]
    Request(String),

    /// A bulk call completed but left items unprocessed. The whole batch is
    /// treated as failed; nothing is resubmitted.
    #[error("bulk call left {0} items unprocessed")]
    Unprocessed(usize),

    /// A stored item could not be decoded into a [`Course`].
    #[error("malformed item: {0}")]
    Malformed(String),
}

/// One page of a partition query.
#[derive(Debug, Clone, Default)]
pub struct QueryPage {
    pub items: Vec<Course>,
    /// Key to resume from; `None` means the partition is exhausted.
    pub last_key: Option<CourseKey>,
}

/// Primitives the pipeline needs from the partitioned key-value table.
#[async_trait]
pub trait CourseStore {
    /// Write a batch of records in one bulk call. All-or-nothing from the
    /// caller's perspective: any error fails the whole batch.
    async fn put_batch(&self, courses: &[Course]) -> Result<(), StoreError>;

    /// Delete a batch of records by key in one bulk call.
    async fn delete_batch(&self, keys: &[CourseKey]) -> Result<(), StoreError>;

    /// Fetch one page of a tenant partition in store iteration order,
    /// resuming from `start_key` if given.
    async fn query_page(
        &self,
        tenant_id: &str,
        limit: Option<u32>,
        start_key: Option<CourseKey>,
    ) -> Result<QueryPage, StoreError>;

    /// Count every record in the table, across all tenants.
    async fn count_all(&self) -> Result<u64, StoreError>;

    /// Count the records in one tenant partition.
    async fn count_for_tenant(&self, tenant_id: &str) -> Result<u64, StoreError>;
}
