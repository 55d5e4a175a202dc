//! course-seed library
//!
//! A data-lifecycle utility for a multi-tenant, partitioned DynamoDB course
//! table: generate synthetic records, bulk-insert them with flow control,
//! verify and aggregate the result, and destructively purge a tenant's
//! partition behind a two-phase confirmation.
//!
//! # Components
//!
//! - [`generate`] - synthetic course records with schema-valid random fields
//! - [`populate`] - batched bulk writes that continue past per-batch failures
//! - [`verify`] - paginated counts, samples, and category/level distributions
//! - [`cleanup`] - confirmation-gated tenant-wide batch deletion
//! - [`export`] - CSV audit file of successfully written records
//! - [`store`] - the store boundary trait and its DynamoDB implementation
//! - [`testing`] - in-memory store double for tests
//!
//! # CLI Usage
//!
//! ```bash
//! # Insert 1000 records for the default tenant
//! course-seed populate --table dev_courses --total-records 1000
//!
//! # Count and aggregate what landed
//! course-seed verify --table dev_courses
//!
//! # Purge the tenant partition (prompts twice before mutating)
//! course-seed cleanup --table dev_courses --tenant-id UDEMY
//! ```

pub mod cleanup;
pub mod config;
pub mod course;
pub mod export;
pub mod generate;
pub mod populate;
pub mod store;
pub mod testing;
pub mod verify;

pub use course::{CategoryPair, Course, CourseKey, Level};
pub use store::{CourseStore, DynamoStore, QueryPage, StoreError};
