//! Cleanup command: permanently delete every record in a tenant partition.
//!
//! Destruction sits behind two interactive confirmations. The first confirms
//! intent before anything is read; the second must match a fixed token after
//! the exact record count has been shown. Any other input aborts with zero
//! mutation and a normal exit. Once deleting, a failed batch stops the run;
//! already-deleted records are not restored.
//!
//! State machine:
//! `AwaitingIntentConfirmation -> (abort | Scanning) ->
//!  AwaitingCountConfirmation -> (abort | Deleting) -> Done | Failed`

use std::io::{self, Write};

use anyhow::Context;

use crate::config::RunConfig;
use crate::store::{CourseStore, DynamoStore, MAX_BATCH_ITEMS};
use crate::verify::Verifier;

/// First prompt: the operator must type this to let the scan proceed.
pub const INTENT_TOKEN: &str = "DELETE";

/// Second prompt: must match exactly after the record count is displayed.
/// The prompt renders this same constant, so what the operator is told to
/// type is always what the comparison expects.
pub const COUNT_TOKEN: &str = "YES";

/// Keys per bulk-delete call, matching the store's batch cap.
pub const DELETE_BATCH_SIZE: usize = MAX_BATCH_ITEMS;

/// Source of operator confirmation input, injectable for tests.
pub trait ConfirmationInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads confirmations from the process terminal.
pub struct StdinConfirmation;

impl ConfirmationInput for StdinConfirmation {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        print!("{prompt}");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line)
    }
}

/// Remove the trailing line terminator, and nothing else. The tokens must
/// match the typed line exactly; even stray whitespace aborts.
fn strip_line_ending(answer: &str) -> &str {
    answer.trim_end_matches(['\r', '\n'])
}

/// Terminal state of a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The operator declined a confirmation. Nothing was mutated.
    Aborted,
    /// The partition was already empty; no second prompt, no deletes.
    Empty,
    /// Every record was deleted.
    Done { deleted: u64 },
    /// A delete batch failed; the remaining batches were skipped and
    /// already-deleted records stay deleted.
    Failed { deleted: u64, error: String },
}

/// Run the cleanup command against the configured DynamoDB table.
pub async fn run_cleanup(config: &RunConfig) -> anyhow::Result<CleanupOutcome> {
    let store = DynamoStore::connect(&config.region, &config.table)
        .await
        .context("failed to reach the course table")?;
    run_cleanup_with(&store, config, &mut StdinConfirmation).await
}

/// Cleanup against any store implementation, driven by any input source.
pub async fn run_cleanup_with<S: CourseStore + ?Sized>(
    store: &S,
    config: &RunConfig,
    input: &mut dyn ConfirmationInput,
) -> anyhow::Result<CleanupOutcome> {
    println!("WARNING: this permanently deletes every record for the tenant.");
    println!("  Tenant: {}", config.tenant_id);
    println!("  Table:  {}", config.table);
    println!("  Region: {}", config.region);

    let answer = input.read_line(&format!("Type '{INTENT_TOKEN}' to continue: "))?;
    if strip_line_ending(&answer) != INTENT_TOKEN {
        tracing::info!("Cleanup aborted before scanning; nothing was deleted");
        return Ok(CleanupOutcome::Aborted);
    }

    tracing::info!("Scanning tenant '{}' for records to delete", config.tenant_id);
    let keys = Verifier::new(store).scan_keys(&config.tenant_id).await?;
    if keys.is_empty() {
        tracing::info!("No records found for tenant '{}'", config.tenant_id);
        return Ok(CleanupOutcome::Empty);
    }

    let total = keys.len() as u64;
    println!("Found {total} records to delete.");
    let answer = input.read_line(&format!(
        "Type '{COUNT_TOKEN}' to confirm deleting {total} records: "
    ))?;
    if strip_line_ending(&answer) != COUNT_TOKEN {
        tracing::info!("Cleanup aborted at count confirmation; nothing was deleted");
        return Ok(CleanupOutcome::Aborted);
    }

    let mut deleted = 0u64;
    for batch in keys.chunks(DELETE_BATCH_SIZE) {
        match store.delete_batch(batch).await {
            Ok(()) => {
                deleted += batch.len() as u64;
                tracing::info!("Deleted {}/{} records", deleted, total);
            }
            Err(e) => {
                tracing::error!(
                    "Delete batch failed after {} of {} deletions, stopping: {}",
                    deleted,
                    total,
                    e
                );
                return Ok(CleanupOutcome::Failed {
                    deleted,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!("Cleanup complete: {} records deleted", deleted);
    Ok(CleanupOutcome::Done { deleted })
}
