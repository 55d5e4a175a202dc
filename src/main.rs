//! Command-line interface for course-seed
//!
//! # Usage Examples
//!
//! ```bash
//! # Populate the dev table with 1000 records for tenant UDEMY
//! course-seed populate \
//!   --region us-east-1 \
//!   --table dev_courses \
//!   --tenant-id UDEMY \
//!   --total-records 1000 \
//!   --batch-size 20
//!
//! # Verify counts and distributions
//! course-seed verify --table dev_courses --tenant-id UDEMY
//!
//! # Permanently delete the tenant partition (interactive)
//! course-seed cleanup --table dev_courses --tenant-id UDEMY
//! ```
//!
//! Logging goes through `tracing`; set `RUST_LOG` to control verbosity
//! (defaults to `info`).

use clap::{Parser, Subcommand};
use course_seed::cleanup::{self, CleanupOutcome};
use course_seed::config::RunConfig;
use course_seed::{populate, verify};

#[derive(Parser)]
#[command(name = "course-seed")]
#[command(about = "Populate, verify, and purge a multi-tenant DynamoDB course table")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic courses and bulk-insert them, then export an audit CSV
    Populate {
        #[command(flatten)]
        config: RunConfig,
    },
    /// Count records and report category/level distributions for a tenant
    Verify {
        #[command(flatten)]
        config: RunConfig,
    },
    /// Permanently delete every record for a tenant (prompts twice)
    Cleanup {
        #[command(flatten)]
        config: RunConfig,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Populate { config } => {
            config.validate()?;
            populate::run_populate(&config).await?;
        }
        Commands::Verify { config } => {
            verify::run_verify(&config).await?;
        }
        Commands::Cleanup { config } => {
            // A declined confirmation is a normal exit, not an error.
            let outcome = cleanup::run_cleanup(&config).await?;
            if let CleanupOutcome::Failed { deleted, error } = outcome {
                anyhow::bail!("cleanup stopped after {deleted} deletions: {error}");
            }
        }
    }

    Ok(())
}
