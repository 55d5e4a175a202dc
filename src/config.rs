//! Run configuration.
//!
//! Built once at startup from CLI flags (with env fallbacks) and passed by
//! reference to each component. No ambient or static configuration exists.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

/// Static configuration shared by the populate, verify, and cleanup commands.
#[derive(Args, Clone, Debug)]
pub struct RunConfig {
    /// AWS region hosting the table
    #[arg(long, default_value = "us-east-1", env = "COURSE_SEED_REGION")]
    pub region: String,

    /// DynamoDB table name (e.g. dev_courses, prod_courses)
    #[arg(long, default_value = "dev_courses", env = "COURSE_SEED_TABLE")]
    pub table: String,

    /// Tenant whose partition is populated, verified, or purged
    #[arg(long, default_value = "UDEMY", env = "COURSE_SEED_TENANT")]
    pub tenant_id: String,

    /// Total number of records to generate
    #[arg(long, default_value = "1000")]
    pub total_records: usize,

    /// Records per bulk-write call
    #[arg(long, default_value = "20")]
    pub batch_size: usize,

    /// Pause between batches in milliseconds, to stay under provisioned
    /// throughput (flow control only, not a correctness mechanism)
    #[arg(long, default_value = "100")]
    pub batch_delay_ms: u64,

    /// Directory for the CSV audit export
    #[arg(long, default_value = "./output")]
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    /// Reject values that make the batching loop meaningless.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.batch_size == 0 {
            anyhow::bail!("batch size must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: RunConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(cli.config.region, "us-east-1");
        assert_eq!(cli.config.table, "dev_courses");
        assert_eq!(cli.config.tenant_id, "UDEMY");
        assert_eq!(cli.config.total_records, 1000);
        assert_eq!(cli.config.batch_size, 20);
        assert_eq!(cli.config.batch_delay(), Duration::from_millis(100));
        assert!(cli.config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::parse_from([
            "test",
            "--table",
            "prod_courses",
            "--tenant-id",
            "ACME",
            "--batch-size",
            "25",
        ]);
        assert_eq!(cli.config.table, "prod_courses");
        assert_eq!(cli.config.tenant_id, "ACME");
        assert_eq!(cli.config.batch_size, 25);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cli = TestCli::parse_from(["test", "--batch-size", "0"]);
        assert!(cli.config.validate().is_err());
    }
}
