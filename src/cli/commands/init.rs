//! Init command implementation
//!
//! Writes a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "report-pipeline.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing report pipeline configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export DB_PASSWORD (referenced as ${{DB_PASSWORD}})");
                println!("  3. Create the reports table: report-pipeline schema --apply");
                println!("  4. Validate configuration: report-pipeline validate-config");
                println!("  5. Try the pipeline offline: report-pipeline run-local --start-date 2023-01-01 --end-date 2023-01-31");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Report Pipeline Configuration File

[application]
log_level = "info"

[database]
kind = "postgres"  # postgres | mssql
host = "localhost"
name = "reports"
user = "etl"
password = "${DB_PASSWORD}"

[data_lake]
kind = "mock"  # mock | real

[storage]
bucket = "dealer-report-data"

[queue]
export_queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/report-export"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Report Pipeline Configuration File
#
# Every value can be overridden from the environment. The deployed functions
# use DB_TYPE, DB_HOST, DB_PORT, DB_NAME, DB_USER, DB_PASSWORD,
# DATA_LAKE_TYPE, DATA_BUCKET, EXPORT_QUEUE_URL and LOG_LEVEL; other keys use
# REPORT_PIPELINE_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Database
# ============================================================================
[database]
# Backend holding the reports table and the dealer source tables
kind = "postgres"  # postgres | mssql

host = "localhost"

# Defaults to 5432 for postgres and 1433 for mssql
# port = 5432

name = "reports"
user = "etl"

# Never commit the password; reference an environment variable instead
password = "${DB_PASSWORD}"

# Pool size; a single invocation only needs one connection
max_connections = 1

connection_timeout_seconds = 10
statement_timeout_seconds = 30

# MSSQL only: accept the server certificate without validation
trust_server_certificate = true

# ============================================================================
# Data Lake
# ============================================================================
[data_lake]
# mock filters a bundled dealer dataset; real is not available yet
kind = "mock"

# ============================================================================
# Object Storage
# ============================================================================
[storage]
# Bucket receiving export snapshots and CSV artifacts
bucket = "dealer-report-data"

# Snapshots land at {export_prefix}/{report_id}/data.json
export_prefix = "exports"

# ============================================================================
# Queue
# ============================================================================
[queue]
# Queue feeding the CSV stage
export_queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/report-export"

# ============================================================================
# CSV Artifacts
# ============================================================================
[csv]
# Append a random hex suffix so artifacts from the same second never collide
random_suffix = true

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON console output (enabled automatically inside Lambda)
json = false

local_enabled = false
local_path = "/var/log/report-pipeline"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}
