//! Validate config command implementation

use crate::config::{load_config, PipelineConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates after applying environment overrides
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        print_summary(&config);
        println!();
        Ok(0)
    }
}

fn print_summary(config: &PipelineConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Database: {}", config.database.kind);
    println!(
        "  Database Target: {}:{}/{}",
        config.database.host,
        config.database.effective_port(),
        config.database.name
    );
    println!("  Database User: {}", config.database.user);
    println!(
        "  Database Password: {}",
        if config.database.password.is_some() {
            "set"
        } else {
            "not set"
        }
    );
    println!("  Data Lake: {}", config.data_lake.kind);
    println!("  Bucket: {}", config.storage.bucket);
    println!("  Export Prefix: {}", config.storage.export_prefix);
    println!("  Export Queue: {}", config.queue.export_queue_url);
    println!("  CSV Random Suffix: {}", config.csv.random_suffix);
}
