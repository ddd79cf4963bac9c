//! CLI interface and argument parsing
//!
//! The `report-pipeline` binary is the operator tool: it validates and
//! generates configuration, manages the `reports` schema, inspects report
//! status and runs the whole pipeline locally against in-memory adapters.

pub mod commands;

use clap::{Parser, Subcommand};

/// Report Pipeline - dealer report ETL
#[derive(Parser, Debug)]
#[command(name = "report-pipeline")]
#[command(version, about, long_about = None)]
#[command(author = "Report Pipeline Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "report-pipeline.toml",
        env = "REPORT_PIPELINE_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "REPORT_PIPELINE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show report status
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// Print or apply the reports table schema
    Schema(commands::schema::SchemaArgs),

    /// Run create, process and CSV stages in-process with the mock data lake
    RunLocal(commands::run_local::RunLocalArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["report-pipeline", "validate-config"]);
        assert_eq!(cli.config, "report-pipeline.toml");
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["report-pipeline", "--config", "custom.toml", "status"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["report-pipeline", "--log-level", "debug", "status"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_status_by_id() {
        let cli = Cli::parse_from(["report-pipeline", "status", "--report-id", "r-1"]);
        match cli.command {
            Commands::Status(args) => assert_eq!(args.report_id.as_deref(), Some("r-1")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["report-pipeline", "init", "--force"]);
        match cli.command {
            Commands::Init(args) => assert!(args.force),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_schema() {
        let cli = Cli::parse_from(["report-pipeline", "schema", "--kind", "mssql"]);
        assert!(matches!(cli.command, Commands::Schema(_)));
    }

    #[test]
    fn test_cli_parse_run_local() {
        let cli = Cli::parse_from([
            "report-pipeline",
            "run-local",
            "--start-date",
            "2023-01-01",
            "--end-date",
            "2023-01-31",
            "--dealer-id",
            "dealer123",
        ]);
        match cli.command {
            Commands::RunLocal(args) => assert_eq!(args.dealer_ids, vec!["dealer123"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
