//! Status command implementation
//!
//! Looks up one report by id, or lists reports in a given status.

use crate::adapters::database::create_database_client;
use crate::config::load_config;
use crate::core::repository::{ReportStore, SqlReportRepository};
use crate::domain::{Report, ReportId, ReportStatus};
use clap::Args;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show a single report
    #[arg(long, conflicts_with = "status")]
    pub report_id: Option<String>,

    /// List reports in this status (pending, processing, queued, completed, failed)
    #[arg(long, default_value = "pending")]
    pub status: String,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking report status");

        println!("📊 Report Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let report_id = match self.report_id.as_deref().map(ReportId::new).transpose() {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid report id: {e}");
                return Ok(2);
            }
        };
        let status: ReportStatus = match self.status.parse() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let db = match create_database_client(&config.database) {
            Ok(db) => db,
            Err(e) => {
                println!("❌ Failed to create database client");
                println!("   Error: {e}");
                return Ok(2);
            }
        };
        if let Err(e) = db.connect().await {
            println!("❌ Failed to connect to database");
            println!("   Error: {e}");
            return Ok(4);
        }

        let repository = SqlReportRepository::new(Arc::clone(&db));
        let result = match &report_id {
            Some(id) => repository.find_by_id(id).await.map(|r| r.into_iter().collect()),
            None => repository.find_by_status(status).await,
        };

        if let Err(e) = db.close().await {
            tracing::warn!(error = %e, "Failed to close database connection");
        }

        let reports: Vec<Report> = match result {
            Ok(r) => r,
            Err(e) => {
                println!("❌ Failed to load reports");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if reports.is_empty() {
            match &report_id {
                Some(id) => println!("No report found with id {id}."),
                None => println!("No reports in status '{status}'."),
            }
            return Ok(0);
        }

        println!("Found {} report(s):", reports.len());
        println!();
        print_table(&reports);
        println!();
        Ok(0)
    }
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pending => "⏸️  Pending",
        ReportStatus::Processing => "🔄 Processing",
        ReportStatus::Queued => "📬 Queued",
        ReportStatus::Completed => "✅ Completed",
        ReportStatus::Failed => "❌ Failed",
    }
}

fn print_table(reports: &[Report]) {
    println!(
        "{:<38} {:<15} {:<21} {:<21} {:<40}",
        "Report ID", "Status", "Created", "Updated", "Detail"
    );
    println!("{}", "-".repeat(135));

    for report in reports {
        let detail = report
            .error
            .as_deref()
            .or(report.export_location.as_deref())
            .unwrap_or("");
        println!(
            "{:<38} {:<15} {:<21} {:<21} {:<40}",
            report.report_id.as_str(),
            status_label(report.status),
            report.created_at.format("%Y-%m-%d %H:%M:%S"),
            report.updated_at.format("%Y-%m-%d %H:%M:%S"),
            detail
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_args_defaults() {
        let args = StatusArgs {
            report_id: None,
            status: "pending".to_string(),
        };
        assert!(args.report_id.is_none());
        assert_eq!(args.status.parse::<ReportStatus>(), Ok(ReportStatus::Pending));
    }

    #[test]
    fn test_every_status_has_a_label() {
        for status in ReportStatus::ALL {
            assert!(!status_label(status).is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let args = StatusArgs {
            report_id: None,
            status: "failed".to_string(),
        };
        assert_eq!(args.execute("/nonexistent/report-pipeline.toml").await.unwrap(), 2);
    }
}
