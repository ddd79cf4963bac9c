//! Logging and observability
//!
//! ```no_run
//! use report_pipeline::config::LoggingConfig;
//! use report_pipeline::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(report_id = "r-1", "Report created");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a report status transition
///
/// ```no_run
/// use report_pipeline::log_transition;
/// use report_pipeline::domain::{ReportId, ReportStatus};
///
/// let id = ReportId::new("r-1").unwrap();
/// log_transition!(&id, ReportStatus::Pending, ReportStatus::Processing);
/// ```
#[macro_export]
macro_rules! log_transition {
    ($report_id:expr, $from:expr, $to:expr) => {
        tracing::info!(
            report_id = %$report_id,
            from = %$from,
            to = %$to,
            "Report status updated"
        );
    };
}

/// Log a stage failure with the stage name and error
#[macro_export]
macro_rules! log_stage_failure {
    ($stage:expr, $report_id:expr, $error:expr) => {
        tracing::error!(
            stage = $stage,
            report_id = %$report_id,
            error = %$error,
            upstream = $error.is_upstream(),
            "Stage failed"
        );
    };
}
