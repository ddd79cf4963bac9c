//! Report persistence
//!
//! [`ReportStore`] is the sole writer of record for the `reports` table.
//! It does not enforce the forward-only status rule; that is
//! [`crate::core::lifecycle::ReportLifecycle`]'s job.
//!
//! Updates carry no optimistic-concurrency guard: two concurrent writes to
//! the same report race and the last one wins.

pub mod memory;
pub mod models;
pub mod sql;

pub use memory::MemoryReportStore;
pub use models::ReportRow;
pub use sql::SqlReportRepository;

use crate::domain::{Report, ReportId, ReportStatus, Result, StatusUpdateDetails};
use async_trait::async_trait;

/// Report persistence contract
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a new report with status `pending`
    ///
    /// # Returns
    ///
    /// The stored row as read back after the insert.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PipelineError::Conflict`] if the id already
    /// exists.
    async fn create(&self, report: &Report) -> Result<Report>;

    /// Set the status, refresh `updated_at` and write both detail columns
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PipelineError::NotFound`] if no row matches.
    async fn update_status(
        &self,
        report_id: &ReportId,
        status: ReportStatus,
        details: StatusUpdateDetails,
    ) -> Result<Report>;

    /// Look up a report by id
    async fn find_by_id(&self, report_id: &ReportId) -> Result<Option<Report>>;

    /// All reports with `status`, most recently created first
    async fn find_by_status(&self, status: ReportStatus) -> Result<Vec<Report>>;
}
