//! Report lifecycle driver
//!
//! Every status write in the pipeline goes through [`ReportLifecycle`], which
//! reads the current status and refuses moves that
//! [`ReportStatus::can_transition_to`] rejects.
//!
//! The read and the write are separate statements with no lock between them,
//! so two invocations racing on one report can still interleave.

use crate::core::repository::ReportStore;
use crate::domain::{
    PipelineError, Report, ReportId, ReportRequest, ReportStatus, Result, StatusUpdateDetails,
};
use crate::log_transition;
use chrono::Utc;
use std::sync::Arc;

/// Status transitions for reports held in a [`ReportStore`]
#[derive(Clone)]
pub struct ReportLifecycle {
    store: Arc<dyn ReportStore>,
}

impl ReportLifecycle {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// The store used for reads
    pub fn store(&self) -> &Arc<dyn ReportStore> {
        &self.store
    }

    /// Insert a new pending report with a freshly generated id
    pub async fn create(&self, request: ReportRequest) -> Result<Report> {
        let report = Report::new_pending(ReportId::generate(), request, Utc::now());
        let stored = self.store.create(&report).await?;
        tracing::info!(report_id = %stored.report_id, status = %stored.status, "Report created");
        Ok(stored)
    }

    /// Fetch a report, failing with `NotFound` if it does not exist
    pub async fn get(&self, report_id: &ReportId) -> Result<Report> {
        self.store
            .find_by_id(report_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(report_id.to_string()))
    }

    /// `pending -> processing`
    pub async fn mark_processing(&self, report_id: &ReportId) -> Result<Report> {
        self.advance(report_id, ReportStatus::Processing, |_| {
            StatusUpdateDetails::default()
        })
        .await
    }

    /// `processing -> queued`, recording where the exported data lives
    pub async fn mark_queued(&self, report_id: &ReportId, export_location: &str) -> Result<Report> {
        self.advance(report_id, ReportStatus::Queued, |_| {
            StatusUpdateDetails::with_export_location(export_location)
        })
        .await
    }

    /// `queued -> completed`; the export location is kept
    pub async fn mark_completed(&self, report_id: &ReportId) -> Result<Report> {
        self.advance(report_id, ReportStatus::Completed, |current| {
            StatusUpdateDetails {
                export_location: current.export_location.clone(),
                error: None,
            }
        })
        .await
    }

    /// Move a non-terminal report to `failed` with `error`
    ///
    /// A report that is already terminal is left untouched and returned as is.
    pub async fn mark_failed(&self, report_id: &ReportId, error: &str) -> Result<Report> {
        let current = self.get(report_id).await?;
        if current.status.is_terminal() {
            tracing::warn!(
                report_id = %report_id,
                status = %current.status,
                error,
                "Report already terminal; failure not recorded"
            );
            return Ok(current);
        }

        let updated = self
            .store
            .update_status(
                report_id,
                ReportStatus::Failed,
                StatusUpdateDetails::with_error(error),
            )
            .await?;
        log_transition!(report_id, current.status, updated.status);
        Ok(updated)
    }

    /// Best-effort `mark_failed` for stage error paths
    ///
    /// A failure of the status write itself is logged and swallowed.
    pub async fn record_failure(&self, report_id: &ReportId, error: &PipelineError) {
        if let Err(write_err) = self.mark_failed(report_id, &error.to_string()).await {
            tracing::error!(
                report_id = %report_id,
                error = %error,
                write_error = %write_err,
                "Failed to record report failure"
            );
        }
    }

    async fn advance<F>(&self, report_id: &ReportId, next: ReportStatus, details: F) -> Result<Report>
    where
        F: FnOnce(&Report) -> StatusUpdateDetails + Send,
    {
        let current = self.get(report_id).await?;
        if !current.status.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                report_id: report_id.to_string(),
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        let updated = self
            .store
            .update_status(report_id, next, details(&current))
            .await?;
        log_transition!(report_id, current.status, updated.status);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repository::MemoryReportStore;
    use chrono::NaiveDate;

    fn lifecycle() -> ReportLifecycle {
        ReportLifecycle::new(Arc::new(MemoryReportStore::new()))
    }

    fn request() -> ReportRequest {
        ReportRequest {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            dealer_ids: None,
            template_id: None,
        }
    }

    #[tokio::test]
    async fn test_happy_path() {
        let lc = lifecycle();
        let id = lc.create(request()).await.unwrap().report_id;

        lc.mark_processing(&id).await.unwrap();
        let queued = lc.mark_queued(&id, "bucket/exports/x/data.json").await.unwrap();
        assert_eq!(queued.status, ReportStatus::Queued);

        let done = lc.mark_completed(&id).await.unwrap();
        assert_eq!(done.status, ReportStatus::Completed);
        assert_eq!(
            done.export_location.as_deref(),
            Some("bucket/exports/x/data.json")
        );
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn test_create_generates_unique_ids() {
        let lc = lifecycle();
        let a = lc.create(request()).await.unwrap();
        let b = lc.create(request()).await.unwrap();
        assert_ne!(a.report_id, b.report_id);
        assert_eq!(a.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_backwards_move_is_rejected() {
        let lc = lifecycle();
        let id = lc.create(request()).await.unwrap().report_id;
        lc.mark_processing(&id).await.unwrap();

        let err = lc.mark_processing(&id).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));

        let err = lc.mark_completed(&id).await.unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));
        assert_eq!(lc.get(&id).await.unwrap().status, ReportStatus::Processing);
    }

    #[tokio::test]
    async fn test_mark_failed_sets_error_and_clears_location() {
        let lc = lifecycle();
        let id = lc.create(request()).await.unwrap().report_id;
        lc.mark_processing(&id).await.unwrap();
        lc.mark_queued(&id, "b/k").await.unwrap();

        let failed = lc.mark_failed(&id, "csv write failed").await.unwrap();
        assert_eq!(failed.status, ReportStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("csv write failed"));
        assert!(failed.export_location.is_none());
    }

    #[tokio::test]
    async fn test_mark_failed_on_terminal_is_noop() {
        let lc = lifecycle();
        let id = lc.create(request()).await.unwrap().report_id;
        lc.mark_failed(&id, "first").await.unwrap();

        let again = lc.mark_failed(&id, "second").await.unwrap();
        assert_eq!(again.error.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_unknown_report_is_not_found() {
        let lc = lifecycle();
        let id = ReportId::new("missing").unwrap();
        assert!(matches!(
            lc.mark_processing(&id).await,
            Err(PipelineError::NotFound(_))
        ));

        // swallowed, only logged
        lc.record_failure(&id, &PipelineError::Other("x".to_string()))
            .await;
    }
}
