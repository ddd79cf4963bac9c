//! In-process report store

use super::ReportStore;
use crate::domain::{
    PipelineError, Report, ReportId, ReportStatus, Result, StatusUpdateDetails,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// [`ReportStore`] keeping reports in a map; used by `run-local` and tests
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: Mutex<HashMap<String, Report>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Report>> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create(&self, report: &Report) -> Result<Report> {
        let mut reports = self.lock();
        let id = report.report_id.to_string();
        if reports.contains_key(&id) {
            return Err(PipelineError::Conflict(id));
        }

        let stored = Report {
            status: ReportStatus::Pending,
            export_location: None,
            error: None,
            ..report.clone()
        };
        reports.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_status(
        &self,
        report_id: &ReportId,
        status: ReportStatus,
        details: StatusUpdateDetails,
    ) -> Result<Report> {
        let mut reports = self.lock();
        let report = reports
            .get_mut(report_id.as_str())
            .ok_or_else(|| PipelineError::NotFound(report_id.to_string()))?;

        report.status = status;
        report.updated_at = Utc::now();
        report.export_location = details.export_location;
        report.error = details.error;
        Ok(report.clone())
    }

    async fn find_by_id(&self, report_id: &ReportId) -> Result<Option<Report>> {
        Ok(self.lock().get(report_id.as_str()).cloned())
    }

    async fn find_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let mut found: Vec<Report> = self
            .lock()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReportRequest;
    use chrono::{Duration, NaiveDate};

    fn report(id: &str) -> Report {
        let request = ReportRequest {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            dealer_ids: None,
            template_id: None,
        };
        Report::new_pending(ReportId::new(id).unwrap(), request, Utc::now())
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryReportStore::new();
        store.create(&report("a")).await.unwrap();
        let found = store.find_by_id(&ReportId::new("a").unwrap()).await.unwrap();
        assert_eq!(found.unwrap().status, ReportStatus::Pending);
        assert!(store
            .find_by_id(&ReportId::new("b").unwrap())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_create_forces_pending() {
        let store = MemoryReportStore::new();
        let mut r = report("a");
        r.status = ReportStatus::Completed;
        r.error = Some("stale".to_string());
        let stored = store.create(&r).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Pending);
        assert!(stored.error.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let store = MemoryReportStore::new();
        store.create(&report("a")).await.unwrap();
        assert!(matches!(
            store.create(&report("a")).await,
            Err(PipelineError::Conflict(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_timestamp_and_details() {
        let store = MemoryReportStore::new();
        let created = store.create(&report("a")).await.unwrap();
        let updated = store
            .update_status(
                &created.report_id,
                ReportStatus::Failed,
                StatusUpdateDetails::with_error("boom"),
            )
            .await
            .unwrap();
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryReportStore::new();
        let err = store
            .update_status(
                &ReportId::new("nope").unwrap(),
                ReportStatus::Processing,
                StatusUpdateDetails::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_status_newest_first() {
        let store = MemoryReportStore::new();
        let mut old = report("old");
        old.created_at -= Duration::hours(1);
        store.create(&old).await.unwrap();
        store.create(&report("new")).await.unwrap();

        let pending = store.find_by_status(ReportStatus::Pending).await.unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.report_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }
}
