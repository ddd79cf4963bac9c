//! `reports` table over any [`DatabaseClient`]
//!
//! The SQL is portable between PostgreSQL and SQL Server: writes are plain
//! `INSERT`/`UPDATE` followed by a `SELECT` of the same row.

use super::models::{ReportRow, REPORT_COLUMNS};
use super::ReportStore;
use crate::adapters::database::{DatabaseClient, SqlParam};
use crate::domain::{
    PipelineError, Report, ReportId, ReportStatus, Result, StatusUpdateDetails,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// [`ReportStore`] backed by a relational database
pub struct SqlReportRepository {
    db: Arc<dyn DatabaseClient>,
}

impl SqlReportRepository {
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// The underlying database client
    pub fn client(&self) -> &Arc<dyn DatabaseClient> {
        &self.db
    }

    async fn select_one(&self, report_id: &ReportId) -> Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE report_id = $1");
        let rows = self
            .db
            .query(&sql, &[SqlParam::from(report_id.as_str())])
            .await?;

        rows.first()
            .map(|row| ReportRow::from_row(row)?.to_domain())
            .transpose()
    }
}

#[async_trait]
impl ReportStore for SqlReportRepository {
    async fn create(&self, report: &Report) -> Result<Report> {
        let row = ReportRow::from_domain(report)?;

        tracing::debug!(report_id = %report.report_id, "Inserting report");

        let sql = "INSERT INTO reports (report_id, status, created_at, updated_at, request_data) \
                   VALUES ($1, $2, $3, $4, $5)";
        self.db
            .execute(
                sql,
                &[
                    SqlParam::from(row.report_id),
                    SqlParam::from(ReportStatus::Pending.as_str()),
                    SqlParam::from(row.created_at),
                    SqlParam::from(row.updated_at),
                    SqlParam::from(row.request_data),
                ],
            )
            .await
            .map_err(|e| match e {
                PipelineError::Conflict(_) => PipelineError::Conflict(report.report_id.to_string()),
                other => other,
            })?;

        self.select_one(&report.report_id).await?.ok_or_else(|| {
            PipelineError::Database(format!(
                "Report {} missing immediately after insert",
                report.report_id
            ))
        })
    }

    async fn update_status(
        &self,
        report_id: &ReportId,
        status: ReportStatus,
        details: StatusUpdateDetails,
    ) -> Result<Report> {
        let sql = "UPDATE reports SET status = $1, updated_at = $2, export_location = $3, error = $4 \
                   WHERE report_id = $5";
        let affected = self
            .db
            .execute(
                sql,
                &[
                    SqlParam::from(status.as_str()),
                    SqlParam::from(Utc::now()),
                    SqlParam::from(details.export_location),
                    SqlParam::from(details.error),
                    SqlParam::from(report_id.as_str()),
                ],
            )
            .await?;

        if affected == 0 {
            return Err(PipelineError::NotFound(report_id.to_string()));
        }

        self.select_one(report_id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(report_id.to_string()))
    }

    async fn find_by_id(&self, report_id: &ReportId) -> Result<Option<Report>> {
        self.select_one(report_id).await
    }

    async fn find_by_status(&self, status: ReportStatus) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE status = $1 ORDER BY created_at DESC"
        );
        let rows = self
            .db
            .query(&sql, &[SqlParam::from(status.as_str())])
            .await?;

        rows.iter()
            .map(|row| ReportRow::from_row(row)?.to_domain())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::Row;
    use crate::config::DatabaseKind;
    use crate::domain::ReportRequest;
    use chrono::NaiveDate;
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Minimal SQL interpreter for the statements the repository issues
    #[derive(Default)]
    struct FakeDb {
        rows: Mutex<BTreeMap<String, Row>>,
        statements: Mutex<Vec<String>>,
    }

    fn text(param: &SqlParam) -> Value {
        match param {
            SqlParam::Text(s) => Value::from(s.clone()),
            SqlParam::NullableText(s) => s.clone().map(Value::from).unwrap_or(Value::Null),
            SqlParam::Timestamp(ts) => Value::from(ts.to_rfc3339()),
            SqlParam::Date(d) => Value::from(d.to_string()),
        }
    }

    fn key(param: &SqlParam) -> String {
        text(param).as_str().unwrap_or_default().to_string()
    }

    #[async_trait]
    impl DatabaseClient for FakeDb {
        fn kind(&self) -> DatabaseKind {
            DatabaseKind::Postgres
        }

        async fn connect(&self) -> Result<()> {
            Ok(())
        }

        async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
            self.statements.lock().unwrap().push(sql.to_string());
            let rows = self.rows.lock().unwrap();
            if sql.contains("WHERE report_id = $1") {
                return Ok(rows.get(&key(&params[0])).cloned().into_iter().collect());
            }
            let status = text(&params[0]);
            Ok(rows
                .values()
                .filter(|r| r["status"] == status)
                .cloned()
                .collect())
        }

        async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
            self.statements.lock().unwrap().push(sql.to_string());
            let mut rows = self.rows.lock().unwrap();
            if sql.starts_with("INSERT") {
                let id = key(&params[0]);
                if rows.contains_key(&id) {
                    return Err(PipelineError::Conflict("duplicate key".to_string()));
                }
                let mut row = Row::new();
                row.insert("report_id".into(), text(&params[0]));
                row.insert("status".into(), text(&params[1]));
                row.insert("created_at".into(), text(&params[2]));
                row.insert("updated_at".into(), text(&params[3]));
                row.insert("request_data".into(), text(&params[4]));
                row.insert("export_location".into(), Value::Null);
                row.insert("error".into(), Value::Null);
                rows.insert(id, row);
                return Ok(1);
            }
            match rows.get_mut(&key(&params[4])) {
                Some(row) => {
                    row.insert("status".into(), text(&params[0]));
                    row.insert("updated_at".into(), text(&params[1]));
                    row.insert("export_location".into(), text(&params[2]));
                    row.insert("error".into(), text(&params[3]));
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn execute_batch(&self, _sql: &str) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    fn report(id: &str) -> Report {
        let request = ReportRequest {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            dealer_ids: Some(vec!["dealer123".to_string()]),
            template_id: None,
        };
        Report::new_pending(ReportId::new(id).unwrap(), request, Utc::now())
    }

    #[tokio::test]
    async fn test_create_returns_stored_row() {
        let repo = SqlReportRepository::new(Arc::new(FakeDb::default()));
        let created = repo.create(&report("r-1")).await.unwrap();
        assert_eq!(created.status, ReportStatus::Pending);
        assert_eq!(created.request.dealer_ids, Some(vec!["dealer123".to_string()]));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let repo = SqlReportRepository::new(Arc::new(FakeDb::default()));
        repo.create(&report("r-1")).await.unwrap();
        let err = repo.create(&report("r-1")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Conflict(id) if id == "r-1"));
    }

    #[tokio::test]
    async fn test_update_unknown_report_is_not_found() {
        let repo = SqlReportRepository::new(Arc::new(FakeDb::default()));
        let err = repo
            .update_status(
                &ReportId::new("missing").unwrap(),
                ReportStatus::Processing,
                StatusUpdateDetails::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_writes_details() {
        let repo = SqlReportRepository::new(Arc::new(FakeDb::default()));
        let id = repo.create(&report("r-1")).await.unwrap().report_id;

        let updated = repo
            .update_status(
                &id,
                ReportStatus::Queued,
                StatusUpdateDetails::with_export_location("data/exports/r-1/data.json"),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, ReportStatus::Queued);
        assert_eq!(
            updated.export_location.as_deref(),
            Some("data/exports/r-1/data.json")
        );

        let failed = repo
            .update_status(&id, ReportStatus::Failed, StatusUpdateDetails::with_error("boom"))
            .await
            .unwrap();
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.export_location.is_none());
    }

    #[tokio::test]
    async fn test_find_by_status_orders_newest_first() {
        let db = Arc::new(FakeDb::default());
        let repo = SqlReportRepository::new(db.clone());
        let mut older = report("older");
        older.created_at -= chrono::Duration::minutes(5);
        repo.create(&older).await.unwrap();
        repo.create(&report("newer")).await.unwrap();

        let found = repo.find_by_status(ReportStatus::Pending).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(db
            .statements
            .lock()
            .unwrap()
            .iter()
            .any(|s| s.contains("ORDER BY created_at DESC")));
        assert!(repo
            .find_by_status(ReportStatus::Failed)
            .await
            .unwrap()
            .is_empty());
    }
}
