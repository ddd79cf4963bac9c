//! Row model for the `reports` table

use crate::adapters::database::Row;
use crate::domain::{PipelineError, Report, ReportId, ReportRequest, ReportStatus, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Column list shared by every `SELECT` on `reports`
pub const REPORT_COLUMNS: &str =
    "report_id, status, created_at, updated_at, request_data, export_location, error";

/// A `reports` row in storage representation
///
/// `request_data` holds the serialized [`ReportRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub report_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request_data: String,
    pub export_location: Option<String>,
    pub error: Option<String>,
}

impl ReportRow {
    /// Convert from domain Report
    pub fn from_domain(report: &Report) -> Result<Self> {
        Ok(Self {
            report_id: report.report_id.to_string(),
            status: report.status.as_str().to_string(),
            created_at: report.created_at,
            updated_at: report.updated_at,
            request_data: serde_json::to_string(&report.request)?,
            export_location: report.export_location.clone(),
            error: report.error.clone(),
        })
    }

    /// Convert to domain Report
    pub fn to_domain(&self) -> Result<Report> {
        let report_id = ReportId::new(&self.report_id).map_err(PipelineError::Database)?;
        let status = self
            .status
            .parse::<ReportStatus>()
            .map_err(PipelineError::Database)?;
        let request: ReportRequest = serde_json::from_str(&self.request_data).map_err(|e| {
            PipelineError::Database(format!(
                "Corrupt request_data for report {}: {e}",
                self.report_id
            ))
        })?;

        Ok(Report {
            report_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            request,
            export_location: self.export_location.clone(),
            error: self.error.clone(),
        })
    }

    /// Read the columns of [`REPORT_COLUMNS`] from a database row
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            report_id: required_text(row, "report_id")?,
            status: required_text(row, "status")?,
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
            request_data: required_text(row, "request_data")?,
            export_location: optional_text(row, "export_location")?,
            error: optional_text(row, "error")?,
        })
    }
}

fn optional_text(row: &Row, column: &str) -> Result<Option<String>> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(PipelineError::Database(format!(
            "Column '{column}' is not text: {other}"
        ))),
    }
}

fn required_text(row: &Row, column: &str) -> Result<String> {
    optional_text(row, column)?
        .ok_or_else(|| PipelineError::Database(format!("Column '{column}' is missing or NULL")))
}

/// Timestamps arrive as RFC 3339 from zoned columns and as naive ISO-8601
/// from zoneless ones; naive values are taken as UTC
fn timestamp(row: &Row, column: &str) -> Result<DateTime<Utc>> {
    let text = required_text(row, column)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&text) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| PipelineError::Database(format!("Column '{column}' is not a timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn report() -> Report {
        let request = ReportRequest {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            dealer_ids: Some(vec!["dealer123".to_string()]),
            template_id: None,
        };
        Report::new_pending(ReportId::new("r-1").unwrap(), request, Utc::now())
    }

    #[test]
    fn test_domain_round_trip() {
        let report = report();
        let row = ReportRow::from_domain(&report).unwrap();
        assert_eq!(row.status, "pending");
        assert_eq!(row.to_domain().unwrap(), report);
    }

    #[test]
    fn test_from_row_accepts_naive_and_zoned_timestamps() {
        let row: Row = json!({
            "report_id": "r-1",
            "status": "queued",
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": "2024-03-01T10:05:00.123",
            "request_data": "{\"startDate\":\"2023-01-01\",\"endDate\":\"2023-01-02\"}",
            "export_location": "data/exports/r-1/data.json",
            "error": null
        })
        .as_object()
        .cloned()
        .unwrap();

        let parsed = ReportRow::from_row(&row).unwrap().to_domain().unwrap();
        assert_eq!(parsed.status, ReportStatus::Queued);
        assert!(parsed.updated_at > parsed.created_at);
        assert_eq!(
            parsed.export_location.as_deref(),
            Some("data/exports/r-1/data.json")
        );
        assert!(parsed.error.is_none());
        assert!(parsed.request.dealer_ids.is_none());
    }

    #[test]
    fn test_from_row_rejects_missing_column() {
        let row: Row = json!({"report_id": "r-1"}).as_object().cloned().unwrap();
        assert!(matches!(
            ReportRow::from_row(&row),
            Err(PipelineError::Database(_))
        ));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut row = ReportRow::from_domain(&report()).unwrap();
        row.status = "archived".to_string();
        assert!(row.to_domain().is_err());
    }
}
