//! Report domain model
//!
//! A [`Report`] tracks one export request from creation to a terminal status.
//! Status only moves forward (`pending -> processing -> queued -> completed`);
//! `failed` is reachable from every non-terminal status and nothing leaves it.

use super::ids::{ReportId, TemplateId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Row inserted, export requested
    Pending,
    /// Export landed in storage and is being validated
    Processing,
    /// Export validated and handed to the CSV stage
    Queued,
    /// CSV artifact written
    Completed,
    /// Any stage failed
    Failed,
}

impl ReportStatus {
    /// All statuses in lifecycle order
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Pending,
        ReportStatus::Processing,
        ReportStatus::Queued,
        ReportStatus::Completed,
        ReportStatus::Failed,
    ];

    /// Column value stored in the `reports.status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Queued => "queued",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    /// Completed and failed reports never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }

    /// Whether moving from `self` to `next` respects the forward-only rule
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        match (self, next) {
            (Pending, Processing) | (Processing, Queued) | (Queued, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "queued" => Ok(ReportStatus::Queued),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            other => Err(format!(
                "Invalid report status '{other}'. Must be one of: pending, processing, queued, completed, failed"
            )),
        }
    }
}

/// Snapshot of the parameters a report was requested with
///
/// Stored once in `request_data` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<TemplateId>,
}

/// Optional columns written alongside a status change
///
/// Both columns are written exactly as given; `None` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdateDetails {
    pub export_location: Option<String>,
    pub error: Option<String>,
}

impl StatusUpdateDetails {
    pub fn with_export_location(location: impl Into<String>) -> Self {
        Self {
            export_location: Some(location.into()),
            error: None,
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            export_location: None,
            error: Some(error.into()),
        }
    }
}

/// A row of the `reports` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: ReportId,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub request: ReportRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Report {
    /// A fresh pending report with both timestamps set to `now`
    pub fn new_pending(report_id: ReportId, request: ReportRequest, now: DateTime<Utc>) -> Self {
        Self {
            report_id,
            status: ReportStatus::Pending,
            created_at: now,
            updated_at: now,
            request,
            export_location: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test_case(ReportStatus::Pending, ReportStatus::Processing, true)]
    #[test_case(ReportStatus::Processing, ReportStatus::Queued, true)]
    #[test_case(ReportStatus::Queued, ReportStatus::Completed, true)]
    #[test_case(ReportStatus::Pending, ReportStatus::Failed, true)]
    #[test_case(ReportStatus::Processing, ReportStatus::Failed, true)]
    #[test_case(ReportStatus::Queued, ReportStatus::Failed, true)]
    #[test_case(ReportStatus::Failed, ReportStatus::Failed, false)]
    #[test_case(ReportStatus::Completed, ReportStatus::Failed, false)]
    #[test_case(ReportStatus::Failed, ReportStatus::Pending, false)]
    #[test_case(ReportStatus::Queued, ReportStatus::Processing, false)]
    #[test_case(ReportStatus::Pending, ReportStatus::Queued, false)]
    #[test_case(ReportStatus::Processing, ReportStatus::Processing, false)]
    fn test_transitions(from: ReportStatus, to: ReportStatus, allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in ReportStatus::ALL {
            assert_eq!(status.as_str().parse::<ReportStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = ReportRequest {
            start_date: date("2023-01-01"),
            end_date: date("2023-01-02"),
            dealer_ids: Some(vec!["dealer123".to_string()]),
            template_id: Some(TemplateId::new("dealerSales").unwrap()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["startDate"], "2023-01-01");
        assert_eq!(json["dealerIds"][0], "dealer123");
        assert_eq!(json["templateId"], "dealerSales");
    }
}
