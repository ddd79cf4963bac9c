//! Source query stage
//!
//! Reads one dealer's rows for a template from its source table and enqueues
//! them for CSV formatting.

use crate::adapters::database::{DatabaseClient, SqlParam};
use crate::adapters::queue::MessageQueue;
use crate::core::messages::{ExportJobMessage, JobMetadata};
use crate::domain::{PipelineError, Result, TemplateId};
use chrono::NaiveDate;
use serde_json::json;
use std::collections::HashMap;

/// Validated query-string parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub dealer_id: String,
    pub template_id: TemplateId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl QueryParams {
    /// Parse `dealer_id`, `template_id`, `start_date` and `end_date`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] if any parameter is missing,
    /// a date is not `YYYY-MM-DD`, or the template id is not a plain
    /// identifier.
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self> {
        let get = |name: &str| {
            params
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let (Some(dealer_id), Some(template_id), Some(start_date), Some(end_date)) = (
            get("dealer_id"),
            get("template_id"),
            get("start_date"),
            get("end_date"),
        ) else {
            return Err(PipelineError::Validation(
                "Missing required parameters: dealer_id, template_id, start_date, end_date"
                    .to_string(),
            ));
        };

        let parse_date = |name: &str, value: &str| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                PipelineError::Validation(format!("{name} must be a YYYY-MM-DD date: {value}"))
            })
        };

        Ok(Self {
            dealer_id: dealer_id.to_string(),
            template_id: TemplateId::new(template_id).map_err(PipelineError::Validation)?,
            start_date: parse_date("start_date", start_date)?,
            end_date: parse_date("end_date", end_date)?,
        })
    }

    /// The `SELECT` issued against the template's source table
    pub fn sql(&self) -> String {
        format!(
            "SELECT * FROM {} WHERE dealer_id = $1 AND report_date BETWEEN $2 AND $3",
            self.template_id.table_name()
        )
    }
}

/// Query the source table and enqueue the rows as one export job
///
/// The job is sent even when the query matches no rows; the CSV stage
/// rejects empty jobs.
pub async fn run_query(
    db: &dyn DatabaseClient,
    queue: &dyn MessageQueue,
    queue_url: &str,
    params: &QueryParams,
) -> Result<ExportJobMessage> {
    db.connect().await?;

    let report_type = params.template_id.table_name();
    let rows = db
        .query(
            &params.sql(),
            &[
                SqlParam::from(params.dealer_id.as_str()),
                SqlParam::from(params.start_date),
                SqlParam::from(params.end_date),
            ],
        )
        .await?;

    tracing::info!(
        dealer_id = %params.dealer_id,
        table = %report_type,
        rows = rows.len(),
        "Source query complete"
    );

    let query_params = json!({
        "dealer_id": params.dealer_id,
        "start_date": params.start_date,
        "end_date": params.end_date,
        "report_type": report_type,
    });

    let message = ExportJobMessage {
        metadata: JobMetadata {
            template_id: params.template_id.to_string(),
            query_start_date: params.start_date.to_string(),
            query_end_date: params.end_date.to_string(),
            query_params: serde_json::to_string(&query_params)?,
            report_id: None,
            data_location: None,
            version: None,
            extra: Default::default(),
        },
        data: rows,
    };

    queue.send_message(queue_url, message.to_body()?).await?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_query() {
        let parsed = QueryParams::from_query(&params(&[
            ("dealer_id", "dealer123"),
            ("template_id", "dealerSales"),
            ("start_date", "2023-01-01"),
            ("end_date", "2023-01-31"),
        ]))
        .unwrap();
        assert_eq!(
            parsed.sql(),
            "SELECT * FROM dealer_sales WHERE dealer_id = $1 AND report_date BETWEEN $2 AND $3"
        );
    }

    #[test_case(&[("template_id", "t"), ("start_date", "2023-01-01"), ("end_date", "2023-01-02")] ; "no dealer")]
    #[test_case(&[("dealer_id", "d"), ("start_date", "2023-01-01"), ("end_date", "2023-01-02")] ; "no template")]
    #[test_case(&[("dealer_id", "d"), ("template_id", "t"), ("end_date", "2023-01-02")] ; "no start")]
    #[test_case(&[("dealer_id", ""), ("template_id", "t"), ("start_date", "2023-01-01"), ("end_date", "2023-01-02")] ; "blank dealer")]
    #[test_case(&[("dealer_id", "d"), ("template_id", "t;drop"), ("start_date", "2023-01-01"), ("end_date", "2023-01-02")] ; "unsafe template")]
    #[test_case(&[("dealer_id", "d"), ("template_id", "t"), ("start_date", "Jan 1"), ("end_date", "2023-01-02")] ; "bad date")]
    fn test_from_query_rejects(pairs: &[(&str, &str)]) {
        assert!(matches!(
            QueryParams::from_query(&params(pairs)),
            Err(PipelineError::Validation(_))
        ));
    }
}
