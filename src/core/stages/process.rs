//! Export processing stage
//!
//! Triggered by the object store when a data lake snapshot lands at
//! `{export_prefix}/{report_id}/data.json`.

use super::PipelineServices;
use crate::adapters::database::Row;
use crate::adapters::datalake::SNAPSHOT_FILE_NAME;
use crate::core::messages::{ExportJobMessage, JobMetadata, DEFAULT_TEMPLATE_ID};
use crate::domain::{PipelineError, Report, ReportId, Result};
use serde_json::{json, Value};

/// What happened to one storage event
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// Snapshot validated, job enqueued, report queued
    Queued(Report),
    /// Event ignored; no report was touched
    Skipped { key: String, reason: String },
    /// Report marked failed
    Failed { report_id: ReportId, error: String },
}

/// Extract the report id from an export snapshot key
///
/// Returns `None` unless the key is exactly
/// `{export_prefix}/{report_id}/data.json`.
pub fn report_id_from_key(key: &str, export_prefix: &str) -> Option<ReportId> {
    let rest = key.strip_prefix(export_prefix.trim_matches('/'))?.strip_prefix('/')?;
    let (id, file) = rest.split_once('/')?;
    if file != SNAPSHOT_FILE_NAME {
        return None;
    }
    ReportId::new(id).ok()
}

/// Decode an S3 event object key (`+` is a space, then percent-decoding)
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

/// Validate one export snapshot and hand it to the CSV stage
///
/// Any failure once the report id is known marks the report `failed`. A
/// report that is no longer `pending` (a redelivered event) is skipped.
///
/// The report is marked `queued` before the job is sent. If the send fails
/// the report moves on to `failed` and no message is left behind.
pub async fn process_export(services: &PipelineServices, bucket: &str, raw_key: &str) -> ProcessOutcome {
    let key = decode_object_key(raw_key);
    let Some(report_id) = report_id_from_key(&key, &services.settings.export_prefix) else {
        tracing::warn!(bucket, key = %key, "Object key does not match the export layout; skipping");
        return ProcessOutcome::Skipped {
            key,
            reason: "key does not match export layout".to_string(),
        };
    };

    let report = match services.lifecycle.mark_processing(&report_id).await {
        Ok(report) => report,
        Err(err @ PipelineError::InvalidTransition { .. }) => {
            tracing::warn!(report_id = %report_id, error = %err, "Report not pending; skipping");
            return ProcessOutcome::Skipped {
                key,
                reason: err.to_string(),
            };
        }
        Err(err) => return fail(services, report_id, err).await,
    };

    match enqueue_snapshot(services, &report, bucket, &key).await {
        Ok(report) => ProcessOutcome::Queued(report),
        Err(err) => fail(services, report_id, err).await,
    }
}

async fn enqueue_snapshot(
    services: &PipelineServices,
    report: &Report,
    bucket: &str,
    key: &str,
) -> Result<Report> {
    let body = services.object_store.get_object(bucket, key).await?;
    let rows = parse_snapshot(&body)?;
    let data_location = format!("{bucket}/{key}");

    let message = build_message(report, rows, &data_location)?;
    let body = message.to_body()?;

    // The consumer may run before send_message returns
    let queued = services
        .lifecycle
        .mark_queued(&report.report_id, &data_location)
        .await?;

    services
        .queue
        .send_message(&services.settings.export_queue_url, body)
        .await?;

    tracing::info!(
        report_id = %report.report_id,
        rows = message.data.len(),
        "Export job enqueued"
    );
    Ok(queued)
}

/// Parse a snapshot body into rows; it must be a non-empty array of objects
pub fn parse_snapshot(body: &[u8]) -> Result<Vec<Row>> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| PipelineError::MalformedPayload(format!("Exported data is not valid JSON: {e}")))?;

    let Value::Array(items) = value else {
        return Err(PipelineError::MalformedPayload(
            "Exported data is not in expected format".to_string(),
        ));
    };
    if items.is_empty() {
        return Err(PipelineError::MalformedPayload(
            "Exported data is empty".to_string(),
        ));
    }

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(PipelineError::MalformedPayload(format!(
                "Exported row is not an object: {other}"
            ))),
        })
        .collect()
}

fn build_message(report: &Report, data: Vec<Row>, data_location: &str) -> Result<ExportJobMessage> {
    let request = &report.request;
    let template_id = request
        .template_id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());

    let query_params = json!({
        "dealer_ids": request.dealer_ids,
        "start_date": request.start_date,
        "end_date": request.end_date,
        "report_id": report.report_id,
    });

    Ok(ExportJobMessage {
        metadata: JobMetadata {
            template_id,
            query_start_date: request.start_date.to_string(),
            query_end_date: request.end_date.to_string(),
            query_params: serde_json::to_string(&query_params)?,
            report_id: Some(report.report_id.to_string()),
            data_location: Some(data_location.to_string()),
            version: None,
            extra: Default::default(),
        },
        data,
    })
}

async fn fail(services: &PipelineServices, report_id: ReportId, err: PipelineError) -> ProcessOutcome {
    crate::log_stage_failure!("process", report_id, err);
    services.lifecycle.record_failure(&report_id, &err).await;
    ProcessOutcome::Failed {
        report_id,
        error: err.to_string(),
    }
}
