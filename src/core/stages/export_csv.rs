//! CSV formatting stage
//!
//! Consumes an [`ExportJobMessage`], writes the CSV artifact and, when the
//! message names a report, completes it.

use super::PipelineServices;
use crate::core::format::{dealer_of, rows_to_csv, ArtifactPath};
use crate::core::messages::ExportJobMessage;
use crate::domain::{PipelineError, Report, ReportId, Result};
use chrono::Utc;
use serde_json::Value;

/// Where a CSV artifact was written
#[derive(Debug, Clone, PartialEq)]
pub struct CsvArtifact {
    pub bucket: String,
    pub key: String,
    pub rows: usize,
    /// The completed report, for messages that carry a report id
    pub report: Option<Report>,
}

/// Format one queue message body into a CSV artifact
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] for bodies that are not a
/// valid job with non-empty `data`, or the storage/database error that
/// stopped the stage. In every case a referenced report is marked `failed`.
pub async fn export_csv(services: &PipelineServices, body: &str) -> Result<CsvArtifact> {
    let message = match ExportJobMessage::parse(body) {
        Ok(message) => message,
        Err(err) => {
            if let Some(report_id) = raw_report_id(body) {
                crate::log_stage_failure!("export_csv", report_id, err);
                services.lifecycle.record_failure(&report_id, &err).await;
            } else {
                tracing::error!(error = %err, "Discarding malformed export job");
            }
            return Err(err);
        }
    };

    let report_id = message.metadata.report_id()?;
    match write_artifact(services, &message, report_id.as_ref()).await {
        Ok(artifact) => Ok(artifact),
        Err(err) => {
            if let Some(report_id) = &report_id {
                crate::log_stage_failure!("export_csv", report_id, err);
                services.lifecycle.record_failure(report_id, &err).await;
            }
            Err(err)
        }
    }
}

async fn write_artifact(
    services: &PipelineServices,
    message: &ExportJobMessage,
    report_id: Option<&ReportId>,
) -> Result<CsvArtifact> {
    let csv = rows_to_csv(&message.data)?;

    let mut path = ArtifactPath::new(
        &dealer_of(&message.data),
        &message.metadata.template_id,
        Utc::now(),
    )
    .with_version(message.metadata.version.as_deref());
    if services.settings.random_suffix {
        path = path.with_random_suffix();
    }
    let key = path.key();

    services
        .object_store
        .put_object(
            &services.settings.bucket,
            &key,
            csv,
            "text/csv",
            &message.metadata.object_metadata()?,
        )
        .await?;

    tracing::info!(
        bucket = %services.settings.bucket,
        key = %key,
        rows = message.data.len(),
        "CSV artifact written"
    );

    let report = match report_id {
        Some(id) => Some(services.lifecycle.mark_completed(id).await?),
        None => None,
    };

    Ok(CsvArtifact {
        bucket: services.settings.bucket.clone(),
        key,
        rows: message.data.len(),
        report,
    })
}

/// Best-effort report id from a body that failed to parse as a job
fn raw_report_id(body: &str) -> Option<ReportId> {
    let value: Value = serde_json::from_str(body).ok()?;
    let id = value.get("metadata")?.get("report_id")?.as_str()?;
    ReportId::new(id).ok()
}
