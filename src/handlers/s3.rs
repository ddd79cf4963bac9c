//! S3 notification handler

use crate::core::stages::{process_export, PipelineServices, ProcessOutcome};
use crate::domain::{PipelineError, Result};
use serde_json::{json, Value};

/// Bucket and (still URL-encoded) key of one S3 event record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Extract `(bucket, key)` pairs from an S3 notification event
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] if `Records` is missing or a
/// record lacks `s3.bucket.name` or `s3.object.key`.
pub fn decode_s3_records(event: &Value) -> Result<Vec<S3ObjectRef>> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::MalformedPayload("S3 event must include Records array".to_string()))?;

    records
        .iter()
        .map(|record| {
            let s3 = record.get("s3");
            let bucket = s3
                .and_then(|s| s.pointer("/bucket/name"))
                .and_then(Value::as_str);
            let key = s3
                .and_then(|s| s.pointer("/object/key"))
                .and_then(Value::as_str);
            match (bucket, key) {
                (Some(bucket), Some(key)) => Ok(S3ObjectRef {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }),
                _ => Err(PipelineError::MalformedPayload(
                    "S3 record must include s3.bucket.name and s3.object.key".to_string(),
                )),
            }
        })
        .collect()
}

/// Run the processing stage for every record, one after another
///
/// Per-record failures are recorded on the report and do not stop the batch.
pub async fn handle_s3_event(event: &Value, services: &PipelineServices) -> Result<Value> {
    let objects = decode_s3_records(event)?;

    let mut queued = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;
    for object in &objects {
        match process_export(services, &object.bucket, &object.key).await {
            ProcessOutcome::Queued(_) => queued += 1,
            ProcessOutcome::Skipped { .. } => skipped += 1,
            ProcessOutcome::Failed { .. } => failed += 1,
        }
    }

    tracing::info!(records = objects.len(), queued, skipped, failed, "S3 event processed");
    Ok(json!({ "queued": queued, "skipped": skipped, "failed": failed }))
}
