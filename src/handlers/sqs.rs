//! SQS batch handler

use crate::core::stages::{export_csv, PipelineServices};
use crate::domain::{PipelineError, Result};
use serde_json::{json, Value};

/// Message bodies of an SQS event, in delivery order
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] if `Records` is missing or a
/// body is not a string.
pub fn decode_sqs_bodies(event: &Value) -> Result<Vec<String>> {
    let records = event
        .get("Records")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::MalformedPayload("SQS event must include Records array".to_string()))?;

    records
        .iter()
        .map(|record| {
            record
                .get("body")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| {
                    PipelineError::MalformedPayload("SQS record body must be a string".to_string())
                })
        })
        .collect()
}

/// Run the CSV stage for every message
///
/// Failures are recorded on the report (when one is named) and counted; they
/// are not returned as errors, so the batch is not redelivered.
pub async fn handle_sqs_event(event: &Value, services: &PipelineServices) -> Result<Value> {
    let bodies = decode_sqs_bodies(event)?;

    let mut files = Vec::new();
    let mut failed = 0usize;
    for body in &bodies {
        match export_csv(services, body).await {
            Ok(artifact) => files.push(artifact.key),
            Err(_) => failed += 1,
        }
    }

    tracing::info!(records = bodies.len(), written = files.len(), failed, "SQS batch processed");
    Ok(json!({ "files": files, "failed": failed }))
}
