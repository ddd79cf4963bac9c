//! API Gateway proxy handlers

use crate::adapters::database::DatabaseClient;
use crate::adapters::queue::MessageQueue;
use crate::core::stages::{create_report, parse_create_request, run_query, PipelineServices, QueryParams};
use crate::domain::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// API Gateway proxy integration response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn json(status_code: u16, payload: &Value) -> Self {
        Self {
            status_code,
            headers: json!({"Content-Type": "application/json"}),
            body: payload.to_string(),
        }
    }

    /// Parsed body, for tests and logging
    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// `POST /reports`
///
/// 202 with `{reportId, status}` on success, 400 for a bad filter, 500
/// with `{error, details}` for anything else.
pub async fn handle_create_report_event(event: Value, services: &PipelineServices) -> ApiGatewayResponse {
    let body = match request_body(event) {
        Ok(body) => body,
        Err(message) => return ApiGatewayResponse::json(400, &json!({ "error": message })),
    };

    let request = match parse_create_request(&body) {
        Ok(request) => request,
        Err(err) => return error_response(&err),
    };

    match create_report(services, request).await {
        Ok(report) => ApiGatewayResponse::json(
            202,
            &json!({ "reportId": report.report_id, "status": report.status }),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Failed to initiate report");
            ApiGatewayResponse::json(
                err.http_status(),
                &json!({ "error": "Failed to initiate report", "details": message_of(&err) }),
            )
        }
    }
}

/// `GET /query?dealer_id=..&template_id=..&start_date=..&end_date=..`
pub async fn handle_query_event(
    event: Value,
    db: &dyn DatabaseClient,
    queue: &dyn MessageQueue,
    queue_url: &str,
) -> ApiGatewayResponse {
    let params = match QueryParams::from_query(&query_parameters(&event)) {
        Ok(params) => params,
        Err(err) => return error_response(&err),
    };

    match run_query(db, queue, queue_url, &params).await {
        Ok(message) => ApiGatewayResponse::json(
            200,
            &json!({ "message": "Query result sent to SQS", "payload": message }),
        ),
        Err(err) => {
            tracing::error!(
                error = %err,
                template_id = %params.template_id,
                dealer_id = %params.dealer_id,
                "Query stage failed"
            );
            ApiGatewayResponse::json(
                err.http_status(),
                &json!({
                    "error": "Error querying database or sending to SQS",
                    "details": message_of(&err),
                    "template_id": params.template_id,
                    "table": params.template_id.table_name(),
                }),
            )
        }
    }
}

/// The request body as JSON; a string body is parsed, a missing one is `{}`
fn request_body(event: Value) -> Result<Value, String> {
    let Value::Object(mut object) = event else {
        return Err("Request payload must be a JSON object".to_string());
    };

    match object.remove("body") {
        None | Some(Value::Null) => Ok(json!({})),
        Some(body @ Value::Object(_)) => Ok(body),
        Some(Value::String(text)) => {
            serde_json::from_str(&text).map_err(|e| format!("Malformed JSON body: {e}"))
        }
        Some(_) => Err("Request body must be a JSON object".to_string()),
    }
}

fn query_parameters(event: &Value) -> HashMap<String, String> {
    event
        .get("queryStringParameters")
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// `{"error": <message>}` with the error's status code
fn error_response(err: &PipelineError) -> ApiGatewayResponse {
    ApiGatewayResponse::json(err.http_status(), &json!({ "error": message_of(err) }))
}

/// The human part of an error, without the variant prefix
fn message_of(err: &PipelineError) -> String {
    match err {
        PipelineError::Validation(msg)
        | PipelineError::Database(msg)
        | PipelineError::Queue(msg)
        | PipelineError::MalformedPayload(msg)
        | PipelineError::Other(msg) => msg.clone(),
        other => other.to_string(),
    }
}
