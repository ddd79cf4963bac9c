//! Export job message exchanged between stages over the queue
//!
//! ```json
//! {
//!   "metadata": {
//!     "template_id": "dealerMetrics",
//!     "query_start_date": "2023-01-01",
//!     "query_end_date": "2023-01-01",
//!     "query_params": "{\"dealer_ids\":[\"dealer123\"]}",
//!     "report_id": "5f0c..."
//!   },
//!   "data": [{"dealerId": "dealer123", "date": "2023-01-01"}]
//! }
//! ```

use crate::adapters::database::Row;
use crate::adapters::storage::ObjectMetadata;
use crate::domain::{PipelineError, ReportId, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Template used when a report request does not name one
pub const DEFAULT_TEMPLATE_ID: &str = "dealerMetrics";

/// Describes where the rows of a job came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub template_id: String,
    pub query_start_date: String,
    pub query_end_date: String,
    /// The query parameters, serialized as a JSON string
    pub query_params: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Any other producer-supplied fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobMetadata {
    /// Report id carried by the message, if any
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedPayload`] if the id is present but
    /// invalid.
    pub fn report_id(&self) -> Result<Option<ReportId>> {
        self.report_id
            .as_deref()
            .map(|id| ReportId::new(id).map_err(PipelineError::MalformedPayload))
            .transpose()
    }

    /// Object metadata for the CSV artifact: keys lowercased, values as text
    pub fn object_metadata(&self) -> Result<ObjectMetadata> {
        let Value::Object(fields) = serde_json::to_value(self)? else {
            return Err(PipelineError::Serialization(
                "job metadata did not serialize to an object".to_string(),
            ));
        };

        Ok(fields
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key.to_lowercase(), text)
            })
            .collect())
    }
}

/// A batch of rows to format, with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportJobMessage {
    pub metadata: JobMetadata,
    pub data: Vec<Row>,
}

impl ExportJobMessage {
    /// Decode and validate a queue message body
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedPayload`] if the body is not JSON of
    /// the expected shape or `data` is empty.
    pub fn parse(body: &str) -> Result<Self> {
        let message: ExportJobMessage = serde_json::from_str(body)
            .map_err(|e| PipelineError::MalformedPayload(format!("Invalid export job message: {e}")))?;

        if message.data.is_empty() {
            return Err(PipelineError::MalformedPayload(
                "Invalid data format: expected non-empty array".to_string(),
            ));
        }
        Ok(message)
    }

    pub fn to_body(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
