//! Domain error types
//!
//! Every fallible operation in the pipeline returns [`PipelineError`]. Adapter
//! code converts driver and SDK errors into strings at the boundary so no
//! third-party error type escapes into the stages.

use thiserror::Error;

/// Main pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or malformed request fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown report id
    #[error("Report not found: {0}")]
    NotFound(String),

    /// Duplicate report id on create
    #[error("Report already exists: {0}")]
    Conflict(String),

    /// Database driver or connection failure
    #[error("Database error: {0}")]
    Database(String),

    /// Object storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Message queue failure
    #[error("Queue error: {0}")]
    Queue(String),

    /// Exported or queued data is not in the expected shape
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// A status write that would move a report backwards
    #[error("Invalid status transition for report {report_id}: {from} -> {to}")]
    InvalidTransition {
        report_id: String,
        from: String,
        to: String,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// True for failures of an external system (database, object store, queue)
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            PipelineError::Database(_) | PipelineError::Storage(_) | PipelineError::Queue(_)
        )
    }

    /// HTTP status code an API-facing stage should answer with
    ///
    /// Only bad client input is a 400; every other failure is a 500.
    pub fn http_status(&self) -> u16 {
        match self {
            PipelineError::Validation(_) => 400,
            _ => 500,
        }
    }
}

/// Object storage errors
///
/// Mirrors the S3 operations the pipeline performs.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("invalid storage location: {0}")]
    InvalidLocation(String),

    #[error("GetObject failed: {0}")]
    GetObject(String),

    #[error("PutObject failed: {0}")]
    PutObject(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        PipelineError::Serialization(format!("CSV error: {err}"))
    }
}
