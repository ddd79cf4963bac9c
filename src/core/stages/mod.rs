//! Pipeline stages
//!
//! Each stage is one event-triggered step of the report pipeline. Stages
//! depend only on adapter traits, so the same code runs inside Lambda against
//! AWS and in `run-local` or tests against in-memory adapters.
//!
//! - [`create`] - HTTP request → pending report → data lake export
//! - [`process`] - export snapshot written → validate → enqueue → queued
//! - [`export_csv`] - queued job → CSV artifact → completed
//! - [`query`] - HTTP query → source table rows → enqueue

pub mod create;
pub mod export_csv;
pub mod process;
pub mod query;

pub use create::{create_report, parse_create_request};
pub use export_csv::{export_csv, CsvArtifact};
pub use process::{process_export, report_id_from_key, ProcessOutcome};
pub use query::{run_query, QueryParams};

use crate::adapters::datalake::DataLake;
use crate::adapters::queue::MessageQueue;
use crate::adapters::storage::ObjectStore;
use crate::config::PipelineConfig;
use crate::core::lifecycle::ReportLifecycle;
use std::sync::Arc;

/// Deployment settings the stages need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSettings {
    /// Bucket holding export snapshots and CSV artifacts
    pub bucket: String,
    /// Key prefix of export snapshots, without slashes
    pub export_prefix: String,
    /// Queue feeding the CSV stage
    pub export_queue_url: String,
    /// Append a random suffix to CSV file names
    pub random_suffix: bool,
}

impl StageSettings {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            bucket: config.storage.bucket.clone(),
            export_prefix: config.storage.export_prefix.trim_matches('/').to_string(),
            export_queue_url: config.queue.export_queue_url.clone(),
            random_suffix: config.csv.random_suffix,
        }
    }
}

/// Adapters and settings shared by the stages of one invocation
#[derive(Clone)]
pub struct PipelineServices {
    pub lifecycle: ReportLifecycle,
    pub object_store: Arc<dyn ObjectStore>,
    pub queue: Arc<dyn MessageQueue>,
    pub data_lake: Arc<dyn DataLake>,
    pub settings: StageSettings,
}
