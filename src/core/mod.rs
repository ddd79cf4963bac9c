//! Core business logic for the report pipeline.
//!
//! # Modules
//!
//! - [`repository`] - report persistence ([`repository::ReportStore`])
//! - [`lifecycle`] - forward-only status transitions
//! - [`messages`] - the export job message passed over the queue
//! - [`format`] - CSV rendering and artifact naming
//! - [`stages`] - the four event-triggered pipeline steps
//!
//! # Report Workflow
//!
//! 1. **Create**: insert a `pending` report, start the data lake export
//! 2. **Process**: the snapshot lands in storage; report goes `processing`,
//!    the rows are validated and enqueued, report goes `queued`
//! 3. **Format**: the CSV stage writes the artifact, report goes `completed`
//!
//! Any failure once the report id is known marks the report `failed`.
//!
//! # Example
//!
//! ```rust
//! use report_pipeline::adapters::datalake::MockDataLake;
//! use report_pipeline::adapters::queue::MemoryQueue;
//! use report_pipeline::adapters::storage::MemoryObjectStore;
//! use report_pipeline::core::lifecycle::ReportLifecycle;
//! use report_pipeline::core::repository::MemoryReportStore;
//! use report_pipeline::core::stages::{create_report, parse_create_request, PipelineServices, StageSettings};
//! use std::sync::Arc;
//!
//! # async fn example() -> report_pipeline::domain::Result<()> {
//! let store = Arc::new(MemoryObjectStore::new());
//! let services = PipelineServices {
//!     lifecycle: ReportLifecycle::new(Arc::new(MemoryReportStore::new())),
//!     object_store: store.clone(),
//!     queue: Arc::new(MemoryQueue::new()),
//!     data_lake: Arc::new(MockDataLake::new(store)),
//!     settings: StageSettings {
//!         bucket: "reports".to_string(),
//!         export_prefix: "exports".to_string(),
//!         export_queue_url: "memory://export".to_string(),
//!         random_suffix: false,
//!     },
//! };
//!
//! let request = parse_create_request(&serde_json::json!({
//!     "filter": {"startDate": "2023-01-01", "endDate": "2023-01-01"}
//! }))?;
//! let report = create_report(&services, request).await?;
//! println!("created {}", report.report_id);
//! # Ok(())
//! # }
//! ```

pub mod format;
pub mod lifecycle;
pub mod messages;
pub mod repository;
pub mod stages;
