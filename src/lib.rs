// Report Pipeline - Serverless dealer report ETL
// Copyright (c) 2025 Report Pipeline Contributors
// Licensed under the MIT License

//! # Report Pipeline - dealer report ETL
//!
//! Turns a report request into a CSV artifact in object storage through a
//! chain of event-triggered functions:
//!
//! 1. An HTTP request creates a `pending` report and asks the data lake to
//!    export the matching dealer records into the bucket.
//! 2. The storage notification for the snapshot validates it and puts an
//!    export job on the queue; the report becomes `queued`.
//! 3. The queue consumer renders the job as CSV, writes it under
//!    `SSE_{dealer}/{template}/{date}/` and completes the report.
//!
//! A fourth function queries a dealer table directly and enqueues the rows
//! for the same CSV stage.
//!
//! ## Architecture
//!
//! - [`domain`] - report model, identifiers and errors
//! - [`config`] - TOML and environment configuration
//! - [`adapters`] - database, object store, queue and data lake seams
//! - [`core`] - report lifecycle, repository and the pipeline stages
//! - [`handlers`] - Lambda event decoding and HTTP responses
//! - [`lambda`] - shared bootstrap of the Lambda binaries
//! - [`cli`] - the `report-pipeline` operator tool
//! - [`logging`] - structured logging
//!
//! ## Error Handling
//!
//! Every fallible operation returns [`domain::Result`], whose error is
//! [`domain::PipelineError`]:
//!
//! ```rust
//! use report_pipeline::domain::{PipelineError, ReportId};
//!
//! let err = PipelineError::Validation("Missing required filter parameters: startDate".into());
//! assert_eq!(err.http_status(), 400);
//! assert!(ReportId::new("").is_err());
//! ```
//!
//! ## Logging
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(report_id = "r-1", "Report export started");
//! warn!(key = "exports/readme.txt", "Object key does not match the export layout; skipping");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod handlers;
pub mod lambda;
pub mod logging;
