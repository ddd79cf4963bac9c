//! Domain models and types for the report pipeline.
//!
//! # Overview
//!
//! - **Identifiers** ([`ReportId`], [`TemplateId`]) as validated newtypes
//! - **Report model** ([`Report`], [`ReportStatus`], [`ReportRequest`])
//! - **Error types** ([`PipelineError`], [`StorageError`])
//! - **Result alias** ([`Result`])
//!
//! # Lifecycle
//!
//! ```rust
//! use report_pipeline::domain::ReportStatus;
//!
//! assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Processing));
//! assert!(ReportStatus::Queued.can_transition_to(ReportStatus::Failed));
//! assert!(!ReportStatus::Failed.can_transition_to(ReportStatus::Pending));
//! ```

pub mod errors;
pub mod ids;
pub mod report;
pub mod result;

pub use errors::{PipelineError, StorageError};
pub use ids::{ReportId, TemplateId};
pub use report::{Report, ReportRequest, ReportStatus, StatusUpdateDetails};
pub use result::Result;
