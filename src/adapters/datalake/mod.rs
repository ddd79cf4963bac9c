//! Data lake export adapters
//!
//! A data lake export writes a filtered snapshot of dealer data to object
//! storage; the write itself is what triggers the processing stage. The call
//! returns once the snapshot is stored and says nothing about downstream work.
//!
//! - [`MockDataLake`] filters a fixed in-memory dataset
//! - [`RealDataLake`] is the production warehouse slot and is not implemented

pub mod factory;
pub mod mock;
pub mod real;

pub use factory::create_data_lake;
pub use mock::{DealerMetrics, DealerMetricsRecord, MockDataLake};
pub use real::RealDataLake;

use crate::domain::{ReportId, ReportRequest, Result};
use async_trait::async_trait;
use chrono::NaiveDate;

/// File name of the snapshot written under the output location
pub const SNAPSHOT_FILE_NAME: &str = "data.json";

/// Parameters of one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub report_id: ReportId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `None` means every dealer
    pub dealer_ids: Option<Vec<String>>,
    /// `s3://bucket/prefix`; the snapshot lands at `{prefix}/data.json`
    pub output_location: String,
}

impl ExportRequest {
    /// Export parameters for a stored report request
    pub fn for_report(
        report_id: ReportId,
        request: &ReportRequest,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            report_id,
            start_date: request.start_date,
            end_date: request.end_date,
            dealer_ids: request.dealer_ids.clone(),
            output_location: output_location.into(),
        }
    }

    /// True if a row for `dealer_id` on `date` belongs in this export
    ///
    /// The date range is inclusive on both ends. A missing dealer filter
    /// matches every dealer.
    pub fn includes(&self, date: NaiveDate, dealer_id: &str) -> bool {
        date >= self.start_date
            && date <= self.end_date
            && self
                .dealer_ids
                .as_ref()
                .map_or(true, |ids| ids.iter().any(|id| id == dealer_id))
    }
}

/// Data lake export capability
#[async_trait]
pub trait DataLake: Send + Sync {
    /// Write the filtered snapshot for `request` to its output location
    async fn start_export(&self, request: &ExportRequest) -> Result<()>;
}
