//! Production data warehouse export

use super::{DataLake, ExportRequest};
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;

/// Placeholder for a warehouse-backed export (Snowflake `COPY INTO`, Athena
/// query to S3 or similar); every call fails
#[derive(Debug, Default, Clone, Copy)]
pub struct RealDataLake;

#[async_trait]
impl DataLake for RealDataLake {
    async fn start_export(&self, request: &ExportRequest) -> Result<()> {
        tracing::error!(report_id = %request.report_id, "Real data lake export requested");
        Err(PipelineError::Other(
            "Real data lake implementation not yet available".to_string(),
        ))
    }
}
