//! Data lake factory

use super::{DataLake, MockDataLake, RealDataLake};
use crate::adapters::storage::ObjectStore;
use crate::config::DataLakeKind;
use std::sync::Arc;

/// Build the data lake adapter selected by configuration
///
/// `store` is where the mock variant writes its snapshots.
pub fn create_data_lake(kind: DataLakeKind, store: Arc<dyn ObjectStore>) -> Arc<dyn DataLake> {
    tracing::debug!(data_lake = ?kind, "Creating data lake adapter");
    match kind {
        DataLakeKind::Mock => Arc::new(MockDataLake::new(store)),
        DataLakeKind::Real => Arc::new(RealDataLake),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::datalake::ExportRequest;
    use crate::adapters::storage::MemoryObjectStore;
    use crate::domain::ReportId;
    use chrono::NaiveDate;

    fn request() -> ExportRequest {
        ExportRequest {
            report_id: ReportId::generate(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            dealer_ids: None,
            output_location: "s3://bucket/exports/x".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_kind_writes_snapshot() {
        let store = Arc::new(MemoryObjectStore::new());
        let lake = create_data_lake(DataLakeKind::Mock, store.clone());
        lake.start_export(&request()).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_real_kind_is_unavailable() {
        let store = Arc::new(MemoryObjectStore::new());
        let lake = create_data_lake(DataLakeKind::Real, store.clone());
        let err = lake.start_export(&request()).await.unwrap_err();
        assert!(err.to_string().contains("not yet available"));
        assert!(store.is_empty());
    }
}
