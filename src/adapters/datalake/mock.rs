//! Mock data lake over a fixed dealer metrics dataset

use super::{DataLake, ExportRequest, SNAPSHOT_FILE_NAME};
use crate::adapters::storage::{ObjectMetadata, ObjectStore, StorageLocation};
use crate::domain::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Daily metrics for one dealer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerMetrics {
    pub sales: u64,
    pub revenue: u64,
    pub customers: u64,
}

/// One row of the mock dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerMetricsRecord {
    pub dealer_id: String,
    pub date: NaiveDate,
    pub metrics: DealerMetrics,
}

impl DealerMetricsRecord {
    fn new(dealer_id: &str, date: NaiveDate, sales: u64, revenue: u64, customers: u64) -> Self {
        Self {
            dealer_id: dealer_id.to_string(),
            date,
            metrics: DealerMetrics {
                sales,
                revenue,
                customers,
            },
        }
    }
}

/// The two-dealer dataset served by default
pub fn default_dataset() -> Vec<DealerMetricsRecord> {
    let mut records = Vec::with_capacity(2);
    if let Some(date) = NaiveDate::from_ymd_opt(2023, 1, 1) {
        records.push(DealerMetricsRecord::new("dealer123", date, 100, 50_000, 75));
    }
    if let Some(date) = NaiveDate::from_ymd_opt(2023, 1, 2) {
        records.push(DealerMetricsRecord::new("dealer456", date, 150, 75_000, 100));
    }
    records
}

/// [`DataLake`] that filters an in-memory dataset and writes it as JSON
pub struct MockDataLake {
    store: Arc<dyn ObjectStore>,
    records: Vec<DealerMetricsRecord>,
}

impl MockDataLake {
    /// Mock lake over [`default_dataset`]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self::with_records(store, default_dataset())
    }

    pub fn with_records(store: Arc<dyn ObjectStore>, records: Vec<DealerMetricsRecord>) -> Self {
        Self { store, records }
    }

    /// Records selected by `request`, in dataset order
    pub fn filter(&self, request: &ExportRequest) -> Vec<&DealerMetricsRecord> {
        self.records
            .iter()
            .filter(|r| request.includes(r.date, &r.dealer_id))
            .collect()
    }

    /// Serialized snapshot for `request`
    ///
    /// Same request and same dataset always produce the same bytes.
    pub fn render(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.filter(request))?)
    }
}

#[async_trait]
impl DataLake for MockDataLake {
    async fn start_export(&self, request: &ExportRequest) -> Result<()> {
        let location = StorageLocation::parse(&request.output_location)?;
        let key = location.key(SNAPSHOT_FILE_NAME);
        let body = self.render(request)?;

        tracing::info!(
            report_id = %request.report_id,
            bucket = %location.bucket,
            key = %key,
            records = self.filter(request).len(),
            "Writing mock data lake export"
        );

        self.store
            .put_object(
                &location.bucket,
                &key,
                body,
                "application/json",
                &ObjectMetadata::new(),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryObjectStore;
    use crate::domain::ReportId;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn request(start: &str, end: &str, dealers: Option<Vec<&str>>) -> ExportRequest {
        ExportRequest {
            report_id: ReportId::from_str("r-1").unwrap(),
            start_date: date(start),
            end_date: date(end),
            dealer_ids: dealers.map(|d| d.into_iter().map(String::from).collect()),
            output_location: "s3://data/exports/r-1".to_string(),
        }
    }

    #[test]
    fn test_filter_by_inclusive_date_range() {
        let lake = MockDataLake::new(Arc::new(MemoryObjectStore::new()));

        let both = lake.filter(&request("2023-01-01", "2023-01-02", None));
        assert_eq!(both.len(), 2);

        let first = lake.filter(&request("2023-01-01", "2023-01-01", None));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].dealer_id, "dealer123");

        assert!(lake
            .filter(&request("2023-02-01", "2023-02-28", None))
            .is_empty());
    }

    #[test]
    fn test_filter_by_dealer() {
        let lake = MockDataLake::new(Arc::new(MemoryObjectStore::new()));
        let rows = lake.filter(&request("2023-01-01", "2023-01-31", Some(vec!["dealer456"])));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].metrics.revenue, 75_000);

        let none = lake.filter(&request("2023-01-01", "2023-01-31", Some(vec![])));
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_export_writes_json_snapshot() {
        let store = Arc::new(MemoryObjectStore::new());
        let lake = MockDataLake::new(store.clone());

        lake.start_export(&request("2023-01-01", "2023-01-01", Some(vec!["dealer123"])))
            .await
            .unwrap();

        let object = store.object("data", "exports/r-1/data.json").unwrap();
        assert_eq!(object.content_type, "application/json");
        let rows: serde_json::Value = serde_json::from_slice(&object.body).unwrap();
        assert_eq!(
            rows,
            serde_json::json!([{
                "dealerId": "dealer123",
                "date": "2023-01-01",
                "metrics": {"sales": 100, "revenue": 50000, "customers": 75}
            }])
        );
    }

    #[tokio::test]
    async fn test_repeated_export_is_byte_identical() {
        let store = Arc::new(MemoryObjectStore::new());
        let lake = MockDataLake::new(store.clone());
        let req = request("2023-01-01", "2023-01-02", None);

        lake.start_export(&req).await.unwrap();
        let first = store.object("data", "exports/r-1/data.json").unwrap().body;
        lake.start_export(&req).await.unwrap();
        let second = store.object("data", "exports/r-1/data.json").unwrap().body;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_output_location() {
        let lake = MockDataLake::new(Arc::new(MemoryObjectStore::new()));
        let mut req = request("2023-01-01", "2023-01-02", None);
        req.output_location = "s3://".to_string();
        assert!(lake.start_export(&req).await.is_err());
    }
}
