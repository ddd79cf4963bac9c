//! Run-local command implementation
//!
//! Drives one report through create, process and CSV stages in-process. The
//! object store, queue and report store are in-memory and the data lake is the
//! mock, so no AWS account or database is needed.

use crate::adapters::datalake::MockDataLake;
use crate::adapters::queue::MemoryQueue;
use crate::adapters::storage::MemoryObjectStore;
use crate::core::lifecycle::ReportLifecycle;
use crate::core::repository::MemoryReportStore;
use crate::core::stages::{
    create_report, export_csv, parse_create_request, process_export, report_id_from_key,
    CsvArtifact, PipelineServices, ProcessOutcome, StageSettings,
};
use crate::domain::Report;
use clap::Args;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LOCAL_BUCKET: &str = "local-report-data";
const LOCAL_QUEUE_URL: &str = "memory://report-export";

/// Arguments for the run-local command
#[derive(Args, Debug)]
pub struct RunLocalArgs {
    /// First day of the report (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: String,

    /// Last day of the report (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub end_date: String,

    /// Restrict to these dealers; repeat for several
    #[arg(long = "dealer-id")]
    pub dealer_ids: Vec<String>,

    /// Template id used in the artifact name
    #[arg(long)]
    pub template_id: Option<String>,

    /// Also write CSV artifacts into this directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

/// Result of one local run
#[derive(Debug)]
pub struct LocalRun {
    pub report: Report,
    pub artifacts: Vec<CsvArtifact>,
    pub store: Arc<MemoryObjectStore>,
}

impl RunLocalArgs {
    /// Execute the run-local command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        println!("🚚 Running report pipeline locally");
        println!();

        let run = match self.run().await {
            Ok(run) => run,
            Err(e) => {
                println!("❌ Pipeline run failed");
                println!("   Error: {e}");
                return Ok(if e.http_status() == 400 { 2 } else { 5 });
            }
        };

        println!("Report:");
        println!("{}", serde_json::to_string_pretty(&run.report)?);
        println!();

        if run.artifacts.is_empty() {
            println!("No CSV artifacts were written.");
            return Ok(if run.report.status.is_terminal() { 0 } else { 5 });
        }

        for artifact in &run.artifacts {
            println!("📄 s3://{}/{} ({} rows)", artifact.bucket, artifact.key, artifact.rows);
            let Some(object) = run.store.object(&artifact.bucket, &artifact.key) else {
                continue;
            };
            println!("{}", String::from_utf8_lossy(&object.body));

            if let Some(dir) = &self.output_dir {
                let path = write_artifact(dir, &artifact.key, &object.body)?;
                println!("   saved to {}", path.display());
            }
        }

        Ok(0)
    }

    fn request_body(&self) -> Value {
        let mut filter = json!({
            "startDate": self.start_date,
            "endDate": self.end_date,
        });
        if !self.dealer_ids.is_empty() {
            filter["dealerIds"] = json!(self.dealer_ids);
        }
        if let Some(template_id) = &self.template_id {
            filter["templateId"] = json!(template_id);
        }
        json!({ "filter": filter })
    }

    /// Run every stage and return the final report state
    ///
    /// # Errors
    ///
    /// Returns the request validation error, or the error of a stage that
    /// could not record its failure on the report.
    pub async fn run(&self) -> crate::domain::Result<LocalRun> {
        let request = parse_create_request(&self.request_body())?;

        let store = Arc::new(MemoryObjectStore::new());
        let queue = Arc::new(MemoryQueue::new());
        let services = PipelineServices {
            lifecycle: ReportLifecycle::new(Arc::new(MemoryReportStore::new())),
            object_store: store.clone(),
            queue: queue.clone(),
            data_lake: Arc::new(MockDataLake::new(store.clone())),
            settings: StageSettings {
                bucket: LOCAL_BUCKET.to_string(),
                export_prefix: "exports".to_string(),
                export_queue_url: LOCAL_QUEUE_URL.to_string(),
                random_suffix: false,
            },
        };

        let report = create_report(&services, request).await?;
        tracing::info!(report_id = %report.report_id, "Local report created");

        // Stand-in for the storage notification
        for key in store.keys(LOCAL_BUCKET) {
            if report_id_from_key(&key, &services.settings.export_prefix).as_ref()
                != Some(&report.report_id)
            {
                continue;
            }
            if let ProcessOutcome::Failed { error, .. } =
                process_export(&services, LOCAL_BUCKET, &key).await
            {
                tracing::warn!(error = %error, "Export processing failed");
            }
        }

        let mut artifacts = Vec::new();
        while let Some(message) = queue.pop() {
            match export_csv(&services, &message.body).await {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => tracing::warn!(error = %e, "CSV stage failed"),
            }
        }

        let report = services.lifecycle.get(&report.report_id).await?;
        Ok(LocalRun {
            report,
            artifacts,
            store,
        })
    }
}

fn write_artifact(dir: &Path, key: &str, body: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(key);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, body)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PipelineError, ReportStatus};

    fn args(start: &str, end: &str, dealers: &[&str]) -> RunLocalArgs {
        RunLocalArgs {
            start_date: start.to_string(),
            end_date: end.to_string(),
            dealer_ids: dealers.iter().map(|d| d.to_string()).collect(),
            template_id: None,
            output_dir: None,
        }
    }

    #[tokio::test]
    async fn test_run_completes_report_with_one_artifact() {
        let run = args("2023-01-01", "2023-01-01", &["dealer123"])
            .run()
            .await
            .unwrap();

        assert_eq!(run.report.status, ReportStatus::Completed);
        assert_eq!(run.artifacts.len(), 1);
        assert_eq!(run.artifacts[0].rows, 1);
        assert!(run.artifacts[0].key.starts_with("SSE_dealer123/dealerMetrics/"));
    }

    #[tokio::test]
    async fn test_run_with_no_matching_data_fails_report() {
        let run = args("2024-06-01", "2024-06-30", &[]).run().await.unwrap();

        assert_eq!(run.report.status, ReportStatus::Failed);
        assert!(run.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_run_with_reversed_dates_fails_report() {
        let run = args("2023-01-02", "2023-01-01", &[]).run().await.unwrap();

        assert_eq!(run.report.status, ReportStatus::Failed);
        assert!(run
            .report
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("Exported data is empty"));
        assert!(run.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_run_rejects_unparseable_dates() {
        let err = args("01/01/2023", "2023-01-01", &[]).run().await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_execute_writes_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args("2023-01-01", "2023-01-02", &[]);
        args.output_dir = Some(dir.path().to_path_buf());

        assert_eq!(args.execute().await.unwrap(), 0);
        let dealer_dir = dir.path().join("SSE_dealer123").join("dealerMetrics");
        assert!(dealer_dir.is_dir());
    }
}
