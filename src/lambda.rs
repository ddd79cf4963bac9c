//! Shared bootstrap for the Lambda entry points
//!
//! Configuration and AWS clients are built once per execution environment.
//! The database client is built per invocation and closed when it ends.

use crate::adapters::database::{create_database_client, DatabaseClient};
use crate::adapters::datalake::create_data_lake;
use crate::adapters::queue::{MessageQueue, SqsQueue};
use crate::adapters::storage::{ObjectStore, S3ObjectStore};
use crate::config::PipelineConfig;
use crate::core::lifecycle::ReportLifecycle;
use crate::core::repository::SqlReportRepository;
use crate::core::stages::{PipelineServices, StageSettings};
use crate::domain::Result;
use crate::logging::{init_logging, LoggingGuard};
use aws_config::BehaviorVersion;
use std::sync::Arc;

/// Long-lived state of one Lambda execution environment
pub struct AwsRuntime {
    pub config: PipelineConfig,
    pub object_store: Arc<dyn ObjectStore>,
    pub queue: Arc<dyn MessageQueue>,
}

impl AwsRuntime {
    /// Load configuration from the environment, start logging and build the
    /// AWS clients
    ///
    /// The returned guard must outlive the runtime loop.
    pub async fn init() -> Result<(Self, LoggingGuard)> {
        let config = PipelineConfig::from_env()?;
        let guard = init_logging(&config.application.log_level, &config.logging)?;

        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        tracing::info!(
            database = %config.database.kind,
            data_lake = %config.data_lake.kind,
            bucket = %config.storage.bucket,
            "Lambda runtime initialized"
        );

        Ok((
            Self {
                object_store: Arc::new(S3ObjectStore::from_sdk_config(&sdk_config)),
                queue: Arc::new(SqsQueue::from_sdk_config(&sdk_config)),
                config,
            },
            guard,
        ))
    }

    /// A fresh database client for one invocation
    pub fn database(&self) -> Result<Arc<dyn DatabaseClient>> {
        create_database_client(&self.config.database)
    }

    /// Stage services over `db`
    pub fn services(&self, db: Arc<dyn DatabaseClient>) -> PipelineServices {
        let repository = Arc::new(SqlReportRepository::new(db));
        PipelineServices {
            lifecycle: ReportLifecycle::new(repository),
            object_store: self.object_store.clone(),
            queue: self.queue.clone(),
            data_lake: create_data_lake(self.config.data_lake.kind, self.object_store.clone()),
            settings: StageSettings::from_config(&self.config),
        }
    }
}

/// Close a per-invocation database client, logging instead of failing
pub async fn close_database(db: &dyn DatabaseClient) {
    if let Err(err) = db.close().await {
        tracing::warn!(error = %err, "Failed to close database connection");
    }
}
