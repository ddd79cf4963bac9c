//! Configuration management for the report pipeline.
//!
//! # Sources
//!
//! - **TOML file** (CLI): `${VAR_NAME}` placeholders are substituted from the
//!   environment before parsing.
//! - **Environment only** (Lambda): [`PipelineConfig::from_env`].
//!
//! Both apply the same environment overrides and validation.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [database]
//! kind = "postgres"
//! host = "reports-db.internal"
//! name = "reports"
//! user = "etl"
//! password = "${DB_PASSWORD}"
//!
//! [data_lake]
//! kind = "mock"
//!
//! [storage]
//! bucket = "dealer-report-data"
//!
//! [queue]
//! export_queue_url = "https://sqs.us-east-1.amazonaws.com/123456789012/report-export"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Setting |
//! |---|---|
//! | `DB_TYPE` | `database.kind` (`postgres` or `mssql`) |
//! | `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD` | database connection |
//! | `DATA_LAKE_TYPE` | `data_lake.kind` (`mock` or `real`) |
//! | `DATA_BUCKET` | `storage.bucket` |
//! | `EXPORT_QUEUE_URL` | `queue.export_queue_url` |
//! | `LOG_LEVEL` | `application.log_level` |

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CsvConfig, DataLakeConfig, DataLakeKind, DatabaseConfig, DatabaseKind,
    LoggingConfig, PipelineConfig, QueueConfig, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
