//! Configuration schema types

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relational backend holding the `reports` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// PostgreSQL via tokio-postgres
    #[default]
    Postgres,
    /// Microsoft SQL Server via tiberius
    Mssql,
}

impl DatabaseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Mssql => "mssql",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            DatabaseKind::Postgres => 5432,
            DatabaseKind::Mssql => 1433,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatabaseKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "mssql" | "sqlserver" => Ok(DatabaseKind::Mssql),
            other => Err(format!("Unsupported database type: {other}")),
        }
    }
}

/// Data lake backend used by the create stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataLakeKind {
    /// Filters the bundled dealer dataset and writes it to object storage
    #[default]
    Mock,
    /// Production warehouse export
    Real,
}

impl DataLakeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataLakeKind::Mock => "mock",
            DataLakeKind::Real => "real",
        }
    }
}

impl fmt::Display for DataLakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataLakeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(DataLakeKind::Mock),
            "real" => Ok(DataLakeKind::Real),
            other => Err(format!("Unknown data lake type: {other}")),
        }
    }
}

/// Main pipeline configuration
///
/// Maps to the TOML file used by the CLI; the Lambda binaries build the same
/// structure from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub data_lake: DataLakeConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub csv: CsvConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.storage.validate()?;
        self.queue.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend kind (postgres or mssql)
    #[serde(default)]
    pub kind: DatabaseKind,

    #[serde(default = "default_db_host")]
    pub host: String,

    /// Defaults to the backend's standard port when unset
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub user: String,

    /// Stored securely in memory and zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Pool size; one connection is enough for a single invocation
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    #[serde(default = "default_connection_timeout_seconds")]
    pub connection_timeout_seconds: u64,

    #[serde(default = "default_statement_timeout_seconds")]
    pub statement_timeout_seconds: u64,

    /// MSSQL only: accept the server certificate without validation
    #[serde(default = "default_true")]
    pub trust_server_certificate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::default(),
            host: default_db_host(),
            port: None,
            name: String::new(),
            user: String::new(),
            password: None,
            max_connections: default_max_connections(),
            connection_timeout_seconds: default_connection_timeout_seconds(),
            statement_timeout_seconds: default_statement_timeout_seconds(),
            trust_server_certificate: true,
        }
    }
}

impl DatabaseConfig {
    /// Port to connect to
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind.default_port())
    }

    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("database.host cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("database.name cannot be empty".to_string());
        }
        if self.user.trim().is_empty() {
            return Err("database.user cannot be empty".to_string());
        }
        if self.max_connections == 0 {
            return Err("database.max_connections must be greater than 0".to_string());
        }
        if self.connection_timeout_seconds == 0 {
            return Err("database.connection_timeout_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Data lake selection
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataLakeConfig {
    #[serde(default)]
    pub kind: DataLakeKind,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket receiving exports and CSV artifacts
    #[serde(default)]
    pub bucket: String,

    /// Key prefix for exported snapshots
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            export_prefix: default_export_prefix(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("storage.bucket cannot be empty".to_string());
        }
        if self.bucket.contains('/') {
            return Err(format!(
                "storage.bucket must be a bucket name, not a path: {}",
                self.bucket
            ));
        }
        if self.export_prefix.trim_matches('/').is_empty() {
            return Err("storage.export_prefix cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueueConfig {
    /// Queue feeding the CSV stage
    #[serde(default)]
    pub export_queue_url: String,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.export_queue_url.trim().is_empty() {
            return Err("queue.export_queue_url cannot be empty".to_string());
        }
        Ok(())
    }
}

/// CSV artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Append a random hex suffix to artifact file names
    #[serde(default = "default_true")]
    pub random_suffix: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            random_suffix: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit console logs as JSON lines (default inside Lambda)
    #[serde(default)]
    pub json: bool,

    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory path
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_max_connections() -> usize {
    1
}

fn default_connection_timeout_seconds() -> u64 {
    10
}

fn default_statement_timeout_seconds() -> u64 {
    30
}

fn default_export_prefix() -> String {
    "exports".to_string()
}

fn default_log_path() -> String {
    "/var/log/report-pipeline".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.database.name = "reports".to_string();
        config.database.user = "etl".to_string();
        config.storage.bucket = "report-data".to_string();
        config.queue.export_queue_url = "https://sqs.local/export".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_default_config_requires_bucket_and_queue() {
        let mut config = valid_config();
        config.storage.bucket.clear();
        assert!(config.validate().unwrap_err().contains("storage.bucket"));

        let mut config = valid_config();
        config.queue.export_queue_url.clear();
        assert!(config.validate().unwrap_err().contains("export_queue_url"));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = valid_config();
        config.application.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_kind_parse() {
        assert_eq!("postgres".parse::<DatabaseKind>().unwrap(), DatabaseKind::Postgres);
        assert_eq!("MSSQL".parse::<DatabaseKind>().unwrap(), DatabaseKind::Mssql);
        assert!("oracle".parse::<DatabaseKind>().is_err());
    }

    #[test]
    fn test_effective_port_defaults_by_kind() {
        let mut db = DatabaseConfig::default();
        assert_eq!(db.effective_port(), 5432);
        db.kind = DatabaseKind::Mssql;
        assert_eq!(db.effective_port(), 1433);
        db.port = Some(15433);
        assert_eq!(db.effective_port(), 15433);
    }

    #[test]
    fn test_data_lake_kind_parse() {
        assert_eq!("mock".parse::<DataLakeKind>().unwrap(), DataLakeKind::Mock);
        assert_eq!("real".parse::<DataLakeKind>().unwrap(), DataLakeKind::Real);
        let err = "snowflake".parse::<DataLakeKind>().unwrap_err();
        assert_eq!(err, "Unknown data lake type: snowflake");
    }

    #[test]
    fn test_bucket_with_path_rejected() {
        let mut config = valid_config();
        config.storage.bucket = "bucket/exports".to_string();
        assert!(config.validate().is_err());
    }
}
