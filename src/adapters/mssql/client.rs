//! Microsoft SQL Server client implementation

use crate::adapters::database::traits::{DatabaseClient, Row, SqlParam};
use crate::config::{DatabaseConfig, DatabaseKind};
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tiberius::{AuthMethod, Client, ColumnData, Config, Query};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

type TdsClient = Client<Compat<TcpStream>>;

/// SQL Server error numbers for primary key and unique index violations
const UNIQUE_VIOLATION_CODES: [u32; 2] = [2627, 2601];

/// SQL Server client holding a single TDS connection
pub struct MssqlClient {
    config: DatabaseConfig,
    client: Mutex<Option<TdsClient>>,
}

impl MssqlClient {
    /// Create a new client; no connection is opened yet
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is not for MSSQL.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        if config.kind != DatabaseKind::Mssql {
            return Err(PipelineError::Configuration(format!(
                "MSSQL client created with database kind '{}'",
                config.kind
            )));
        }
        Ok(Self {
            config,
            client: Mutex::new(None),
        })
    }

    fn tds_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.host);
        config.port(self.config.effective_port());
        config.database(&self.config.name);
        let password = self
            .config
            .password
            .as_ref()
            .map(|p| p.expose_secret().as_ref().to_string())
            .unwrap_or_default();
        config.authentication(AuthMethod::sql_server(&self.config.user, password));
        if self.config.trust_server_certificate {
            config.trust_cert();
        }
        config
    }

    async fn open(&self) -> Result<TdsClient> {
        let config = self.tds_config();
        let timeout = Duration::from_secs(self.config.connection_timeout_seconds);

        let tcp = tokio::time::timeout(timeout, TcpStream::connect(config.get_addr()))
            .await
            .map_err(|_| {
                PipelineError::Database(format!(
                    "Timed out connecting to {}:{}",
                    self.config.host,
                    self.config.effective_port()
                ))
            })?
            .map_err(|e| PipelineError::Database(format!("Failed to connect: {e}")))?;
        tcp.set_nodelay(true)
            .map_err(|e| PipelineError::Database(format!("Failed to configure socket: {e}")))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| PipelineError::Database(format!("MSSQL login failed: {e}")))?;

        tracing::debug!(
            host = %self.config.host,
            database = %self.config.name,
            "MSSQL connection established"
        );
        Ok(client)
    }

    async fn with_client<'a>(
        &'a self,
        guard: &'a mut tokio::sync::MutexGuard<'_, Option<TdsClient>>,
    ) -> Result<&'a mut TdsClient> {
        if guard.is_none() {
            **guard = Some(self.open().await?);
        }
        guard
            .as_mut()
            .ok_or_else(|| PipelineError::Database("MSSQL connection unavailable".to_string()))
    }
}

#[async_trait]
impl DatabaseClient for MssqlClient {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Mssql
    }

    async fn connect(&self) -> Result<()> {
        let mut guard = self.client.lock().await;
        self.with_client(&mut guard).await?;
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        let mut guard = self.client.lock().await;
        let client = self.with_client(&mut guard).await?;

        let query = build_query(sql, params);
        let rows = query
            .query(client)
            .await
            .map_err(map_tds_error)?
            .into_first_result()
            .await
            .map_err(map_tds_error)?;

        rows.iter().map(row_to_json).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        let mut guard = self.client.lock().await;
        let client = self.with_client(&mut guard).await?;

        let result = build_query(sql, params)
            .execute(client)
            .await
            .map_err(map_tds_error)?;
        Ok(result.total())
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut guard = self.client.lock().await;
        let client = self.with_client(&mut guard).await?;

        client
            .simple_query(sql)
            .await
            .map_err(map_tds_error)?
            .into_results()
            .await
            .map_err(map_tds_error)?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Some(client) = self.client.lock().await.take() {
            client
                .close()
                .await
                .map_err(|e| PipelineError::Database(format!("Failed to close connection: {e}")))?;
            tracing::debug!("MSSQL connection closed");
        }
        Ok(())
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is a valid regex"))
}

/// Rewrites `$1`-style placeholders into SQL Server's `@P1` form
fn rewrite_placeholders(sql: &str) -> String {
    placeholder_pattern().replace_all(sql, "@P${1}").into_owned()
}

fn build_query<'a>(sql: &str, params: &[SqlParam]) -> Query<'a> {
    let mut query = Query::new(rewrite_placeholders(sql));
    for param in params {
        match param {
            SqlParam::Text(v) => query.bind(v.clone()),
            SqlParam::NullableText(v) => query.bind(v.clone()),
            SqlParam::Timestamp(v) => query.bind(*v),
            SqlParam::Date(v) => query.bind(*v),
        }
    }
    query
}

fn map_tds_error(err: tiberius::error::Error) -> PipelineError {
    if let tiberius::error::Error::Server(token) = &err {
        if UNIQUE_VIOLATION_CODES.contains(&token.code()) {
            return PipelineError::Conflict(token.message().to_string());
        }
    }
    PipelineError::Database(format!("Query failed: {err}"))
}

fn row_to_json(row: &tiberius::Row) -> Result<Row> {
    let mut out = Row::new();
    for (idx, (column, data)) in row.cells().enumerate() {
        let value = cell_value(row, idx, data).map_err(|e| {
            PipelineError::Database(format!("Failed to read column '{}': {e}", column.name()))
        })?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn cell_value(
    row: &tiberius::Row,
    idx: usize,
    data: &ColumnData<'static>,
) -> std::result::Result<Value, String> {
    let err = |e: tiberius::error::Error| e.to_string();
    let value = match data {
        ColumnData::U8(v) => v.map(Value::from),
        ColumnData::I16(v) => v.map(Value::from),
        ColumnData::I32(v) => v.map(Value::from),
        ColumnData::I64(v) => v.map(Value::from),
        ColumnData::F32(v) => v.map(Value::from),
        ColumnData::F64(v) => v.map(Value::from),
        ColumnData::Bit(v) => v.map(Value::from),
        ColumnData::String(v) => v.as_ref().map(|s| Value::from(s.to_string())),
        ColumnData::Guid(v) => v.map(|g| Value::from(g.to_string())),
        ColumnData::Numeric(v) => v.map(|n| Value::from(f64::from(n))),
        ColumnData::DateTimeOffset(_) => row
            .try_get::<DateTime<Utc>, _>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.to_rfc3339())),
        ColumnData::Date(_) => row
            .try_get::<NaiveDate, _>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.format("%Y-%m-%d").to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => row
            .try_get::<NaiveDateTime, _>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        _ => return Err("unsupported column type; cast it to a string in the query".to_string()),
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_placeholders() {
        assert_eq!(
            rewrite_placeholders("UPDATE reports SET status = $1 WHERE report_id = $12"),
            "UPDATE reports SET status = @P1 WHERE report_id = @P12"
        );
        assert_eq!(rewrite_placeholders("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_rejects_postgres_config() {
        let config = DatabaseConfig::default();
        assert!(MssqlClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_close_without_connect_is_noop() {
        let config = DatabaseConfig {
            kind: DatabaseKind::Mssql,
            ..DatabaseConfig::default()
        };
        let client = MssqlClient::new(config).unwrap();
        assert!(client.close().await.is_ok());
    }
}
