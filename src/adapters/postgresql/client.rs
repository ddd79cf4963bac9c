//! PostgreSQL client implementation

use crate::adapters::database::traits::{DatabaseClient, Row, SqlParam};
use crate::config::{DatabaseConfig, DatabaseKind};
use crate::domain::{PipelineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde_json::Value;
use std::sync::Mutex;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::NoTls;

/// PostgreSQL client backed by a deadpool connection pool
///
/// The pool is created on first use and dropped by [`DatabaseClient::close`].
pub struct PostgreSQLClient {
    config: DatabaseConfig,
    pool: Mutex<Option<Pool>>,
}

impl PostgreSQLClient {
    /// Create a new client; no connection is opened yet
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is not for PostgreSQL.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        if config.kind != DatabaseKind::Postgres {
            return Err(PipelineError::Configuration(format!(
                "PostgreSQL client created with database kind '{}'",
                config.kind
            )));
        }
        Ok(Self {
            config,
            pool: Mutex::new(None),
        })
    }

    fn build_pool(&self) -> Result<Pool> {
        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&self.config.host)
            .port(self.config.effective_port())
            .dbname(&self.config.name)
            .user(&self.config.user)
            .connect_timeout(Duration::from_secs(self.config.connection_timeout_seconds))
            .options(&format!(
                "-c statement_timeout={}",
                self.config.statement_timeout_seconds * 1000
            ));
        if let Some(password) = &self.config.password {
            pg_config.password(password.expose_secret().as_ref());
        }

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Some(Duration::from_secs(self.config.connection_timeout_seconds));
        Pool::builder(manager)
            .max_size(self.config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Database(format!("Failed to create connection pool: {e}")))
    }

    fn pool(&self) -> Result<Pool> {
        let mut guard = self.pool.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }
        let pool = self.build_pool()?;
        *guard = Some(pool.clone());
        Ok(pool)
    }

    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool()?
            .get()
            .await
            .map_err(|e| PipelineError::Database(format!("Failed to get connection from pool: {e}")))
    }

    /// Connection target without credentials, for logs
    pub fn describe(&self) -> String {
        format!(
            "postgresql://***@{}:{}/{}",
            self.config.host,
            self.config.effective_port(),
            self.config.name
        )
    }
}

#[async_trait]
impl DatabaseClient for PostgreSQLClient {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    async fn connect(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PipelineError::Database(format!("Connection test failed: {e}")))?;
        tracing::debug!(target_db = %self.describe(), "PostgreSQL connection established");
        Ok(())
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        let bound = bind_params(params);
        let refs = param_refs(&bound);

        let rows = client.query(sql, &refs).await.map_err(map_pg_error)?;
        rows.iter().map(row_to_json).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64> {
        let client = self.get_connection().await?;
        let bound = bind_params(params);
        let refs = param_refs(&bound);

        client.execute(sql, &refs).await.map_err(map_pg_error)
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        let client = self.get_connection().await?;
        client.batch_execute(sql).await.map_err(map_pg_error)
    }

    async fn close(&self) -> Result<()> {
        let pool = self.pool.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(pool) = pool {
            pool.close();
            tracing::debug!("PostgreSQL pool closed");
        }
        Ok(())
    }
}

type BoundParam = Box<dyn ToSql + Sync + Send>;

fn bind_params(params: &[SqlParam]) -> Vec<BoundParam> {
    params
        .iter()
        .map(|param| -> BoundParam {
            match param {
                SqlParam::Text(v) => Box::new(v.clone()),
                SqlParam::NullableText(v) => Box::new(v.clone()),
                SqlParam::Timestamp(v) => Box::new(*v),
                SqlParam::Date(v) => Box::new(*v),
            }
        })
        .collect()
}

fn param_refs(bound: &[BoundParam]) -> Vec<&(dyn ToSql + Sync)> {
    bound
        .iter()
        .map(|p| p.as_ref() as &(dyn ToSql + Sync))
        .collect()
}

fn map_pg_error(err: tokio_postgres::Error) -> PipelineError {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            PipelineError::Conflict(err.to_string())
        }
        _ => PipelineError::Database(format!("Query failed: {err}")),
    }
}

fn row_to_json(row: &tokio_postgres::Row) -> Result<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let value = column_value(row, idx, column.type_()).map_err(|e| {
            PipelineError::Database(format!("Failed to read column '{}': {e}", column.name()))
        })?;
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

fn column_value(
    row: &tokio_postgres::Row,
    idx: usize,
    ty: &Type,
) -> std::result::Result<Value, String> {
    let err = |e: tokio_postgres::Error| e.to_string();
    let value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(err)?.map(Value::from),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map_err(err)?.map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map_err(err)?.map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(err)?.map(Value::from),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map_err(err)?.map(Value::from),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(err)?.map(Value::from),
        Type::NUMERIC => row
            .try_get::<_, Option<Decimal>>(idx)
            .map_err(err)?
            .map(decimal_to_json),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx).map_err(err)?.map(Value::from)
        }
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx).map_err(err)?,
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.to_rfc3339())),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.format("%Y-%m-%d").to_string())),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(idx)
            .map_err(err)?
            .map(|v| Value::from(v.to_string())),
        ref other => {
            return Err(format!(
                "unsupported column type {other}; cast it to text or a float in the query"
            ))
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Whole numbers that fit `i64` stay integers; the rest become floats,
/// falling back to text when out of `f64` range
fn decimal_to_json(value: Decimal) -> Value {
    if value.fract().is_zero() {
        if let Some(whole) = value.to_i64() {
            return Value::from(whole);
        }
    }
    value
        .to_f64()
        .map(Value::from)
        .unwrap_or_else(|| Value::from(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config() -> DatabaseConfig {
        DatabaseConfig {
            host: "db.internal".to_string(),
            name: "reports".to_string(),
            user: "etl".to_string(),
            password: Some(secret_string("hunter2".to_string())),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_describe_hides_password() {
        let client = PostgreSQLClient::new(config()).unwrap();
        let described = client.describe();
        assert!(!described.contains("hunter2"));
        assert_eq!(described, "postgresql://***@db.internal:5432/reports");
    }

    #[test]
    fn test_rejects_mssql_config() {
        let mut cfg = config();
        cfg.kind = DatabaseKind::Mssql;
        assert!(PostgreSQLClient::new(cfg).is_err());
    }

    #[test]
    fn test_bind_params_matches_input_length() {
        let params = vec![
            SqlParam::from("pending"),
            SqlParam::NullableText(None),
            SqlParam::Timestamp(Utc::now()),
        ];
        assert_eq!(param_refs(&bind_params(&params)).len(), 3);
    }

    #[test]
    fn test_decimal_to_json() {
        assert_eq!(decimal_to_json(Decimal::new(50_000, 0)), serde_json::json!(50000));
        assert_eq!(decimal_to_json(Decimal::new(7_500, 2)), serde_json::json!(75));
        assert_eq!(decimal_to_json(Decimal::new(1_050, 2)), serde_json::json!(10.5));
        assert_eq!(decimal_to_json(Decimal::new(-25, 1)), serde_json::json!(-2.5));
        assert!(decimal_to_json(Decimal::MAX).is_number());
    }

    #[tokio::test]
    async fn test_close_without_connect_is_noop() {
        let client = PostgreSQLClient::new(config()).unwrap();
        assert!(client.close().await.is_ok());
    }
}
