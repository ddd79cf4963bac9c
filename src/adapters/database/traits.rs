//! Database abstraction traits
//!
//! Every backend exposes the same capability set: connect, run a query that
//! returns rows, run a statement that returns an affected-row count, close.
//! SQL is written with PostgreSQL-style `$n` placeholders; backends with a
//! different placeholder syntax rewrite them.

use crate::config::DatabaseKind;
use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

/// A row returned by [`DatabaseClient::query`], keyed by column name
///
/// Text columns map to JSON strings, numeric columns to numbers, dates and
/// timestamps to ISO-8601 strings and NULL to `Value::Null`.
pub type Row = Map<String, Value>;

/// A bind parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    NullableText(Option<String>),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<Option<String>> for SqlParam {
    fn from(value: Option<String>) -> Self {
        SqlParam::NullableText(value)
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(value: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(value)
    }
}

impl From<NaiveDate> for SqlParam {
    fn from(value: NaiveDate) -> Self {
        SqlParam::Date(value)
    }
}

/// Relational backend capability
///
/// `query` and `execute` connect lazily, so calling [`connect`] first is only
/// needed to surface connection errors early.
///
/// [`connect`]: DatabaseClient::connect
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Backend kind this client talks to
    fn kind(&self) -> DatabaseKind;

    /// Open the connection (or pool) if it is not open yet
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::PipelineError::Database`] if the server cannot
    /// be reached or rejects the credentials.
    async fn connect(&self) -> Result<()>;

    /// Run a query and return its rows
    ///
    /// # Errors
    ///
    /// Unique-key violations surface as
    /// [`crate::domain::PipelineError::Conflict`]; every other driver failure
    /// as [`crate::domain::PipelineError::Database`].
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>>;

    /// Run a statement and return the number of affected rows
    ///
    /// # Errors
    ///
    /// Same classification as [`DatabaseClient::query`].
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64>;

    /// Run a multi-statement script without parameters (DDL)
    async fn execute_batch(&self, sql: &str) -> Result<()>;

    /// Release the connection; later calls reconnect
    async fn close(&self) -> Result<()>;
}
