//! DDL for the `reports` table
//!
//! The statements are idempotent and may be run on every deploy.

use crate::adapters::database::traits::DatabaseClient;
use crate::config::DatabaseKind;
use crate::domain::Result;

const POSTGRES_SCHEMA: &str = include_str!("../../../migrations/postgres/001_create_reports.sql");
const MSSQL_SCHEMA: &str = include_str!("../../../migrations/mssql/001_create_reports.sql");

/// Schema script for a backend
pub fn schema_sql(kind: DatabaseKind) -> &'static str {
    match kind {
        DatabaseKind::Postgres => POSTGRES_SCHEMA,
        DatabaseKind::Mssql => MSSQL_SCHEMA,
    }
}

/// Create the `reports` table and its index if they are missing
///
/// # Errors
///
/// Returns an error if the script fails.
pub async fn ensure_schema(db: &dyn DatabaseClient) -> Result<()> {
    db.execute_batch(schema_sql(db.kind())).await?;
    tracing::info!(backend = %db.kind(), "Report schema ensured");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_declares_every_column() {
        for kind in [DatabaseKind::Postgres, DatabaseKind::Mssql] {
            let sql = schema_sql(kind);
            for column in [
                "report_id",
                "status",
                "created_at",
                "updated_at",
                "request_data",
                "export_location",
                "error",
            ] {
                assert!(sql.contains(column), "{kind} schema missing {column}");
            }
        }
    }
}
