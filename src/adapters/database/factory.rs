//! Database client factory
//!
//! The backend is chosen by [`DatabaseConfig::kind`], passed in explicitly
//! rather than read from a process-wide flag.

use crate::adapters::database::traits::DatabaseClient;
use crate::adapters::mssql::MssqlClient;
use crate::adapters::postgresql::PostgreSQLClient;
use crate::config::{DatabaseConfig, DatabaseKind};
use crate::domain::Result;
use std::sync::Arc;

/// Create a database client for the configured backend
///
/// No connection is opened here; the client connects on first use.
///
/// # Errors
///
/// Returns an error if the connection parameters cannot be turned into a
/// driver configuration.
pub fn create_database_client(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseClient>> {
    match config.kind {
        DatabaseKind::Postgres => {
            tracing::debug!(host = %config.host, database = %config.name, "Creating PostgreSQL client");
            Ok(Arc::new(PostgreSQLClient::new(config.clone())?))
        }
        DatabaseKind::Mssql => {
            tracing::debug!(host = %config.host, database = %config.name, "Creating MSSQL client");
            Ok(Arc::new(MssqlClient::new(config.clone())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(kind: DatabaseKind) -> DatabaseConfig {
        DatabaseConfig {
            kind,
            name: "reports".to_string(),
            user: "etl".to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn test_factory_selects_backend_by_kind() {
        let pg = create_database_client(&config(DatabaseKind::Postgres)).unwrap();
        assert_eq!(pg.kind(), DatabaseKind::Postgres);

        let mssql = create_database_client(&config(DatabaseKind::Mssql)).unwrap();
        assert_eq!(mssql.kind(), DatabaseKind::Mssql);
    }
}
