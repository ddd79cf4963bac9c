//! Database abstraction layer
//!
//! A trait-based seam over the relational backends (PostgreSQL, MSSQL) that
//! hold the `reports` table and the dealer source tables.

pub mod factory;
pub mod schema;
pub mod traits;

pub use factory::create_database_client;
pub use traits::{DatabaseClient, Row, SqlParam};
