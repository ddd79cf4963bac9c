//! PostgreSQL backend
//!
//! Pooled connections through deadpool-postgres and tokio-postgres.

pub mod client;

pub use client::PostgreSQLClient;
