//! External system integrations.
//!
//! - [`database`] - relational backend abstraction ([`database::DatabaseClient`])
//! - [`postgresql`] - PostgreSQL client (deadpool-postgres)
//! - [`mssql`] - SQL Server client (tiberius)
//! - [`storage`] - object storage ([`storage::ObjectStore`]) on S3 or in memory
//! - [`queue`] - message queue ([`queue::MessageQueue`]) on SQS or in memory
//! - [`datalake`] - data lake export ([`datalake::DataLake`])
//!
//! # Design Pattern
//!
//! Each adapter isolates one external dependency behind a trait so the
//! pipeline stages can run against in-memory implementations in tests and in
//! `report-pipeline run-local`.

pub mod database;
pub mod datalake;
pub mod mssql;
pub mod postgresql;
pub mod queue;
pub mod storage;
