//! Microsoft SQL Server backend (tiberius)

pub mod client;

pub use client::MssqlClient;
