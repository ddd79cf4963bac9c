//! Schema command implementation
//!
//! Prints the `reports` DDL for a backend, or applies it to the configured
//! database.

use crate::adapters::database::create_database_client;
use crate::adapters::database::schema::{ensure_schema, schema_sql};
use crate::config::{load_config, DatabaseKind};
use clap::Args;

/// Arguments for the schema command
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Backend whose DDL to print; defaults to the configured one
    #[arg(long)]
    pub kind: Option<DatabaseKind>,

    /// Run the DDL against the configured database instead of printing it
    #[arg(long, conflicts_with = "kind")]
    pub apply: bool,
}

impl SchemaArgs {
    /// Execute the schema command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        if let (Some(kind), false) = (self.kind, self.apply) {
            print!("{}", schema_sql(kind));
            return Ok(0);
        }

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if !self.apply {
            print!("{}", schema_sql(config.database.kind));
            return Ok(0);
        }

        tracing::info!(backend = %config.database.kind, "Applying report schema");
        println!("🗄️  Applying reports schema ({})", config.database.kind);

        let db = match create_database_client(&config.database) {
            Ok(db) => db,
            Err(e) => {
                println!("❌ Failed to create database client");
                println!("   Error: {e}");
                return Ok(2);
            }
        };
        if let Err(e) = db.connect().await {
            println!("❌ Failed to connect to database");
            println!("   Error: {e}");
            return Ok(4);
        }

        let result = ensure_schema(db.as_ref()).await;
        if let Err(e) = db.close().await {
            tracing::warn!(error = %e, "Failed to close database connection");
        }

        match result {
            Ok(()) => {
                println!("✅ Schema is up to date");
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to apply schema");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}
