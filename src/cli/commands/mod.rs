//! CLI command implementations
//!
//! Every command returns its process exit code: 0 success, 2 configuration
//! error, 4 connection error, 5 fatal error.

pub mod init;
pub mod run_local;
pub mod schema;
pub mod status;
pub mod validate;
