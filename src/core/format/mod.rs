//! CSV artifact formatting
//!
//! - [`flatten`] - nested JSON rows to dotted column paths
//! - [`csv`] - rows to CSV bytes
//! - [`path`] - object key of the artifact

pub mod csv;
pub mod flatten;
pub mod path;

pub use self::csv::rows_to_csv;
pub use flatten::flatten_row;
pub use path::{dealer_of, ArtifactPath};
