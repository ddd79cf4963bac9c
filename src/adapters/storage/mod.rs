//! Object storage abstraction
//!
//! The pipeline reads exported snapshots from, and writes CSV artifacts to, an
//! object store addressed by bucket and key. [`S3ObjectStore`] talks to AWS;
//! [`MemoryObjectStore`] keeps objects in process for local runs and tests.

pub mod memory;
pub mod s3;

pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::S3ObjectStore;

use crate::domain::{Result, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// User-defined metadata attached to a stored object
pub type ObjectMetadata = BTreeMap<String, String>;

/// Object store capability
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the full body of an object
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] when the key does not exist and
    /// [`StorageError::GetObject`] for any other failure.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Write an object, replacing any existing one at the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &ObjectMetadata,
    ) -> Result<()>;
}

/// A bucket plus key prefix, parsed from `s3://bucket/prefix` or `bucket/prefix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub prefix: String,
}

impl StorageLocation {
    /// Parse a location URI
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidLocation`] when the bucket is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use report_pipeline::adapters::storage::StorageLocation;
    ///
    /// let loc = StorageLocation::parse("s3://data/exports/r-1").unwrap();
    /// assert_eq!(loc.bucket, "data");
    /// assert_eq!(loc.key("data.json"), "exports/r-1/data.json");
    /// ```
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri.strip_prefix("s3://").unwrap_or(uri);
        let (bucket, prefix) = match rest.split_once('/') {
            Some((bucket, prefix)) => (bucket, prefix.trim_matches('/')),
            None => (rest, ""),
        };

        if bucket.is_empty() {
            return Err(StorageError::InvalidLocation(uri.to_string()).into());
        }

        Ok(Self {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }

    /// Key for `name` under this location's prefix
    pub fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix, name)
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("s3://bucket/exports/r1", "bucket", "exports/r1" ; "with scheme")]
    #[test_case("bucket/exports/r1", "bucket", "exports/r1" ; "without scheme")]
    #[test_case("s3://bucket/exports/r1/", "bucket", "exports/r1" ; "trailing slash")]
    #[test_case("s3://bucket", "bucket", "" ; "bucket only")]
    fn test_parse_location(uri: &str, bucket: &str, prefix: &str) {
        let loc = StorageLocation::parse(uri).unwrap();
        assert_eq!(loc.bucket, bucket);
        assert_eq!(loc.prefix, prefix);
    }

    #[test_case("" ; "empty")]
    #[test_case("s3://" ; "scheme only")]
    #[test_case("s3:///key" ; "missing bucket")]
    fn test_parse_invalid_location(uri: &str) {
        assert!(StorageLocation::parse(uri).is_err());
    }

    #[test]
    fn test_key_and_display() {
        let loc = StorageLocation::parse("s3://bucket").unwrap();
        assert_eq!(loc.key("data.json"), "data.json");
        assert_eq!(loc.to_string(), "s3://bucket");

        let loc = StorageLocation::parse("bucket/exports/r1").unwrap();
        assert_eq!(loc.to_string(), "s3://bucket/exports/r1");
    }
}
