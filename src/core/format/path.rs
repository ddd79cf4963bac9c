//! Object key of a CSV artifact
//!
//! `SSE_{dealer}/{template}/{YYYY-MM-DD}/[v{version}/]{template}_{YYYYMMDDHHMMSS}[_{suffix}].csv`

use crate::adapters::database::Row;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Used for the dealer or template segment when none is known
pub const UNKNOWN_SEGMENT: &str = "unknown";

/// Builder for the artifact key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPath {
    dealer: String,
    template: String,
    generated_at: DateTime<Utc>,
    version: Option<String>,
    suffix: Option<String>,
}

impl ArtifactPath {
    pub fn new(dealer: &str, template: &str, generated_at: DateTime<Utc>) -> Self {
        Self {
            dealer: segment(dealer),
            template: segment(template),
            generated_at,
            version: None,
            suffix: None,
        }
    }

    /// Adds a `v{version}/` directory when a version is given
    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(segment);
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Adds six random hex characters so two files in the same second differ
    pub fn with_random_suffix(self) -> Self {
        let bytes: [u8; 3] = rand::random();
        let suffix: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        self.with_suffix(suffix)
    }

    pub fn key(&self) -> String {
        let date = self.generated_at.format("%Y-%m-%d");
        let timestamp = self.generated_at.format("%Y%m%d%H%M%S");

        let mut key = format!("SSE_{}/{}/{}/", self.dealer, self.template, date);
        if let Some(version) = &self.version {
            key.push_str(&format!("v{version}/"));
        }
        key.push_str(&format!("{}_{}", self.template, timestamp));
        if let Some(suffix) = &self.suffix {
            key.push('_');
            key.push_str(suffix);
        }
        key.push_str(".csv");
        key
    }
}

/// Dealer of a row set, taken from the first row's `dealer_id` (or
/// `dealerId`) column
pub fn dealer_of(rows: &[Row]) -> String {
    rows.first()
        .and_then(|row| row.get("dealer_id").or_else(|| row.get("dealerId")))
        .and_then(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| UNKNOWN_SEGMENT.to_string())
}

fn segment(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN_SEGMENT.to_string()
    } else {
        trimmed.replace('/', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_plain_key() {
        let key = ArtifactPath::new("dealer123", "dealerSales", at()).key();
        assert_eq!(
            key,
            "SSE_dealer123/dealerSales/2024-03-05/dealerSales_20240305140709.csv"
        );
    }

    #[test]
    fn test_versioned_key_with_suffix() {
        let key = ArtifactPath::new("dealer123", "dealerSales", at())
            .with_version(Some("2"))
            .with_suffix("a1b2c3")
            .key();
        assert_eq!(
            key,
            "SSE_dealer123/dealerSales/2024-03-05/v2/dealerSales_20240305140709_a1b2c3.csv"
        );
    }

    #[test]
    fn test_random_suffix_is_six_hex_chars() {
        let key = ArtifactPath::new("d", "t", at()).with_random_suffix().key();
        let suffix = key
            .trim_end_matches(".csv")
            .rsplit('_')
            .next()
            .unwrap()
            .to_string();
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_segments_are_sanitized() {
        let key = ArtifactPath::new("a/b", " ", at()).key();
        assert!(key.starts_with("SSE_a_b/unknown/"));
    }

    #[test]
    fn test_dealer_of() {
        let row = |v: serde_json::Value| v.as_object().cloned().unwrap();
        assert_eq!(dealer_of(&[row(json!({"dealer_id": "d1"}))]), "d1");
        assert_eq!(dealer_of(&[row(json!({"dealerId": "d2"}))]), "d2");
        assert_eq!(dealer_of(&[row(json!({"dealer_id": 42}))]), "42");
        assert_eq!(dealer_of(&[row(json!({"other": 1}))]), "unknown");
        assert_eq!(dealer_of(&[]), "unknown");
    }
}
