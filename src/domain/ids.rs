//! Domain identifier types with validation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Report identifier newtype wrapper
///
/// Assigned once at creation and never changed. The id is embedded in object
/// keys (`exports/{report_id}/data.json`), so it may not contain `/`.
///
/// # Examples
///
/// ```
/// use report_pipeline::domain::ids::ReportId;
/// use std::str::FromStr;
///
/// let id = ReportId::from_str("6f1c2a8e-1d2b-4c55-9a61-6f3e0b7d9c10").unwrap();
/// assert_eq!(id.as_str(), "6f1c2a8e-1d2b-4c55-9a61-6f3e0b7d9c10");
/// assert!(ReportId::new("a/b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportId(String);

impl ReportId {
    /// Creates a ReportId from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Report ID cannot be empty".to_string());
        }
        if id.contains('/') {
            return Err(format!("Report ID cannot contain '/': {id}"));
        }
        Ok(Self(id))
    }

    /// Generates a fresh random (v4 UUID) report id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the report id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ReportId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReportId> for String {
    fn from(id: ReportId) -> Self {
        id.0
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Report template identifier
///
/// Template ids select the source table in the query stage, so only ASCII
/// letters, digits and underscores are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateId(String);

impl TemplateId {
    /// Creates a new TemplateId
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Template ID cannot be empty".to_string());
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Template ID may only contain letters, digits and '_': {id}"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the template id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Source table name for this template (`dealerSales` -> `dealer_sales`)
    pub fn table_name(&self) -> String {
        camel_to_snake(&self.0)
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TemplateId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TemplateId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TemplateId> for String {
    fn from(id: TemplateId) -> Self {
        id.0
    }
}

/// Inserts `_` between a lowercase letter and a following uppercase letter,
/// then lowercases everything.
fn camel_to_snake(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_lower = false;
    for c in input.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c.to_ascii_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_report_id_valid() {
        let id = ReportId::new("report-123").unwrap();
        assert_eq!(id.as_str(), "report-123");
        assert_eq!(id.to_string(), "report-123");
    }

    #[test]
    fn test_report_id_rejects_empty_and_slash() {
        assert!(ReportId::new("").is_err());
        assert!(ReportId::new("   ").is_err());
        assert!(ReportId::new("exports/r1").is_err());
    }

    #[test]
    fn test_report_id_generate_is_unique() {
        let a = ReportId::generate();
        let b = ReportId::generate();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_report_id_serde_validates() {
        let id: ReportId = serde_json::from_str("\"r-9\"").unwrap();
        assert_eq!(id.as_str(), "r-9");
        assert!(serde_json::from_str::<ReportId>("\"\"").is_err());
    }

    #[test_case("dealerSales", "dealer_sales")]
    #[test_case("monthlyDealerRevenue", "monthly_dealer_revenue")]
    #[test_case("inventory", "inventory")]
    #[test_case("SSEReport", "ssereport")]
    #[test_case("already_snake", "already_snake")]
    fn test_template_table_name(template: &str, expected: &str) {
        let id = TemplateId::new(template).unwrap();
        assert_eq!(id.table_name(), expected);
    }

    #[test]
    fn test_template_id_rejects_sql_fragments() {
        assert!(TemplateId::new("sales; DROP TABLE reports").is_err());
        assert!(TemplateId::new("sales-report").is_err());
        assert!(TemplateId::new("").is_err());
    }
}
