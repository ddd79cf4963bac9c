//! CSV serialization

use super::flatten::flatten_row;
use crate::adapters::database::Row;
use crate::domain::{PipelineError, Result};
use serde_json::Value;

/// Render rows as CSV with a header line
///
/// Rows are flattened first. The header is the union of all columns in
/// first-seen order; a row missing a column gets an empty cell. Strings are
/// written as is, `null` as an empty cell, and everything else as its JSON
/// text.
///
/// # Errors
///
/// Returns an error if `rows` is empty or the writer fails.
pub fn rows_to_csv(rows: &[Row]) -> Result<Vec<u8>> {
    if rows.is_empty() {
        return Err(PipelineError::MalformedPayload(
            "Cannot format an empty row set".to_string(),
        ));
    }

    let flat: Vec<Row> = rows.iter().map(flatten_row).collect();

    let mut headers: Vec<&str> = Vec::new();
    for row in &flat {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &flat {
        writer.write_record(headers.iter().map(|h| cell(row.get(*h))))?;
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::Serialization(format!("Failed to finish CSV: {e}")))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Row> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_nested_record() {
        let csv = rows_to_csv(&rows(json!([{
            "dealerId": "dealer123",
            "date": "2023-01-01",
            "metrics": {"sales": 100, "revenue": 50000, "customers": 75}
        }])))
        .unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "dealerId,date,metrics.sales,metrics.revenue,metrics.customers\n\
             dealer123,2023-01-01,100,50000,75\n"
        );
    }

    #[test]
    fn test_union_of_columns() {
        let csv = rows_to_csv(&rows(json!([
            {"a": 1, "b": null},
            {"c": true, "a": "x,y"}
        ])))
        .unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "a,b,c\n1,,\n\"x,y\",,true\n"
        );
    }

    #[test]
    fn test_empty_rows_rejected() {
        assert!(rows_to_csv(&[]).is_err());
    }
}
