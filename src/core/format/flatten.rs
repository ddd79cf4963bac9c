//! Row flattening
//!
//! Nested objects become dot-separated column names and array elements get
//! an index suffix:
//!
//! - `{"metrics": {"sales": 1}}` → `metrics.sales`
//! - `{"tags": ["a", "b"]}` → `tags[0]`, `tags[1]`

use crate::adapters::database::Row;
use serde_json::Value;

/// Flatten one row, keeping first-seen key order
pub fn flatten_row(row: &Row) -> Row {
    let mut result = Row::new();
    for (key, value) in row {
        flatten_value(value, key.clone(), &mut result);
    }
    result
}

fn flatten_value(value: &Value, prefix: String, result: &mut Row) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, val) in map {
                flatten_value(val, format!("{prefix}.{key}"), result);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (idx, val) in arr.iter().enumerate() {
                flatten_value(val, format!("{prefix}[{idx}]"), result);
            }
        }
        _ => {
            result.insert(prefix, value.clone());
        }
    }
}
