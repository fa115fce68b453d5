//! Flatten nested JSON records into a [`Table`].
//!
//! ```text
//! {"id": "USA", "region": {"id": "NAC", "value": "North America"}}
//!            ↓
//! id | region.id | region.value
//! ```
//!
//! Nested objects are walked to any depth and their keys joined with the
//! separator. Arrays and scalars are leaves. An empty nested object yields
//! no column.

use serde_json::{Map, Value};
use std::collections::HashMap;

use super::table::Table;

/// Separator between nested key segments.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Flatten one record into `(path, value)` pairs, in key order.
pub fn flatten_record(record: &Map<String, Value>, separator: &str) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    flatten_into(record, None, separator, &mut out);
    out
}

fn flatten_into(
    obj: &Map<String, Value>,
    prefix: Option<&str>,
    separator: &str,
    out: &mut Vec<(String, Value)>,
) {
    for (key, value) in obj {
        let path = match prefix {
            Some(p) => format!("{}{}{}", p, separator, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&path), separator, out),
            leaf => out.push((path, leaf.clone())),
        }
    }
}

/// Flatten a list of records into a table.
///
/// Columns appear in order of first occurrence across all records; a key
/// missing from a record is null in that row.
pub fn flatten_records(records: &[Map<String, Value>], separator: &str) -> Table {
    let flat: Vec<Vec<(String, Value)>> = records
        .iter()
        .map(|r| flatten_record(r, separator))
        .collect();

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in &flat {
        for (path, _) in row {
            if !positions.contains_key(path) {
                positions.insert(path.clone(), columns.len());
                columns.push(path.clone());
            }
        }
    }

    let width = columns.len();
    let mut table = Table::new(columns);
    for row in flat {
        let mut cells = vec![Value::Null; width];
        for (path, value) in row {
            cells[positions[&path]] = value;
        }
        table.push_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_nested_keys_joined() {
        let record = obj(json!({
            "iso2Code": "US",
            "region": {"id": "NAC", "value": "North America"}
        }));
        let flat = flatten_record(&record, DEFAULT_SEPARATOR);
        let keys: Vec<&str> = flat.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["iso2Code", "region.id", "region.value"]);
        assert_eq!(flat[2].1, json!("North America"));
    }

    #[test]
    fn test_deep_nesting() {
        let record = obj(json!({"a": {"b": {"c": 1}}}));
        let flat = flatten_record(&record, DEFAULT_SEPARATOR);
        assert_eq!(flat, vec![("a.b.c".to_string(), json!(1))]);
    }

    #[test]
    fn test_arrays_and_empty_objects() {
        let record = obj(json!({"tags": ["x", "y"], "empty": {}, "n": null}));
        let flat = flatten_record(&record, DEFAULT_SEPARATOR);
        assert_eq!(
            flat,
            vec![
                ("tags".to_string(), json!(["x", "y"])),
                ("n".to_string(), Value::Null),
            ]
        );
    }

    #[test]
    fn test_union_of_columns() {
        let records = vec![
            obj(json!({"iso2Code": "US", "name": "United States"})),
            obj(json!({"iso2Code": "FR", "capitalCity": "Paris"})),
        ];
        let table = flatten_records(&records, DEFAULT_SEPARATOR);
        assert_eq!(table.columns(), &["iso2Code", "name", "capitalCity"]);
        assert_eq!(table.get(0, "capitalCity"), Some(&Value::Null));
        assert_eq!(table.get(1, "name"), Some(&Value::Null));
        assert_eq!(table.get(1, "capitalCity"), Some(&json!("Paris")));
    }

    #[test]
    fn test_empty_record_list() {
        let table = flatten_records(&[], DEFAULT_SEPARATOR);
        assert!(table.columns().is_empty());
        assert!(table.is_empty());
    }
}
