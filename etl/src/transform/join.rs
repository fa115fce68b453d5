//! Inner equi-join of two tables and collision resolution.
//!
//! Output layout follows the usual relational merge convention: all left
//! columns, then right columns without the key. A non-key column present on
//! both sides is emitted twice, suffixed with the left and right suffix.
//!
//! Rows keep left order; each left row is followed by its matches in right
//! order. Duplicate keys fan out, null keys never match.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::rules::{ReconciliationRules, Side};
use super::table::{cell_text, Table};
use crate::error::{TransformError, TransformResult};
use crate::logs::log_warning;

/// Result of [`inner_join`].
#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub table: Table,
    /// Base names of the non-key columns both inputs carried
    pub overlaps: Vec<String>,
}

/// Join `left` and `right` on `key`, keeping only rows whose key exists in both.
pub fn inner_join(
    left: &Table,
    right: &Table,
    key: &str,
    suffixes: (&str, &str),
) -> TransformResult<JoinOutput> {
    let left_key = left.column_index(key).ok_or_else(|| TransformError::MissingJoinKey {
        side: "left",
        column: key.to_string(),
    })?;
    let right_key = right.column_index(key).ok_or_else(|| TransformError::MissingJoinKey {
        side: "right",
        column: key.to_string(),
    })?;

    let right_names: HashSet<&str> = right.columns().iter().map(String::as_str).collect();

    let overlaps: Vec<String> = left
        .columns()
        .iter()
        .filter(|c| c.as_str() != key && right_names.contains(c.as_str()))
        .cloned()
        .collect();
    let overlap_set: HashSet<&str> = overlaps.iter().map(String::as_str).collect();

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .map(|c| {
            if overlap_set.contains(c.as_str()) {
                format!("{}{}", c, suffixes.0)
            } else {
                c.clone()
            }
        })
        .collect();
    let right_keep: Vec<usize> = (0..right.columns().len()).filter(|&i| i != right_key).collect();
    for &i in &right_keep {
        let name = &right.columns()[i];
        if overlap_set.contains(name.as_str()) {
            columns.push(format!("{}{}", name, suffixes.1));
        } else {
            columns.push(name.clone());
        }
    }

    let index = build_index(right, right_key);
    warn_duplicates("left", left, left_key);
    warn_duplicates("right", right, right_key);

    let mut table = Table::new(columns);
    for left_row in left.rows() {
        let Some(k) = join_key(&left_row[left_key]) else {
            continue;
        };
        let Some(matches) = index.get(k.as_str()) else {
            continue;
        };
        for &r in matches {
            let right_row = &right.rows()[r];
            let mut row: Vec<Value> = left_row.clone();
            row.extend(right_keep.iter().map(|&i| right_row[i].clone()));
            table.push_row(row);
        }
    }

    Ok(JoinOutput { table, overlaps })
}

/// Key text of a cell. Nulls have no key.
fn join_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(cell_text(other).into_owned()),
    }
}

fn build_index(table: &Table, key: usize) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(k) = join_key(&row[key]) {
            index.entry(k).or_default().push(i);
        }
    }
    index
}

fn warn_duplicates(side: &str, table: &Table, key: usize) {
    let mut seen = HashSet::new();
    let duplicates: HashSet<String> = table
        .rows()
        .iter()
        .filter_map(|row| join_key(&row[key]))
        .filter(|k| !seen.insert(k.clone()))
        .collect();
    if !duplicates.is_empty() {
        let mut sample: Vec<&String> = duplicates.iter().collect();
        sample.sort();
        let sample: Vec<&str> = sample.iter().take(5).map(|s| s.as_str()).collect();
        log_warning(format!(
            "{} duplicate join key(s) in {} table ({}), rows will fan out",
            duplicates.len(),
            side,
            sample.join(", ")
        ));
    }
}

/// Restore unsuffixed names for overlapping columns.
///
/// For every overlap the side chosen by the rules takes the base name and
/// the other suffixed column is dropped.
pub fn resolve_collisions(table: &mut Table, overlaps: &[String], rules: &ReconciliationRules) {
    let (left_suffix, right_suffix) = (&rules.suffixes.0, &rules.suffixes.1);
    for column in overlaps {
        let left_name = format!("{}{}", column, left_suffix);
        let right_name = format!("{}{}", column, right_suffix);
        let (keep, drop) = match rules.keep_side(column) {
            Side::Left => (left_name, right_name),
            Side::Right => (right_name, left_name),
        };
        table.drop_column(&drop);
        table.rename_column(&keep, column);
    }
}
