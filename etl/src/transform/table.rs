//! In-memory table shared by every stage.
//!
//! A [`Table`] is an ordered list of column names plus rows of
//! `serde_json::Value` cells. `Value::Null` marks a missing value.

use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Build a table from a header and rows.
    ///
    /// Rows shorter than the header are padded with nulls, longer rows are
    /// truncated.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Position of `name` in the header.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at `row` in column `name`, if both exist.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of column `name`.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Rename column `from` to `to`. Returns false when `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Remove column `name`. Returns false when it is absent.
    pub fn drop_column(&mut self, name: &str) -> bool {
        match self.column_index(name) {
            Some(idx) => {
                self.columns.remove(idx);
                for row in &mut self.rows {
                    row.remove(idx);
                }
                true
            }
            None => false,
        }
    }

    /// Keep only `names`, in that order. Absent columns are filled with nulls.
    pub fn select_or_null(&self, names: &[String]) -> Table {
        let indices: Vec<Option<usize>> = names.iter().map(|n| self.column_index(n)).collect();
        self.gather(names, &indices)
    }

    fn gather(&self, names: &[String], indices: &[Option<usize>]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Table { columns: names.to_vec(), rows }
    }
}

/// Text form of a cell, as written to CSV and compared by joins.
///
/// Strings are verbatim, null is empty, numbers and booleans are JSON
/// literals, arrays and objects are compact JSON.
pub fn cell_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}
