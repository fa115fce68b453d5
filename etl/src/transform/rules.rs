//! Reconciliation rules
//!
//! Declares how the flattened API table and the reference CSV are brought
//! onto one schema: field renames, the join key and suffixes, which side
//! wins when both inputs carry the same column, and the output columns.
//! Rules are plain serde data and can be stored as JSON.

use serde::{Deserialize, Serialize};

/// Side of the join a value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// API (JSON-derived) table.
    Left,
    /// Reference CSV table.
    Right,
}

/// Rename of one flattened API field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// Which side keeps the unsuffixed name for a column both inputs carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionRule {
    pub column: String,
    pub keep: Side,
}

/// One column of the output schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    pub name: String,
    /// Absent optional columns are written blank instead of failing.
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Complete set of rules for one transform run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationRules {
    /// Separator used when flattening nested API fields
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Flattened API field renames, applied in order
    #[serde(default)]
    pub renames: Vec<Rename>,

    /// Column both tables are joined on
    #[serde(default = "default_join_key")]
    pub join_key: String,

    /// Suffixes appended to overlapping columns (left, right)
    #[serde(default = "default_suffixes")]
    pub suffixes: (String, String),

    /// Explicit collision resolutions
    #[serde(default)]
    pub collisions: Vec<CollisionRule>,

    /// Side kept for overlapping columns without an explicit rule
    #[serde(default = "default_side")]
    pub default_side: Side,

    /// Output columns, in order
    pub output: Vec<OutputColumn>,
}

fn default_separator() -> String {
    super::flatten::DEFAULT_SEPARATOR.to_string()
}

fn default_join_key() -> String {
    "iso2".to_string()
}

fn default_suffixes() -> (String, String) {
    ("_x".to_string(), "_y".to_string())
}

fn default_side() -> Side {
    Side::Left
}

/// World Bank field renames.
const COUNTRY_RENAMES: &[(&str, &str)] = &[
    ("iso2Code", "iso2"),
    ("name", "country"),
    ("capitalCity", "capital"),
    ("region.value", "region_value"),
    ("incomeLevel.value", "income_level"),
    ("lendingType.value", "lending_type"),
];

/// Overlapping columns and the side that keeps them. Names and capitals
/// come from the API; the reference file owns geography and statistics.
const COUNTRY_COLLISIONS: &[(&str, Side)] = &[
    ("country", Side::Left),
    ("capital", Side::Left),
    ("continents", Side::Right),
    ("longitude", Side::Right),
    ("latitude", Side::Right),
    ("area", Side::Right),
    ("population", Side::Right),
];

/// Output header of the merged country file. `id` may be absent.
const COUNTRY_OUTPUT: &[(&str, bool)] = &[
    ("id", false),
    ("iso2", true),
    ("country", true),
    ("capital", true),
    ("region_value", true),
    ("continents", true),
    ("longitude", true),
    ("latitude", true),
    ("income_level", true),
    ("lending_type", true),
    ("area", true),
    ("population", true),
];

impl ReconciliationRules {
    /// Built-in rules for World Bank countries joined with `all_countries.csv`.
    pub fn countries() -> Self {
        Self {
            separator: default_separator(),
            renames: COUNTRY_RENAMES
                .iter()
                .map(|(from, to)| Rename { from: from.to_string(), to: to.to_string() })
                .collect(),
            join_key: default_join_key(),
            suffixes: default_suffixes(),
            collisions: COUNTRY_COLLISIONS
                .iter()
                .map(|(column, keep)| CollisionRule { column: column.to_string(), keep: *keep })
                .collect(),
            default_side: Side::Left,
            output: COUNTRY_OUTPUT
                .iter()
                .map(|(name, required)| OutputColumn { name: name.to_string(), required: *required })
                .collect(),
        }
    }

    /// Parse rules from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Side kept for an overlapping column.
    pub fn keep_side(&self, column: &str) -> Side {
        self.collisions
            .iter()
            .find(|r| r.column == column)
            .map(|r| r.keep)
            .unwrap_or(self.default_side)
    }

    /// Output column names, in order.
    pub fn output_names(&self) -> Vec<String> {
        self.output.iter().map(|c| c.name.clone()).collect()
    }
}

impl Default for ReconciliationRules {
    fn default() -> Self {
        Self::countries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_output_order() {
        let rules = ReconciliationRules::countries();
        assert_eq!(
            rules.output_names().join(","),
            "id,iso2,country,capital,region_value,continents,longitude,latitude,income_level,lending_type,area,population"
        );
        assert!(!rules.output[0].required);
        assert!(rules.output[1..].iter().all(|c| c.required));
    }

    #[test]
    fn test_country_collision_sides() {
        let rules = ReconciliationRules::countries();
        assert_eq!(rules.keep_side("country"), Side::Left);
        assert_eq!(rules.keep_side("capital"), Side::Left);
        for column in ["continents", "longitude", "latitude", "area", "population"] {
            assert_eq!(rules.keep_side(column), Side::Right, "{column}");
        }
    }

    #[test]
    fn test_keep_side_falls_back_to_default() {
        let mut rules = ReconciliationRules::countries();
        rules.collisions.retain(|r| r.column != "latitude");
        assert_eq!(rules.keep_side("latitude"), Side::Left);
        assert_eq!(rules.keep_side("anything"), Side::Left);
        rules.default_side = Side::Right;
        assert_eq!(rules.keep_side("anything"), Side::Right);
        assert_eq!(rules.keep_side("country"), Side::Left);
    }

    #[test]
    fn test_json_defaults() {
        let rules = ReconciliationRules::from_json(
            r#"{
                "renames": [{"from": "iso2Code", "to": "iso2"}],
                "output": [{"name": "iso2"}, {"name": "id", "required": false}]
            }"#,
        )
        .unwrap();
        assert_eq!(rules.join_key, "iso2");
        assert_eq!(rules.separator, ".");
        assert_eq!(rules.suffixes, ("_x".to_string(), "_y".to_string()));
        assert_eq!(rules.default_side, Side::Left);
        assert!(rules.output[0].required);
        assert!(!rules.output[1].required);
    }

    #[test]
    fn test_json_reload() {
        let rules = ReconciliationRules::countries();
        let json = rules.to_json().unwrap();
        assert!(json.contains("\"keep\": \"left\""));
        assert!(json.contains("\"keep\": \"right\""));
        assert_eq!(ReconciliationRules::from_json(&json).unwrap(), rules);
    }
}
