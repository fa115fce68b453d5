//! Transformation module.
//!
//! Turns the API payload and the reference table into the output table:
//! - Table: shared in-memory table model
//! - Flatten: nested JSON records to flat columns
//! - Rules: declarative renames, collisions and output schema
//! - Join: inner equi-join and collision resolution
//! - Merge: the transform stage itself

pub mod flatten;
pub mod join;
pub mod merge;
pub mod rules;
pub mod table;

pub use flatten::{flatten_record, flatten_records};
pub use join::{inner_join, resolve_collisions, JoinOutput};
pub use merge::{normalize_payload, transform, transform_default};
pub use rules::{CollisionRule, OutputColumn, ReconciliationRules, Rename, Side};
pub use table::{cell_text, Table};
