//! Transform stage: API payload + reference table → output table.
//!
//! ```text
//! payload[1] ──flatten──▶ renames ──┐
//!                                   ├─ inner join on key ─▶ collisions ─▶ projection
//! reference table ──────────────────┘
//! ```

use crate::error::{TransformError, TransformResult};
use crate::extract::RawApiPayload;
use crate::logs::{log_progress, log_progress_indent};

use super::flatten::flatten_records;
use super::join::{inner_join, resolve_collisions};
use super::rules::ReconciliationRules;
use super::table::Table;

/// Flatten the payload records and apply the rules' renames.
///
/// A rename whose source column is absent is skipped; the projection
/// reports whatever is still missing at the end.
pub fn normalize_payload(payload: &RawApiPayload, rules: &ReconciliationRules) -> Table {
    let mut table = flatten_records(payload.records(), &rules.separator);
    for rename in &rules.renames {
        if !table.rename_column(&rename.from, &rename.to) {
            log_progress_indent(format!("field '{}' not present, rename skipped", rename.from), 1);
        }
    }
    table
}

/// Merge the payload with the reference table and project the output columns.
pub fn transform(
    payload: &RawApiPayload,
    reference: &Table,
    rules: &ReconciliationRules,
) -> TransformResult<Table> {
    log_progress("⚙️  Transforming...");
    let normalized = normalize_payload(payload, rules);
    log_progress_indent(
        format!("{} API rows, {} columns", normalized.len(), normalized.columns().len()),
        1,
    );

    let joined = inner_join(
        &normalized,
        reference,
        &rules.join_key,
        (rules.suffixes.0.as_str(), rules.suffixes.1.as_str()),
    )?;
    log_progress_indent(
        format!(
            "{} rows matched on '{}' ({} reference rows)",
            joined.table.len(),
            rules.join_key,
            reference.len()
        ),
        1,
    );

    let mut merged = joined.table;
    resolve_collisions(&mut merged, &joined.overlaps, rules);

    let output = project(&merged, rules)?;
    log_progress(format!("Merged {} rows", output.len()));
    Ok(output)
}

/// [`transform`] with the built-in country rules.
pub fn transform_default(payload: &RawApiPayload, reference: &Table) -> TransformResult<Table> {
    transform(payload, reference, &ReconciliationRules::countries())
}

fn project(merged: &Table, rules: &ReconciliationRules) -> TransformResult<Table> {
    let missing: Vec<String> = rules
        .output
        .iter()
        .filter(|c| c.required && !merged.has_column(&c.name))
        .map(|c| c.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::MissingColumn(missing));
    }
    Ok(merged.select_or_null(&rules.output_names()))
}
