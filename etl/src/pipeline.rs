//! High-level pipeline API: extract → transform → load.
//!
//! # Example
//!
//! ```rust,ignore
//! use country_etl::{run, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&PipelineConfig::default())?;
//!     println!("Wrote {} countries", summary.output_rows);
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::extract::extract;
use crate::load::load;
use crate::transform::merge::transform;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Records in the API response
    pub api_records: usize,
    /// Rows in the reference CSV
    pub reference_rows: usize,
    /// Rows written to the output CSV
    pub output_rows: usize,
    pub json_savepath: PathBuf,
    pub save_path: PathBuf,
    /// The output file existed before this run
    pub replaced: bool,
}

/// Run the pipeline once.
///
/// The first failing stage aborts the run. Files written by earlier stages
/// are left in place.
pub fn run(config: &PipelineConfig) -> PipelineResult<RunSummary> {
    let rules = config.load_rules()?;

    let (payload, reference) = extract(config)?;
    let output = transform(&payload, &reference, &rules)?;
    let report = load(&output, &config.save_path)?;

    Ok(RunSummary {
        api_records: payload.records().len(),
        reference_rows: reference.len(),
        output_rows: report.rows,
        json_savepath: config.json_savepath.clone(),
        save_path: report.path,
        replaced: report.replaced,
    })
}
