//! # Country ETL - World Bank countries merged with a reference table
//!
//! Fetches the World Bank country list, joins it with a local reference CSV
//! on the ISO-2 code and writes one unified CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Country    │────▶│  Extract    │────▶│  Transform  │────▶│    Load     │
//! │  API + CSV  │     │ (snapshot)  │     │ (join/rules)│     │   (CSV)     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use country_etl::{run, PipelineConfig};
//!
//! let summary = run(&PipelineConfig::default())?;
//! println!("Wrote {} countries", summary.output_rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Per-stage error types
//! - [`config`] - Pipeline configuration
//! - [`logs`] - Notices and progress logging
//! - [`parser`] - Reference CSV parsing with encoding detection
//! - [`extract`] - API fetch, raw snapshot, payload validation
//! - [`transform`] - Flattening, reconciliation rules, join, projection
//! - [`load`] - CSV output
//! - [`pipeline`] - End-to-end run

// Core modules
pub mod config;
pub mod error;
pub mod logs;

// Stages
pub mod extract;
pub mod load;
pub mod parser;
pub mod transform;

// Orchestration
pub mod pipeline;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError, CsvError, ErrorKind, ExtractError, LoadError, PipelineError, TransformError,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{load_rules_file, PipelineConfig};

// =============================================================================
// Re-exports - Stages
// =============================================================================

pub use extract::{
    build_client, extract, fetch_payload, load_reference_csv, save_raw_json, PageInfo,
    RawApiPayload,
};

pub use parser::{decode_content, detect_encoding, parse_bytes_auto, parse_csv_file_auto, parse_csv_str};

pub use transform::{
    flatten_records, inner_join, normalize_payload, resolve_collisions, transform,
    transform_default, CollisionRule, OutputColumn, ReconciliationRules, Rename, Side, Table,
};

pub use load::{load, write_csv, LoadReport};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run, RunSummary};
