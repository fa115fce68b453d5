//! Error types for the country ETL pipeline.
//!
//! One error enum per stage, plus a top-level [`PipelineError`]:
//!
//! - [`CsvError`] - reference CSV parsing errors
//! - [`ExtractError`] - HTTP fetch, raw snapshot and payload shape errors
//! - [`TransformError`] - join and projection errors
//! - [`LoadError`] - output CSV write errors
//! - [`ConfigError`] - reconciliation rules file errors
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! stage boundaries. [`PipelineError::kind`] collapses everything onto the
//! small set of [`ErrorKind`]s reported to the user.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Error kinds
// =============================================================================

/// Coarse failure category of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP request could not be completed.
    Network,
    /// Invalid JSON, unexpected payload shape, or malformed CSV.
    Parse,
    /// The reference CSV does not exist.
    FileNotFound,
    /// A column required by the join or the projection is absent.
    MissingColumn,
    /// A file could not be written.
    Io,
    /// The reconciliation rules file could not be used.
    Config,
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the reference CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input file does not exist.
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be decoded.
    #[error("Failed to decode CSV content: {0}")]
    Encoding(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    Malformed { line: u64, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Extraction Errors
// =============================================================================

/// Errors from the extract stage.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// HTTP client could not be configured.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// HTTP request or body read failed.
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body is not JSON.
    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// JSON is valid but not shaped `[metadata, [record, ...]]`.
    #[error("Unexpected payload shape: {0}")]
    InvalidPayload(String),

    /// Raw JSON snapshot could not be written.
    #[error("Failed to write raw JSON to '{}': {source}", .path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference CSV could not be loaded.
    #[error(transparent)]
    Csv(#[from] CsvError),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors during flattening, joining and projection.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The join key is absent from one of the inputs.
    #[error("Join key '{column}' not found in {side} table")]
    MissingJoinKey { side: &'static str, column: String },

    /// Required output columns are absent after the join.
    #[error("Missing column(s) after join: {}", .0.join(", "))]
    MissingColumn(Vec<String>),
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while writing the output CSV.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be created or written.
    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed.
    #[error("Failed to write CSV to '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors while loading a reconciliation rules file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Rules file could not be read.
    #[error("Failed to read rules file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rules file is not a valid rules document.
    #[error("Invalid rules file '{}': {source}", .path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors, returned by [`crate::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Extract error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CsvError> for PipelineError {
    fn from(err: CsvError) -> Self {
        PipelineError::Extract(ExtractError::Csv(err))
    }
}

impl CsvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CsvError::NotFound(_) => ErrorKind::FileNotFound,
            CsvError::Io { .. } => ErrorKind::Io,
            CsvError::Encoding(_)
            | CsvError::Malformed { .. }
            | CsvError::EmptyFile
            | CsvError::NoHeaders => ErrorKind::Parse,
        }
    }
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Client(_) | ExtractError::Network { .. } => ErrorKind::Network,
            ExtractError::InvalidJson(_) | ExtractError::InvalidPayload(_) => ErrorKind::Parse,
            ExtractError::Snapshot { .. } => ErrorKind::Io,
            ExtractError::Csv(e) => e.kind(),
        }
    }
}

impl PipelineError {
    /// Failure category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Extract(e) => e.kind(),
            PipelineError::Transform(_) => ErrorKind::MissingColumn,
            PipelineError::Load(_) => ErrorKind::Io,
            PipelineError::Config(_) => ErrorKind::Config,
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for extract operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
