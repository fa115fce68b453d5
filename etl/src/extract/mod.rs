//! Extract stage: one GET to the country API, a raw JSON snapshot on disk,
//! and the reference CSV.
//!
//! ```rust,ignore
//! use country_etl::{extract, PipelineConfig};
//!
//! let (payload, reference) = extract(&PipelineConfig::default())?;
//! println!("{} API records, {} reference rows", payload.records().len(), reference.len());
//! ```

pub mod payload;

use reqwest::blocking::Client;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::config::PipelineConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::logs::{log_progress, log_progress_indent, log_warning};
use crate::parser::parse_csv_file_auto;
use crate::transform::table::Table;

pub use payload::{PageInfo, RawApiPayload};

/// Build the blocking HTTP client.
pub fn build_client(timeout: Option<Duration>) -> ExtractResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ExtractError::Client)
}

/// GET `url` and decode the body as JSON.
///
/// The status code is not checked: any response whose body is JSON is
/// accepted. Non-success statuses are logged as a warning.
pub fn fetch_payload(client: &Client, url: &str) -> ExtractResult<Value> {
    let network = |source: reqwest::Error| ExtractError::Network { url: url.to_string(), source };

    let response = client.get(url).send().map_err(network)?;
    let status = response.status();
    if !status.is_success() {
        log_warning(format!("{} answered HTTP {}, reading body anyway", url, status));
    }
    let body = response.text().map_err(network)?;
    serde_json::from_str(&body).map_err(ExtractError::InvalidJson)
}

/// Write `value` as JSON text to `path`, replacing any existing file.
pub fn save_raw_json(value: &Value, path: &Path) -> ExtractResult<()> {
    let snapshot = |source: std::io::Error| ExtractError::Snapshot { path: path.to_path_buf(), source };
    let text = serde_json::to_string(value).map_err(|e| snapshot(e.into()))?;
    std::fs::write(path, text).map_err(snapshot)
}

/// Read the reference CSV into a table.
pub fn load_reference_csv(path: &Path) -> ExtractResult<Table> {
    let result = parse_csv_file_auto(path)?;
    log_progress_indent(format!("Encoding: {}", result.encoding), 1);
    log_progress_indent(
        format!(
            "{} rows, columns: {}",
            result.table.len(),
            result.table.columns().join(", ")
        ),
        1,
    );
    Ok(result.table)
}

/// Run the extract stage.
///
/// The snapshot is written before the payload shape is checked, so a
/// response that breaks the expected shape is still kept on disk.
pub fn extract(config: &PipelineConfig) -> ExtractResult<(RawApiPayload, Table)> {
    log_progress(format!("🌐 Fetching {}", config.api_url));
    let client = build_client(config.timeout)?;
    let value = fetch_payload(&client, &config.api_url)?;

    save_raw_json(&value, &config.json_savepath)?;
    log_progress(format!("Raw JSON saved to '{}'", config.json_savepath.display()));

    let payload = RawApiPayload::from_value(value)?;
    log_progress(format!("{} country records", payload.records().len()));
    if let Some(info) = payload.page_info() {
        if info.pages > 1 {
            log_warning(format!(
                "Response is page {} of {} ({} of {} records)",
                info.page,
                info.pages,
                payload.records().len(),
                info.total
            ));
        }
    }

    log_progress(format!("📖 Reading {}", config.countries_csv_path.display()));
    let reference = load_reference_csv(&config.countries_csv_path)?;

    Ok((payload, reference))
}
