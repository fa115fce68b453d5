//! Shape of the country API response.
//!
//! The World Bank API answers with `[metadata, [record, ...]]`. On a bad
//! request it answers with a one-element array holding a `message` list.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ExtractError, ExtractResult};

/// Decoded API response: pagination metadata plus the country records.
#[derive(Debug, Clone, PartialEq)]
pub struct RawApiPayload {
    metadata: Value,
    records: Vec<Map<String, Value>>,
}

/// Pagination block of the response metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub pages: u64,
    pub per_page: u64,
    pub total: u64,
}

/// API error envelope entry
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

impl RawApiPayload {
    /// Validate a decoded response and split it into metadata and records.
    pub fn from_value(value: Value) -> ExtractResult<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(ExtractError::InvalidPayload(format!(
                    "expected a JSON array, got {}",
                    type_name(&other)
                )))
            }
        };

        if items.len() != 2 {
            if let Some(message) = items.first().and_then(api_error_message) {
                return Err(ExtractError::InvalidPayload(format!("API error: {}", message)));
            }
            return Err(ExtractError::InvalidPayload(format!(
                "expected 2 elements [metadata, records], got {}",
                items.len()
            )));
        }

        let mut items = items.into_iter();
        let metadata = items.next().unwrap_or(Value::Null);
        let records = match items.next() {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(ExtractError::InvalidPayload(format!(
                    "element 1 must be an array of records, got {}",
                    type_name(&other)
                )))
            }
            None => Vec::new(),
        };

        let records = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match record {
                Value::Object(map) => Ok(map),
                other => Err(ExtractError::InvalidPayload(format!(
                    "record {} is not an object ({})",
                    i,
                    type_name(&other)
                ))),
            })
            .collect::<ExtractResult<Vec<_>>>()?;

        Ok(Self { metadata, records })
    }

    /// Element 0 of the response.
    pub fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Element 1 of the response.
    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    /// Pagination counters, when the metadata carries them.
    ///
    /// The API mixes numbers and numeric strings (`"per_page": "50"`).
    pub fn page_info(&self) -> Option<PageInfo> {
        let meta = self.metadata.as_object()?;
        let field = |name: &str| -> Option<u64> {
            match meta.get(name)? {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        };
        Some(PageInfo {
            page: field("page")?,
            pages: field("pages")?,
            per_page: field("per_page")?,
            total: field("total")?,
        })
    }
}

/// Text of an API error envelope `{"message": [{"key": .., "value": ..}]}`.
fn api_error_message(value: &Value) -> Option<String> {
    let messages: Vec<ApiMessage> = serde_json::from_value(value.get("message")?.clone()).ok()?;
    let parts: Vec<String> = messages
        .into_iter()
        .filter_map(|m| match (m.key, m.value) {
            (Some(k), Some(v)) => Some(format!("{}: {}", k, v)),
            (None, Some(v)) | (Some(v), None) => Some(v),
            (None, None) => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
