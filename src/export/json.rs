//! JSON export and lenient JSON import.
//!
//! Import accepts a dataset object (`{"urls": [...]}` or `{"records": [...]}`)
//! or a bare array. Array elements may be record objects or plain URL strings.
//! Missing status codes default to 200 and missing timestamps to the import
//! time; compact CDX timestamps are normalized.

use serde_json::Value;

use crate::config::INGEST_FALLBACK_STATUS;
use crate::error_handling::StoreError;
use crate::models::{Dataset, UrlRecord};
use crate::timestamp;

const STATUS_KEYS: [&str; 3] = ["statuscode", "statusCode", "status_code"];
const TIMESTAMP_KEYS: [&str; 3] = ["timestamp", "observedAt", "observed_at"];

/// Serializes a dataset as pretty-printed JSON.
pub fn dataset_to_json(dataset: &Dataset) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(dataset)?)
}

/// Serializes records as a pretty-printed JSON array of
/// `{url, timestamp, statuscode}` objects.
pub fn records_to_json(records: &[UrlRecord]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parses a JSON import payload into candidate records.
///
/// # Errors
///
/// `StoreError::Import` when the text is not JSON or its top level is neither
/// a dataset object nor an array.
pub fn records_from_json(data: &str) -> Result<Vec<UrlRecord>, StoreError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| StoreError::Import(format!("payload is not valid JSON: {e}")))?;
    records_from_value(&value).ok_or_else(|| {
        StoreError::Import("expected a dataset object with a URL list or a JSON array".into())
    })
}

/// Extracts records from an already-parsed dataset object or array.
///
/// Returns `None` when the value has neither shape.
pub(crate) fn records_from_value(value: &Value) -> Option<Vec<UrlRecord>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("urls").or_else(|| map.get("records")) {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    let now = timestamp::now_canonical();
    Some(
        items
            .iter()
            .filter_map(|item| record_from_value(item, &now))
            .collect(),
    )
}

/// One array element as a record. Elements without a URL are dropped.
fn record_from_value(item: &Value, now: &str) -> Option<UrlRecord> {
    match item {
        Value::String(url) => Some(UrlRecord::new(url.trim(), now, INGEST_FALLBACK_STATUS)),
        Value::Object(map) => {
            let url = map.get("url")?.as_str()?.trim();
            let status_code = STATUS_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(status_from_value)
                .unwrap_or(INGEST_FALLBACK_STATUS);
            let observed_at = TIMESTAMP_KEYS
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|ts| !ts.is_empty())
                .map(timestamp::normalize)
                .unwrap_or_else(|| now.to_string());
            Some(UrlRecord::new(url, observed_at, status_code))
        }
        _ => None,
    }
}

fn status_from_value(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
