//! Whole-store backup document.
//!
//! ```json
//! {"exportDate": "...", "version": "1.0.0", "totalDomains": 2,
//!  "data": {"example.com": {"domain": ..., "urls": [...], ...}, ...}}
//! ```
//!
//! Restores also accept keys carrying the legacy `wayback_` prefix and skip
//! the `wayback_metadata` entry older backups include.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::json::records_from_value;
use crate::config::{METADATA_KEY, STORE_FORMAT_VERSION};
use crate::error_handling::StoreError;
use crate::models::{Dataset, UrlRecord};
use crate::timestamp;

const LEGACY_KEY_PREFIX: &str = "wayback_";

/// Backup payload as written by `export_all`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub export_date: String,
    pub version: String,
    pub total_domains: usize,
    pub data: BTreeMap<String, Dataset>,
}

impl BackupDocument {
    pub fn new(datasets: Vec<Dataset>) -> Self {
        let data: BTreeMap<String, Dataset> = datasets
            .into_iter()
            .map(|dataset| (dataset.domain.clone(), dataset))
            .collect();
        Self {
            export_date: timestamp::now_canonical(),
            version: STORE_FORMAT_VERSION.to_string(),
            total_domains: data.len(),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A dataset read back from a backup, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredDataset {
    pub domain: String,
    pub records: Vec<UrlRecord>,
    /// `None` when the entry carries no fetch time
    pub fetched_at: Option<i64>,
}

/// Parses a backup document into its datasets.
///
/// # Errors
///
/// `StoreError::Import` when the text is not JSON or has no `data` object.
/// Entries inside `data` that are not datasets are skipped with a warning.
pub fn parse_backup(data: &str) -> Result<Vec<RestoredDataset>, StoreError> {
    let value: Value = serde_json::from_str(data)
        .map_err(|e| StoreError::Import(format!("backup is not valid JSON: {e}")))?;
    let Some(entries) = value.get("data").and_then(Value::as_object) else {
        return Err(StoreError::Import(
            "backup has no \"data\" object".to_string(),
        ));
    };

    let mut restored = Vec::new();
    for (key, entry) in entries {
        let domain = key.strip_prefix(LEGACY_KEY_PREFIX).unwrap_or(key);
        if domain == METADATA_KEY {
            continue;
        }
        let Some(records) = records_from_value(entry) else {
            log::warn!("Skipping backup entry {key:?}: not a dataset");
            continue;
        };
        let fetched_at = ["timestamp", "fetchedAt", "fetched_at"]
            .iter()
            .find_map(|k| entry.get(*k))
            .and_then(Value::as_i64);
        restored.push(RestoredDataset {
            domain: domain.to_string(),
            records,
            fetched_at,
        });
    }
    Ok(restored)
}
