//! Plain-text export and import: one URL per line.

use crate::config::INGEST_FALLBACK_STATUS;
use crate::models::{Dataset, UrlRecord};
use crate::timestamp;

/// URLs in stored order, newline separated.
pub fn dataset_to_text(dataset: &Dataset) -> String {
    records_to_text(&dataset.records)
}

pub fn records_to_text(records: &[UrlRecord]) -> String {
    records
        .iter()
        .map(|record| record.url.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Non-empty trimmed lines as records with status 200 and the import time.
pub fn records_from_text(data: &str) -> Vec<UrlRecord> {
    let now = timestamp::now_canonical();
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|url| UrlRecord::new(url, now.as_str(), INGEST_FALLBACK_STATUS))
        .collect()
}
