//! Record shapes shared by the parser, deduplicator, filter engine and store.
//!
//! Serialized field names follow the exported file format (`url`, `timestamp`,
//! `statuscode` for records; `urls` and `timestamp` for datasets). The spelled
//! out names (`observedAt`, `statusCode`, `records`, `fetchedAt`) are accepted
//! as aliases on import.

use serde::{Deserialize, Serialize};

/// One archived URL observation after deduplication.
///
/// `url` keeps the original casing as received from the index; the lowercased
/// form is only ever used as a lookup key (see [`UrlRecord::dedup_key`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// Absolute http/https URL, original casing
    pub url: String,
    /// Canonical ISO-8601 timestamp (`YYYY-MM-DDTHH:MM:SSZ`)
    #[serde(rename = "timestamp", alias = "observedAt", alias = "observed_at")]
    pub observed_at: String,
    /// HTTP status recorded by the archive
    #[serde(rename = "statuscode", alias = "statusCode", alias = "status_code")]
    pub status_code: u16,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, observed_at: impl Into<String>, status_code: u16) -> Self {
        Self {
            url: url.into(),
            observed_at: observed_at.into(),
            status_code,
        }
    }

    /// Case-insensitive identity of the record.
    pub fn dedup_key(&self) -> String {
        self.url.to_lowercase()
    }
}

/// A row as it came off the wire, before validation or interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawTriple {
    pub timestamp_raw: String,
    pub url_raw: String,
    pub status_raw: String,
}

impl RawTriple {
    pub fn new(
        timestamp_raw: impl Into<String>,
        url_raw: impl Into<String>,
        status_raw: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_raw: timestamp_raw.into(),
            url_raw: url_raw.into(),
            status_raw: status_raw.into(),
        }
    }
}

/// The full set of deduplicated records stored for one domain.
///
/// `count` always equals `records.len()`; construct through [`Dataset::new`]
/// to keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub domain: String,
    #[serde(rename = "urls", alias = "records")]
    pub records: Vec<UrlRecord>,
    /// Epoch milliseconds of the ingestion (or import) that produced the dataset
    #[serde(rename = "timestamp", alias = "fetchedAt", alias = "fetched_at")]
    pub fetched_at: i64,
    #[serde(default)]
    pub count: usize,
}

impl Dataset {
    pub fn new(domain: impl Into<String>, records: Vec<UrlRecord>, fetched_at: i64) -> Self {
        let count = records.len();
        Self {
            domain: domain.into(),
            records,
            fetched_at,
            count,
        }
    }
}
