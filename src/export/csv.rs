//! CSV export and import.
//!
//! Export writes a `URL,Status Code,Timestamp` header followed by one row per
//! record; fields containing a comma, quote or line break are quoted with
//! embedded quotes doubled. Import is lenient: an optional header row, missing
//! status (200) and timestamp (import time) columns, and unreadable rows are
//! skipped rather than failing the whole file.

use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};

use crate::app::is_valid_archive_url;
use crate::config::INGEST_FALLBACK_STATUS;
use crate::dedup::parse_status;
use crate::error_handling::StoreError;
use crate::models::{Dataset, UrlRecord};
use crate::timestamp;

/// Header row of CSV exports.
pub const CSV_HEADER: [&str; 3] = ["URL", "Status Code", "Timestamp"];

/// Serializes a dataset as CSV.
pub fn dataset_to_csv(dataset: &Dataset) -> Result<String, StoreError> {
    records_to_csv(&dataset.records)
}

/// Serializes records as CSV, header first.
pub fn records_to_csv(records: &[UrlRecord]) -> Result<String, StoreError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.url.as_str(),
            record.status_code.to_string().as_str(),
            record.observed_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parses CSV rows into candidate records.
///
/// The first row is treated as a header when its first field is not a URL but
/// mentions one (`URL`, `url`, `Original URL`, ...).
pub fn records_from_csv(data: &str) -> Vec<UrlRecord> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    let now = timestamp::now_canonical();
    let mut records = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                log::debug!("Skipping unreadable CSV row {}: {e}", index + 1);
                continue;
            }
        };

        let url = row.get(0).unwrap_or_default();
        if index == 0 && is_header(url) {
            continue;
        }
        if url.is_empty() {
            continue;
        }

        let status_code = row
            .get(1)
            .map(|s| parse_status(s, INGEST_FALLBACK_STATUS))
            .unwrap_or(INGEST_FALLBACK_STATUS);
        let observed_at = row
            .get(2)
            .filter(|ts| !ts.is_empty())
            .map(timestamp::normalize)
            .unwrap_or_else(|| now.clone());

        records.push(UrlRecord::new(url, observed_at, status_code));
    }

    records
}

fn is_header(first_field: &str) -> bool {
    !is_valid_archive_url(first_field) && first_field.to_lowercase().contains("url")
}
