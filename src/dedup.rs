//! "Most recent wins" merge of raw CDX rows.
//!
//! Rows are keyed by the lowercased URL. For each key the row with the greatest
//! normalized timestamp is kept; on equal timestamps the first row seen stays.
//! The kept record carries the URL in the casing of the winning row.

use std::collections::HashMap;

use clap::ValueEnum;

use crate::config::{INGEST_FALLBACK_STATUS, RAW_FALLBACK_STATUS};
use crate::models::{RawTriple, UrlRecord};
use crate::timestamp;

/// Output ordering of merged records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RecordOrder {
    /// Order in which each URL was first seen in the input
    #[default]
    FirstSeen,
    /// Lexicographic by URL (stable display order)
    #[value(name = "url")]
    UrlAscending,
    /// Most recent observation first
    #[value(name = "newest")]
    NewestFirst,
}

/// Options for [`merge`].
///
/// Callers state which status to use for an unparseable status field: ingestion
/// assumes the capture succeeded (200), raw browsing keeps an explicit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub fallback_status: u16,
    pub order: RecordOrder,
}

impl MergeOptions {
    /// Options used when building a dataset for the store.
    pub fn ingest() -> Self {
        Self {
            fallback_status: INGEST_FALLBACK_STATUS,
            order: RecordOrder::UrlAscending,
        }
    }

    /// Options used when inspecting raw index rows.
    pub fn raw() -> Self {
        Self {
            fallback_status: RAW_FALLBACK_STATUS,
            order: RecordOrder::NewestFirst,
        }
    }

    pub fn with_order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }
}

/// Merges raw triples into one record per case-insensitive URL.
///
/// # Arguments
///
/// * `triples` - Parsed rows, typically straight from [`crate::parse::parse`]
/// * `options` - Status fallback and output ordering
///
/// # Returns
///
/// The merged records in the requested order.
pub fn merge<I>(triples: I, options: MergeOptions) -> Vec<UrlRecord>
where
    I: IntoIterator<Item = RawTriple>,
{
    let records = triples.into_iter().map(|triple| UrlRecord {
        observed_at: timestamp::normalize(&triple.timestamp_raw),
        status_code: parse_status(&triple.status_raw, options.fallback_status),
        url: triple.url_raw,
    });
    merge_records(records, options.order)
}

/// Collapses already-built records to one per case-insensitive URL.
///
/// Same rule as [`merge`]: the greatest `observed_at` wins, the first record
/// seen wins a tie.
pub fn merge_records<I>(records: I, order: RecordOrder) -> Vec<UrlRecord>
where
    I: IntoIterator<Item = UrlRecord>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<UrlRecord> = Vec::new();

    for candidate in records {
        let key = candidate.dedup_key();
        match index.get(&key) {
            Some(&slot) => {
                if candidate.observed_at > merged[slot].observed_at {
                    merged[slot] = candidate;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    log::debug!("Merged rows into {} unique URLs", merged.len());
    sort_records(&mut merged, order);
    merged
}

/// Sorts records in place. `FirstSeen` leaves the slice untouched.
pub fn sort_records(records: &mut [UrlRecord], order: RecordOrder) {
    match order {
        RecordOrder::FirstSeen => {}
        RecordOrder::UrlAscending => records.sort_by(|a, b| {
            a.url
                .cmp(&b.url)
                .then_with(|| b.observed_at.cmp(&a.observed_at))
        }),
        RecordOrder::NewestFirst => records.sort_by(|a, b| {
            b.observed_at
                .cmp(&a.observed_at)
                .then_with(|| a.url.cmp(&b.url))
        }),
    }
}

/// Parses a status field, falling back when it is not a number (CDX uses `-`
/// for captures without a status).
pub fn parse_status(raw: &str, fallback: u16) -> u16 {
    raw.trim().parse::<u16>().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn triple(ts: &str, url: &str, status: &str) -> RawTriple {
        RawTriple::new(ts, url, status)
    }

    #[test]
    fn test_merge_most_recent_wins_across_case() {
        let merged = merge(
            vec![
                triple("20230101120000", "http://example.com/a", "200"),
                triple("20230601000000", "http://EXAMPLE.com/A", "301"),
            ],
            MergeOptions::ingest(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].status_code, 301);
        assert_eq!(merged[0].observed_at, "2023-06-01T00:00:00Z");
        assert_eq!(merged[0].url, "http://EXAMPLE.com/A");
    }

    #[test]
    fn test_merge_older_row_after_newer_is_ignored() {
        let merged = merge(
            vec![
                triple("20230601000000", "http://example.com/a", "301"),
                triple("20230101120000", "http://example.com/A", "200"),
            ],
            MergeOptions::ingest(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].status_code, 301);
        assert_eq!(merged[0].url, "http://example.com/a");
    }

    #[test]
    fn test_merge_equal_timestamps_keep_first() {
        let merged = merge(
            vec![
                triple("20230101120000", "http://example.com/a", "200"),
                triple("20230101120000", "http://example.com/a", "500"),
            ],
            MergeOptions::ingest(),
        );
        assert_eq!(merged[0].status_code, 200);
    }

    #[test]
    fn test_status_fallback_per_caller() {
        let rows = vec![triple("20230101120000", "http://example.com/a", "-")];
        assert_eq!(merge(rows.clone(), MergeOptions::ingest())[0].status_code, 200);
        assert_eq!(merge(rows, MergeOptions::raw())[0].status_code, 0);
    }

    #[test]
    fn test_merge_orderings() {
        let rows = vec![
            triple("20210101000000", "http://example.com/b", "200"),
            triple("20230101000000", "http://example.com/c", "200"),
            triple("20220101000000", "http://example.com/a", "200"),
        ];

        let first_seen = merge(
            rows.clone(),
            MergeOptions::ingest().with_order(RecordOrder::FirstSeen),
        );
        let urls: Vec<_> = first_seen.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://example.com/b", "http://example.com/c", "http://example.com/a"]
        );

        let by_url = merge(rows.clone(), MergeOptions::ingest());
        let urls: Vec<_> = by_url.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://example.com/a", "http://example.com/b", "http://example.com/c"]
        );

        let newest = merge(rows, MergeOptions::raw());
        let urls: Vec<_> = newest.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://example.com/c", "http://example.com/a", "http://example.com/b"]
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("404", 200), 404);
        assert_eq!(parse_status(" 301 ", 200), 301);
        assert_eq!(parse_status("-", 200), 200);
        assert_eq!(parse_status("", 0), 0);
        assert_eq!(parse_status("99999", 0), 0);
    }

    #[test]
    fn test_merge_records_dedups_built_records() {
        let merged = merge_records(
            vec![
                UrlRecord::new("http://example.com/x", "2020-01-01T00:00:00Z", 200),
                UrlRecord::new("http://example.com/y", "2020-01-01T00:00:00Z", 200),
                UrlRecord::new("HTTP://EXAMPLE.COM/X", "2021-01-01T00:00:00Z", 404),
            ],
            RecordOrder::FirstSeen,
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].url, "HTTP://EXAMPLE.COM/X");
        assert_eq!(merged[0].status_code, 404);
        assert_eq!(merged[1].url, "http://example.com/y");
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge(Vec::new(), MergeOptions::ingest()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_later_timestamp_always_wins(
            t1 in 19960101000000u64..20300101000000u64,
            delta in 1u64..1_000_000u64,
            upper_first in any::<bool>(),
            path in "[a-z]{1,12}",
        ) {
            let t2 = t1 + delta;
            let older = triple(&t1.to_string(), &format!("http://example.com/{path}"), "200");
            let newer = triple(&t2.to_string(), &format!("http://EXAMPLE.com/{path}"), "302");
            let rows = if upper_first { vec![newer, older] } else { vec![older, newer] };

            let merged = merge(rows, MergeOptions::ingest());
            prop_assert_eq!(merged.len(), 1);
            prop_assert_eq!(merged[0].status_code, 302);
            prop_assert_eq!(&merged[0].observed_at, &timestamp::normalize(&t2.to_string()));
        }
    }
}
