//! CDX response parsing.
//!
//! Turns the raw body of a CDX query into `RawTriple`s. The index answers in
//! several encodings depending on the server and the `output` parameter:
//!
//! - a single JSON array-of-arrays document
//! - newline-delimited JSON, one array per line
//! - newline-delimited whitespace-separated fields (the legacy plain format)
//!
//! The whole body is tried as one JSON document first. If that fails, every
//! line goes through the [`line`] parser chain on its own, so one corrupt line
//! only loses that line. Rows with fewer than three fields or with a URL that
//! is not an absolute http/https URL are dropped and counted, never reported
//! as an error.

mod line;

pub use line::RowEncoding;

use log::debug;
use serde_json::Value;

use crate::app::is_valid_archive_url;
use crate::models::RawTriple;

/// Literal first field of the header row the CDX server sends with `output=json`.
const HEADER_TOKEN: &str = "timestamp";

/// How the response body as a whole was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Blank body
    Empty,
    /// The body parsed as one JSON document
    JsonDocument,
    /// The body was decoded line by line
    LineDelimited,
}

/// Result of parsing a response body.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    /// Valid rows, in response order
    pub triples: Vec<RawTriple>,
    /// Document-level encoding
    pub encoding: Encoding,
    /// Data rows seen (header excluded)
    pub rows_seen: usize,
    /// Rows dropped for too few fields or an invalid URL
    pub rows_dropped: usize,
}

impl ParsedResponse {
    fn empty(encoding: Encoding) -> Self {
        Self {
            triples: Vec::new(),
            encoding,
            rows_seen: 0,
            rows_dropped: 0,
        }
    }
}

/// Parses a CDX response body into raw triples.
///
/// Never fails: an empty or unrecognized body yields an empty sequence.
pub fn parse(raw: &str) -> Vec<RawTriple> {
    parse_response(raw).triples
}

/// Parses a CDX response body and reports how it was decoded.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let body = raw.trim_start_matches('\u{feff}').trim();
    if body.is_empty() {
        return ParsedResponse::empty(Encoding::Empty);
    }

    let (encoding, rows) = match serde_json::from_str::<Value>(body) {
        Ok(document) => (Encoding::JsonDocument, rows_from_document(document)),
        Err(_) => (Encoding::LineDelimited, rows_from_lines(body)),
    };

    let response = collect_triples(encoding, rows);
    debug!(
        "Parsed CDX response ({:?}): {} rows, {} kept, {} dropped",
        response.encoding,
        response.rows_seen,
        response.triples.len(),
        response.rows_dropped
    );
    response
}

/// Extracts rows from a body that parsed as a single JSON value.
fn rows_from_document(document: Value) -> Vec<Vec<String>> {
    let items = match document {
        Value::Array(items) => items,
        // Objects, strings, numbers: not a CDX payload
        _ => return Vec::new(),
    };

    // A one-line NDJSON body is a single flat array: treat it as one row,
    // unless its strings are themselves whitespace-separated rows.
    let is_flat = items.iter().all(|item| !item.is_array() && !item.is_object());
    let has_plain_rows = items
        .iter()
        .any(|item| matches!(item, Value::String(s) if s.split_whitespace().nth(1).is_some()));
    if !items.is_empty() && is_flat && !has_plain_rows {
        return vec![items.iter().map(line::value_to_field).collect()];
    }

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Array(fields) => Some(fields.iter().map(line::value_to_field).collect()),
            Value::String(s) => Some(s.split_whitespace().map(str::to_string).collect()),
            _ => None,
        })
        .collect()
}

/// Extracts rows from a body that did not parse as one JSON document.
fn rows_from_lines(body: &str) -> Vec<Vec<String>> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(line::parse_line)
        .map(|(_, fields)| fields)
        .collect()
}

/// Skips the header row, validates the rest and builds triples.
fn collect_triples(encoding: Encoding, rows: Vec<Vec<String>>) -> ParsedResponse {
    let mut rows = rows.into_iter().peekable();
    if let Some(first) = rows.peek() {
        if first.first().map(String::as_str) == Some(HEADER_TOKEN) {
            rows.next();
        }
    }

    let mut response = ParsedResponse::empty(encoding);
    for fields in rows {
        response.rows_seen += 1;
        match triple_from_fields(fields) {
            Some(triple) => response.triples.push(triple),
            None => response.rows_dropped += 1,
        }
    }
    response
}

fn triple_from_fields(fields: Vec<String>) -> Option<RawTriple> {
    if fields.len() < 3 {
        return None;
    }
    let mut fields = fields.into_iter();
    let timestamp_raw = fields.next()?;
    let url_raw = fields.next()?;
    let status_raw = fields.next()?;
    if !is_valid_archive_url(&url_raw) {
        return None;
    }
    Some(RawTriple {
        timestamp_raw,
        url_raw,
        status_raw,
    })
}
