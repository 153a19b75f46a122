//! Per-line parsers for line-delimited CDX responses.
//!
//! Each parser either produces the fields of one row or declines. They are
//! tried in a fixed order and the first one that produces fields wins.

use serde_json::Value;

/// Encoding a single row was recognized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEncoding {
    /// A JSON array, e.g. `["20230101120000","http://a/",200]`
    JsonArray,
    /// Bare comma-separated JSON values, e.g. `"20230101120000","http://a/",200`
    BracketedJson,
    /// Whitespace-separated plain text, e.g. `20230101120000 http://a/ 200`
    Whitespace,
}

type LineParser = fn(&str) -> Option<Vec<String>>;

/// Parsers in priority order.
const LINE_PARSERS: [(RowEncoding, LineParser); 3] = [
    (RowEncoding::JsonArray, parse_json_array),
    (RowEncoding::BracketedJson, parse_bracketed),
    (RowEncoding::Whitespace, parse_whitespace),
];

/// Parses one non-empty line into fields.
///
/// Returns `None` only when no parser produced any field (which cannot happen
/// for a non-blank line, since whitespace splitting always yields something).
pub fn parse_line(line: &str) -> Option<(RowEncoding, Vec<String>)> {
    LINE_PARSERS
        .iter()
        .find_map(|(encoding, parser)| parser(line).map(|fields| (*encoding, fields)))
}

/// Parses a line holding a JSON array.
///
/// Lines cut out of a pretty-printed or truncated array-of-arrays document
/// (`[["a","b","c"],` or `["a","b","c"]]`) are accepted after stripping the
/// enclosing punctuation.
fn parse_json_array(line: &str) -> Option<Vec<String>> {
    let mut candidate = line.trim().trim_end_matches(',');
    if candidate.starts_with("[[") {
        candidate = &candidate[1..];
    }
    if candidate.ends_with("]]") {
        candidate = &candidate[..candidate.len() - 1];
    }
    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(values) => Some(values.iter().map(value_to_field).collect()),
        Err(_) => None,
    }
}

fn parse_bracketed(line: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<Value>>(&format!("[{}]", line.trim())) {
        Ok(values) => Some(values.iter().map(value_to_field).collect()),
        Err(_) => None,
    }
}

fn parse_whitespace(line: &str) -> Option<Vec<String>> {
    let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

/// Renders a JSON value as a raw field string.
///
/// Strings are taken verbatim (no quotes), numbers in their JSON text form
/// and `null` as the empty string.
pub fn value_to_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
