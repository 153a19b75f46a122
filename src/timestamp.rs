//! CDX timestamp normalization.
//!
//! The index reports capture times as compact `YYYYMMDDHHMMSS` digit strings.
//! They are rewritten to `YYYY-MM-DDTHH:MM:SSZ`. The canonical form is
//! zero-padded, so lexicographic order equals chronological order and the
//! rest of the crate compares timestamps as plain strings.
//!
//! Inputs that are not at least 14 ASCII digits are returned unchanged. The
//! policy is the same for every caller: a malformed value is never replaced by
//! the current time, so merging the same rows twice gives the same result.

use chrono::{SecondsFormat, Utc};

use crate::config::COMPACT_TIMESTAMP_LEN;

/// Converts a compact CDX timestamp into canonical ISO-8601.
///
/// Only the first 14 characters are used; trailing characters are ignored.
///
/// # Examples
///
/// ```
/// use wayback_urls::timestamp::normalize;
///
/// assert_eq!(normalize("20230601000000"), "2023-06-01T00:00:00Z");
/// assert_eq!(normalize("2023"), "2023");
/// ```
pub fn normalize(raw: &str) -> String {
    let compact = match raw.get(..COMPACT_TIMESTAMP_LEN) {
        Some(prefix) if prefix.bytes().all(|b| b.is_ascii_digit()) => prefix,
        _ => return raw.to_string(),
    };

    format!(
        "{}-{}-{}T{}:{}:{}Z",
        &compact[0..4],
        &compact[4..6],
        &compact[6..8],
        &compact[8..10],
        &compact[10..12],
        &compact[12..14]
    )
}

/// Returns `true` for a compact 14-digit CDX timestamp.
pub fn is_compact(raw: &str) -> bool {
    raw.len() == COMPACT_TIMESTAMP_LEN && raw.bytes().all(|b| b.is_ascii_digit())
}

/// The current instant in canonical form.
pub fn now_canonical() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// First eight digits (`YYYYMMDD`) of a timestamp with separators removed.
///
/// Works on both the canonical and the compact form.
pub fn date_digits(timestamp: &str) -> String {
    timestamp
        .chars()
        .filter(|c| !matches!(c, '-' | ':' | 'T' | 'Z'))
        .take(8)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_timestamp() {
        assert_eq!(normalize("20230101120000"), "2023-01-01T12:00:00Z");
        assert_eq!(normalize("19990309235959"), "1999-03-09T23:59:59Z");
    }

    #[test]
    fn test_normalize_ignores_trailing_characters() {
        assert_eq!(normalize("20230101120000123"), "2023-01-01T12:00:00Z");
    }

    #[test]
    fn test_normalize_short_input_returned_unchanged() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("2023"), "2023");
        assert_eq!(normalize("2023010112000"), "2023010112000");
    }

    #[test]
    fn test_normalize_non_digit_input_returned_unchanged() {
        assert_eq!(normalize("timestamp-header!"), "timestamp-header!");
        assert_eq!(normalize("2023-01-01T00:00:00Z"), "2023-01-01T00:00:00Z");
    }

    #[test]
    fn test_normalize_multibyte_input_does_not_panic() {
        // 14 bytes would split the multibyte character
        let raw = "2023010112000é";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_canonical_form_orders_lexicographically() {
        let earlier = normalize("20230101120000");
        let later = normalize("20230601000000");
        assert!(earlier < later);
    }

    #[test]
    fn test_now_canonical_shape() {
        let now = now_canonical();
        assert_eq!(now.len(), 20);
        assert!(now.ends_with('Z'));
        assert_eq!(&now[10..11], "T");
    }

    #[test]
    fn test_is_compact() {
        assert!(is_compact("20230101120000"));
        assert!(!is_compact("timestamp"));
        assert!(!is_compact("2023010112000"));
    }

    #[test]
    fn test_date_digits() {
        assert_eq!(date_digits("2023-06-01T00:00:00Z"), "20230601");
        assert_eq!(date_digits("20230601000000"), "20230601");
        assert_eq!(date_digits("2023"), "2023");
    }
}
