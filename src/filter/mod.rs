//! Multi-criteria filtering of URL records.
//!
//! Every populated field of a [`FilterCriteria`] must hold for a record to be
//! kept; empty fields impose nothing. Filtering is stable (input order is kept)
//! and never mutates the input. Checks run cheapest first: extension, status,
//! pattern, date range, free text.
//!
//! [`FilterPreset`]s fill extensions, status codes and pattern from a fixed
//! set for common views (admin panels, APIs, config files, backups, PHP pages,
//! error pages).

mod pattern;
mod preset;

pub use pattern::UrlPattern;
pub use preset::FilterPreset;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::UrlRecord;
use crate::timestamp::date_digits;

/// What to keep. Built per query, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Lowercase extensions without the leading dot
    pub extensions: BTreeSet<String>,
    pub status_codes: BTreeSet<u16>,
    /// Regex, or substring when it does not compile
    pub pattern: Option<String>,
    /// Inclusive lower bound, `YYYYMMDD`
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYYMMDD`
    pub date_to: Option<String>,
    /// Case-insensitive substring of the URL
    pub free_text: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds extensions, normalizing `.PHP` / ` php ` to `php`.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions.extend(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty()),
        );
        self
    }

    pub fn with_status_codes<I: IntoIterator<Item = u16>>(mut self, codes: I) -> Self {
        self.status_codes.extend(codes);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<String>, to: Option<String>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_free_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = Some(text.into());
        self
    }

    /// `true` when no field constrains anything.
    pub fn is_empty(&self) -> bool {
        let compiled = CompiledFilter::new(self);
        compiled.extensions.is_none()
            && compiled.status_codes.is_none()
            && compiled.pattern.is_none()
            && compiled.date_from.is_none()
            && compiled.date_to.is_none()
            && compiled.free_text.is_none()
    }
}

/// Criteria prepared once per query: pattern compiled, bounds validated,
/// text lowercased.
struct CompiledFilter<'c> {
    extensions: Option<&'c BTreeSet<String>>,
    status_codes: Option<&'c BTreeSet<u16>>,
    pattern: Option<UrlPattern>,
    date_from: Option<&'c str>,
    date_to: Option<&'c str>,
    free_text: Option<String>,
}

impl<'c> CompiledFilter<'c> {
    fn new(criteria: &'c FilterCriteria) -> Self {
        Self {
            extensions: Some(&criteria.extensions).filter(|s| !s.is_empty()),
            status_codes: Some(&criteria.status_codes).filter(|s| !s.is_empty()),
            pattern: non_blank(criteria.pattern.as_deref()).map(UrlPattern::compile),
            date_from: date_bound(criteria.date_from.as_deref()),
            date_to: date_bound(criteria.date_to.as_deref()),
            free_text: non_blank(criteria.free_text.as_deref()).map(|t| t.trim().to_lowercase()),
        }
    }

    fn matches(&self, record: &UrlRecord) -> bool {
        if let Some(extensions) = self.extensions {
            match url_extension(&record.url) {
                Some(ext) if extensions.contains(&ext) => {}
                _ => return false,
            }
        }
        if let Some(codes) = self.status_codes {
            if !codes.contains(&record.status_code) {
                return false;
            }
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&record.url) {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let date = date_digits(&record.observed_at);
            if self.date_from.is_some_and(|from| date.as_str() < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| date.as_str() > to) {
                return false;
            }
        }
        if let Some(text) = &self.free_text {
            if !record.url.to_lowercase().contains(text.as_str()) {
                return false;
            }
        }
        true
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accepts a bound only when it is exactly eight ASCII digits.
fn date_bound(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| v.len() == 8 && v.bytes().all(|b| b.is_ascii_digit()))
}

/// Records passing every populated criterion, as references, in input order.
pub fn filter_refs<'a>(records: &'a [UrlRecord], criteria: &FilterCriteria) -> Vec<&'a UrlRecord> {
    let compiled = CompiledFilter::new(criteria);
    records.iter().filter(|r| compiled.matches(r)).collect()
}

/// Records passing every populated criterion, in input order.
///
/// # Examples
///
/// ```
/// use wayback_urls::filter::{apply, FilterCriteria};
/// use wayback_urls::UrlRecord;
///
/// let records = vec![
///     UrlRecord::new("http://example.com/a.php", "2023-01-01T00:00:00Z", 200),
///     UrlRecord::new("http://example.com/b.php", "2023-01-01T00:00:00Z", 404),
///     UrlRecord::new("http://example.com/c.html", "2023-01-01T00:00:00Z", 200),
/// ];
/// let criteria = FilterCriteria::new()
///     .with_extensions(["php"])
///     .with_status_codes([200]);
/// let kept = apply(&records, &criteria);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].url, "http://example.com/a.php");
/// ```
pub fn apply(records: &[UrlRecord], criteria: &FilterCriteria) -> Vec<UrlRecord> {
    filter_refs(records, criteria).into_iter().cloned().collect()
}

/// Extension of the last path segment, lowercased, ignoring query and fragment.
///
/// Absolute URLs are parsed so the host (`example.com`) is never mistaken for
/// a file name; anything else is treated as a bare path.
pub fn url_extension(url: &str) -> Option<String> {
    let parsed;
    let path = match url::Url::parse(url) {
        Ok(u) => {
            parsed = u;
            parsed.path()
        }
        Err(_) => url.split(['?', '#']).next().unwrap_or_default(),
    };
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Distinct values present in a record set, for building filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub extensions: BTreeSet<String>,
    pub status_codes: BTreeSet<u16>,
}

pub fn facets(records: &[UrlRecord]) -> Facets {
    let mut facets = Facets::default();
    for record in records {
        if let Some(ext) = url_extension(&record.url) {
            facets.extensions.insert(ext);
        }
        facets.status_codes.insert(record.status_code);
    }
    facets
}

#[cfg(test)]
mod tests;
