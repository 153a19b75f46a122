//! User-supplied URL patterns: a case-insensitive regex when the text compiles,
//! a case-insensitive substring otherwise.

use regex::{Regex, RegexBuilder};

/// A compiled pattern.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    Regex(Regex),
    /// Lowercased needle used when the pattern is not a valid regex
    Substring(String),
}

impl UrlPattern {
    /// Compiles `pattern`, never failing.
    ///
    /// Invalid regex syntax (an unbalanced `(`, a dangling `*`, ...) is logged
    /// at debug level and the raw text is matched as a substring instead.
    pub fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => UrlPattern::Regex(regex),
            Err(e) => {
                log::debug!("Pattern {pattern:?} is not a valid regex ({e}), using substring match");
                UrlPattern::Substring(pattern.to_lowercase())
            }
        }
    }

    pub fn is_match(&self, url: &str) -> bool {
        match self {
            UrlPattern::Regex(regex) => regex.is_match(url),
            UrlPattern::Substring(needle) => url.to_lowercase().contains(needle.as_str()),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, UrlPattern::Regex(_))
    }
}
