//! Configuration types.
//!
//! This module defines enums and structs used for configuration and
//! command-line argument parsing.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DB_PATH, DEFAULT_CDX_ENDPOINT, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, FAST_MODE_LIMIT, FULL_MODE_LIMIT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// How many rows to request from the CDX index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum QueryMode {
    /// Smaller row cap, faster response
    Fast,
    /// Larger row cap
    #[default]
    Full,
}

impl QueryMode {
    /// Row limit sent as the `limit` query parameter.
    pub fn limit(self) -> usize {
        match self {
            QueryMode::Fast => FAST_MODE_LIMIT,
            QueryMode::Full => FULL_MODE_LIMIT,
        }
    }
}

/// Per-ingestion query options.
#[derive(Clone, Debug, Default)]
pub struct QueryOptions {
    /// Query `*.domain` so subdomains are included
    pub include_subdomains: bool,
    /// Remove a leading `www.` before querying
    pub strip_www: bool,
    /// Row cap selection
    pub mode: QueryMode,
    /// Drop URLs pointing at common static assets (images, fonts, scripts...)
    pub skip_common_assets: bool,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use wayback_urls::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./archive.db"),
///     max_retries: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// CDX search endpoint
    pub cdx_endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum attempts per CDX request (initial attempt included)
    pub max_retries: u32,

    /// Base retry delay in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            cdx_endpoint: DEFAULT_CDX_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_query_mode_limits() {
        assert_eq!(QueryMode::Fast.limit(), 10_000);
        assert_eq!(QueryMode::Full.limit(), 50_000);
        // Full is the default, matching a plain `fetch` without `--fast`
        assert_eq!(QueryMode::default(), QueryMode::Full);
    }

    #[test]
    fn test_query_options_default() {
        let options = QueryOptions::default();
        assert!(!options.include_subdomains);
        assert!(!options.strip_www);
        assert!(!options.skip_common_assets);
        assert_eq!(options.mode, QueryMode::Full);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_base_delay_ms, 1000);
        assert_eq!(config.cdx_endpoint, "http://web.archive.org/cdx/search/cdx");
        assert_eq!(config.db_path, PathBuf::from("./wayback_urls.db"));
    }
}
