//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including the CDX endpoint, query limits, retry timings and storage keys.

// CDX index query
/// Default Wayback Machine CDX search endpoint.
pub const DEFAULT_CDX_ENDPOINT: &str = "http://web.archive.org/cdx/search/cdx";
/// Row cap for a fast query (smaller, quicker response)
pub const FAST_MODE_LIMIT: usize = 10_000;
/// Row cap for a full query
pub const FULL_MODE_LIMIT: usize = 50_000;
/// Field list requested from the CDX index, in the order the parser expects
pub const CDX_FIELD_LIST: &str = "timestamp,original,statuscode";
/// Server-side dedup key
pub const CDX_COLLAPSE_KEY: &str = "urlkey";

// Retry policy
/// Maximum attempts per CDX request (initial attempt included)
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base delay between attempts in milliseconds.
/// A 429 response waits `base * attempt`; a transport failure waits `base`.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
/// HTTP status returned by the CDX server when it rate limits us
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// Network
/// Per-request timeout in seconds. CDX responses for large domains are slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_USER_AGENT: &str = "wayback_urls/0.1 (+https://github.com/alexwoolford)";

// Record defaults
/// Status used when an ingested row carries an unparseable status code
pub const INGEST_FALLBACK_STATUS: u16 = 200;
/// Status used when a raw CDX row is kept without interpretation
pub const RAW_FALLBACK_STATUS: u16 = 0;
/// Length of a compact CDX timestamp (`YYYYMMDDHHMMSS`)
pub const COMPACT_TIMESTAMP_LEN: usize = 14;

// URL validation
/// Maximum URL length accepted from the index or from imports
pub const MAX_URL_LENGTH: usize = 2048;

// Storage
pub const DB_PATH: &str = "./wayback_urls.db";
/// Reserved key of the aggregate metadata row
pub const METADATA_KEY: &str = "metadata";
/// Version string written into metadata and backups
pub const STORE_FORMAT_VERSION: &str = "1.0.0";
/// Default age (in days) after which `evict` removes a dataset
pub const DEFAULT_EVICTION_DAYS: u64 = 30;
/// SQLite busy timeout in seconds
pub const DB_BUSY_TIMEOUT_SECS: u64 = 5;

/// Extensions treated as static assets when `skip_common_assets` is set.
pub const COMMON_ASSET_EXTENSIONS: &[&str] = &[
    ".ico", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".css", ".js", ".woff", ".woff2",
    ".ttf", ".eot", ".mp4", ".mp3", ".wav", ".avi", ".mov", ".pdf", ".zip", ".rar", ".tar", ".gz",
];
