//! wayback_urls library: collect and browse archived URLs of a domain
//!
//! This library queries the Wayback Machine CDX index for every URL captured
//! under a domain, tolerates the index's several response encodings, keeps the
//! most recent capture of each URL, and stores one dataset per domain in
//! SQLite. Stored datasets can be filtered, exported, imported, and backed up.
//!
//! # Example
//!
//! ```no_run
//! use wayback_urls::{Config, DomainStore, FilterCriteria, Ingestor, LogProgress, QueryOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let store = DomainStore::open(&config.db_path).await?;
//! let ingestor = Ingestor::new(&config, store.clone())?;
//!
//! let report = ingestor
//!     .ingest("example.com", &QueryOptions::default(), &LogProgress)
//!     .await?;
//! println!("Stored {} URLs", report.url_count);
//!
//! let php_pages = store
//!     .search("example.com", &FilterCriteria::new().with_extensions(["php"]))
//!     .await?;
//! println!("{} PHP pages", php_pages.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod app;
pub mod config;
pub mod dedup;
pub mod error_handling;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod ingest;
pub mod initialization;
pub mod models;
pub mod parse;
pub mod storage;
pub mod timestamp;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, QueryMode, QueryOptions};
pub use dedup::{merge, MergeOptions, RecordOrder};
pub use error_handling::{ErrorKind, FetchError, IngestError, InitializationError, StoreError};
pub use export::DataFormat;
pub use fetch::{FetchedResponse, RetryingFetcher};
pub use filter::{FilterCriteria, FilterPreset};
pub use ingest::{
    ChannelProgressSink, IngestReport, Ingestor, LogProgress, NoopProgress, ProgressSink,
    ProgressUpdate,
};
pub use models::{Dataset, RawTriple, UrlRecord};
pub use storage::{run_migrations, DomainSort, DomainStore, StoreMetadata};
