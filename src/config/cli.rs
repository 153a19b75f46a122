//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::constants::{
    DB_PATH, DEFAULT_CDX_ENDPOINT, DEFAULT_EVICTION_DAYS, DEFAULT_MAX_RETRIES,
    DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use super::types::{Config, LogFormat, LogLevel, QueryMode, QueryOptions};
use crate::dedup::RecordOrder;
use crate::export::DataFormat;
use crate::filter::{FilterCriteria, FilterPreset};
use crate::storage::DomainSort;

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Fetch and store every archived URL of a domain
/// wayback_urls fetch example.com
///
/// # Include subdomains, smaller row cap
/// wayback_urls fetch example.com --subdomains --fast
///
/// # Browse stored PHP pages that returned 200
/// wayback_urls show example.com --ext php --status 200
///
/// # Custom database path
/// wayback_urls --db-path ./archive.db list --sort urls
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "wayback_urls",
    version,
    about = "Collects archived URLs of a domain from the Wayback Machine CDX index."
)]
pub struct Cli {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, global = true, env = "WAYBACK_URLS_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// CDX search endpoint
    #[arg(long, global = true, env = "WAYBACK_URLS_CDX_ENDPOINT", default_value = DEFAULT_CDX_ENDPOINT)]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Maximum attempts per CDX request, initial attempt included
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Base retry delay in milliseconds (429 waits base * attempt)
    #[arg(long, global = true, default_value_t = DEFAULT_RETRY_BASE_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// HTTP User-Agent header value
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Library configuration from the global options.
    pub fn config(&self) -> Config {
        Config {
            db_path: self.db_path.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
            cdx_endpoint: self.endpoint.clone(),
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent.clone(),
            max_retries: self.max_retries,
            retry_base_delay_ms: self.retry_delay_ms,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Query the archive for a domain and store its URLs
    Fetch(FetchArgs),

    /// List stored domains
    List {
        /// Ordering: date (newest first), domain, urls (largest first)
        #[arg(long, value_enum, default_value_t = DomainSort::Date)]
        sort: DomainSort,
        /// Only domains containing this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the stored URLs of a domain, optionally filtered
    Show {
        domain: String,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output order: first-seen (stored order), url, newest
        #[arg(long, value_enum, default_value_t = RecordOrder::FirstSeen)]
        order: RecordOrder,
        /// Print at most this many records
        #[arg(long)]
        limit: Option<usize>,
        /// Print the available extensions and status codes instead of URLs
        #[arg(long)]
        facets: bool,
    },

    /// Delete the stored dataset of a domain
    Delete { domain: String },

    /// Delete datasets older than a number of days
    Evict {
        #[arg(long, default_value_t = DEFAULT_EVICTION_DAYS)]
        days: u64,
    },

    /// Export the dataset of a domain, or only the records matching filters
    Export {
        domain: String,
        #[arg(long, value_enum)]
        format: DataFormat,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the dataset of a domain with the contents of a file
    Import {
        domain: String,
        file: PathBuf,
        /// Input format (guessed from the file extension if omitted)
        #[arg(long, value_enum)]
        format: Option<DataFormat>,
    },

    /// Print store totals
    Stats,

    /// Delete every stored dataset
    Clear {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Write every dataset into one JSON backup
    Backup {
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Restore datasets from a backup written by `backup`
    Restore { file: PathBuf },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    pub domain: String,

    /// Include subdomains (`*.domain`)
    #[arg(long)]
    pub subdomains: bool,

    /// Remove a leading `www.` before querying
    #[arg(long)]
    pub strip_www: bool,

    /// Smaller row cap for a quicker answer
    #[arg(long)]
    pub fast: bool,

    /// Drop images, fonts, scripts, stylesheets, media and archives
    #[arg(long)]
    pub skip_common: bool,

    /// Print the merged rows instead of storing them
    #[arg(long)]
    pub preview: bool,
}

impl FetchArgs {
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            include_subdomains: self.subdomains,
            strip_www: self.strip_www,
            mode: if self.fast {
                QueryMode::Fast
            } else {
                QueryMode::Full
            },
            skip_common_assets: self.skip_common,
        }
    }
}

/// Filter options shared by commands that print or export records.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Start from a named preset: admin|api|config|backups|php|errors
    #[arg(long, value_enum)]
    pub preset: Option<FilterPreset>,

    /// File extensions to keep (comma separated, e.g. `php,html`)
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Status codes to keep (comma separated)
    #[arg(long = "status", value_delimiter = ',')]
    pub status_codes: Vec<u16>,

    /// Regex matched against the URL (substring if it does not compile)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Earliest capture date, YYYYMMDD
    #[arg(long)]
    pub from: Option<String>,

    /// Latest capture date, YYYYMMDD
    #[arg(long)]
    pub to: Option<String>,

    /// Case-insensitive text the URL must contain
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    /// Preset first, then explicit options: extensions and status codes are
    /// added to the preset's, `--pattern` replaces its pattern.
    pub fn criteria(&self) -> FilterCriteria {
        let base = match self.preset {
            Some(preset) => FilterCriteria::from_preset(preset),
            None => FilterCriteria::new(),
        };
        let mut criteria = base
            .with_extensions(&self.extensions)
            .with_status_codes(self.status_codes.iter().copied())
            .with_date_range(self.from.clone(), self.to.clone());
        if let Some(pattern) = &self.pattern {
            criteria = criteria.with_pattern(pattern.as_str());
        }
        if let Some(text) = &self.search {
            criteria = criteria.with_free_text(text.as_str());
        }
        criteria
    }
}
