//! Ingestion pipeline: query the CDX index for a domain and store the result.
//!
//! Stages, each reported through a [`ProgressSink`]:
//!
//! 1. validate the domain (no network call for a malformed name)
//! 2. build the query URL and fetch it with [`RetryingFetcher`]
//! 3. parse the body with [`crate::parse`]
//! 4. merge duplicates with [`crate::dedup`]
//! 5. replace the domain's dataset in the [`DomainStore`]
//!
//! A failure in stages 1-4 leaves the stored dataset exactly as it was.

mod progress;

pub use progress::{ChannelProgressSink, LogProgress, NoopProgress, ProgressSink, ProgressUpdate};

use log::{debug, info};
use serde::Serialize;
use url::Url;

use crate::app::validate_domain;
use crate::config::{Config, QueryOptions, COMMON_ASSET_EXTENSIONS};
use crate::dedup::{merge, MergeOptions};
use crate::error_handling::{IngestError, InitializationError};
use crate::fetch::{build_query_url, RetryingFetcher};
use crate::filter::url_extension;
use crate::initialization::init_client;
use crate::models::UrlRecord;
use crate::parse::parse_response;
use crate::storage::DomainStore;

/// Outcome of one [`Ingestor::ingest`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Normalized domain the dataset is stored under
    pub domain: String,
    pub query_url: String,
    /// HTTP attempts used, initial attempt included
    pub attempts: u32,
    /// Data rows in the response (header excluded)
    pub rows_seen: usize,
    /// Rows dropped as malformed
    pub rows_dropped: usize,
    /// Records removed by `skip_common_assets`
    pub assets_skipped: usize,
    /// Records in the resulting dataset
    pub url_count: usize,
    /// `false` when nothing was found and the previous dataset was kept
    pub stored: bool,
}

/// Records produced by one pass through the fetch/parse/merge stages.
struct Harvest {
    domain: String,
    query_url: String,
    attempts: u32,
    rows_seen: usize,
    rows_dropped: usize,
    assets_skipped: usize,
    records: Vec<UrlRecord>,
}

/// Runs ingestions against one CDX endpoint and one store.
#[derive(Debug, Clone)]
pub struct Ingestor {
    fetcher: RetryingFetcher,
    store: DomainStore,
    endpoint: Url,
}

impl Ingestor {
    /// Builds an ingestor from configuration.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` if the HTTP client cannot be built or the
    /// configured endpoint is not a valid URL.
    pub fn new(config: &Config, store: DomainStore) -> Result<Self, InitializationError> {
        let endpoint = Url::parse(&config.cdx_endpoint)?;
        let fetcher = RetryingFetcher::from_config(init_client(config)?, config);
        Ok(Self::with_parts(fetcher, store, endpoint))
    }

    pub fn with_parts(fetcher: RetryingFetcher, store: DomainStore, endpoint: Url) -> Self {
        Self {
            fetcher,
            store,
            endpoint,
        }
    }

    pub fn store(&self) -> &DomainStore {
        &self.store
    }

    /// Fetches every archived URL for `domain` and replaces its dataset.
    ///
    /// Records are merged with [`MergeOptions::ingest`] (status fallback 200,
    /// sorted by URL). When the index returns no usable row the existing
    /// dataset is left untouched and the report says `stored: false`.
    ///
    /// # Errors
    ///
    /// - `IngestError::InvalidInput` for a malformed domain, before any request
    /// - `IngestError::Transport` when the retry budget is exhausted
    /// - `IngestError::Remote` for a non-2xx final response
    /// - `IngestError::Storage` when the dataset cannot be written
    pub async fn ingest(
        &self,
        domain: &str,
        options: &QueryOptions,
        progress: &dyn ProgressSink,
    ) -> Result<IngestReport, IngestError> {
        let harvest = self
            .harvest(domain, options, MergeOptions::ingest(), progress)
            .await?;

        let url_count = harvest.records.len();
        let stored = url_count > 0;
        if stored {
            self.store.put(&harvest.domain, harvest.records).await?;
        } else {
            info!("No archived URLs found for {}; keeping any stored dataset", harvest.domain);
        }

        progress.emit(ProgressUpdate::new(100, format!("Found {url_count} URLs")));
        info!(
            "Ingested {} URLs for {} ({} rows, {} dropped, {} attempt(s))",
            url_count, harvest.domain, harvest.rows_seen, harvest.rows_dropped, harvest.attempts
        );

        Ok(IngestReport {
            domain: harvest.domain,
            query_url: harvest.query_url,
            attempts: harvest.attempts,
            rows_seen: harvest.rows_seen,
            rows_dropped: harvest.rows_dropped,
            assets_skipped: harvest.assets_skipped,
            url_count,
            stored,
        })
    }

    /// Runs the same query as [`ingest`](Self::ingest) without touching the
    /// store.
    ///
    /// Raw rows keep an explicit status 0 when the index has none and come
    /// back newest first.
    pub async fn preview(
        &self,
        domain: &str,
        options: &QueryOptions,
    ) -> Result<Vec<UrlRecord>, IngestError> {
        let harvest = self
            .harvest(domain, options, MergeOptions::raw(), &NoopProgress)
            .await?;
        Ok(harvest.records)
    }

    async fn harvest(
        &self,
        domain: &str,
        options: &QueryOptions,
        merge_options: MergeOptions,
        progress: &dyn ProgressSink,
    ) -> Result<Harvest, IngestError> {
        let domain =
            validate_domain(domain).ok_or_else(|| IngestError::InvalidInput(domain.to_string()))?;

        progress.emit(ProgressUpdate::new(10, "Querying Wayback Machine..."));
        let query_url = build_query_url(&self.endpoint, &domain, options);
        debug!("CDX query for {domain}: {query_url}");

        progress.emit(ProgressUpdate::new(30, "Fetching data from archive..."));
        let response = self.fetcher.fetch(query_url.as_str()).await?;
        if !response.is_success() {
            return Err(IngestError::Remote {
                status: response.status,
                url: query_url.to_string(),
            });
        }

        progress.emit(ProgressUpdate::new(60, "Processing results..."));
        let parsed = parse_response(&response.body);
        debug!(
            "Parsed {} rows ({} dropped) from {:?} response",
            parsed.rows_seen, parsed.rows_dropped, parsed.encoding
        );

        progress.emit(ProgressUpdate::new(80, "Deduplicating URLs..."));
        let mut records = merge(parsed.triples, merge_options);

        let mut assets_skipped = 0;
        if options.skip_common_assets {
            let before = records.len();
            records.retain(|record| !is_common_asset(&record.url));
            assets_skipped = before - records.len();
            debug!("Skipped {assets_skipped} common asset URLs");
        }

        Ok(Harvest {
            domain,
            query_url: query_url.to_string(),
            attempts: response.attempts,
            rows_seen: parsed.rows_seen,
            rows_dropped: parsed.rows_dropped,
            assets_skipped,
            records,
        })
    }
}

/// `true` when the URL's path extension is a static asset type.
pub fn is_common_asset(url: &str) -> bool {
    url_extension(url).is_some_and(|ext| {
        COMMON_ASSET_EXTENSIONS
            .iter()
            .any(|asset| asset.trim_start_matches('.') == ext)
    })
}
