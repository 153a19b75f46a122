// Shared test helpers for store setup, sample data, and a mock CDX index.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wayback_urls::{DomainStore, Ingestor, RetryingFetcher, UrlRecord};

/// Path the mock server answers CDX queries on.
#[allow(dead_code)] // Used by other test files
pub const CDX_PATH: &str = "/cdx/search/cdx";

/// Creates an in-memory store with migrations applied.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store() -> DomainStore {
    DomainStore::in_memory()
        .await
        .expect("Failed to create in-memory store")
}

/// Creates a file-backed store inside `dir` and returns it with its path.
/// Opening the same path again reuses the existing database.
#[allow(dead_code)] // Used by other test files
pub async fn create_file_store(dir: &TempDir) -> (DomainStore, PathBuf) {
    let db_path = dir.path().join("wayback_urls.db");
    let store = DomainStore::open(&db_path)
        .await
        .expect("Failed to open file store");
    (store, db_path)
}

/// Builds `n` distinct records under `domain` with ascending capture times.
#[allow(dead_code)] // Used by other test files
pub fn sample_records(domain: &str, n: usize) -> Vec<UrlRecord> {
    (0..n)
        .map(|i| {
            UrlRecord::new(
                format!("http://{domain}/page-{i}.html"),
                format!("2023-01-{:02}T00:00:00Z", (i % 28) + 1),
                if i % 5 == 0 { 404 } else { 200 },
            )
        })
        .collect()
}

/// Answers every CDX query on `server` with `body`.
#[allow(dead_code)] // Used by other test files
pub async fn mount_cdx_body(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(CDX_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Ingestor pointed at the mock server with a short retry delay.
#[allow(dead_code)] // Used by other test files
pub fn mock_ingestor(server: &MockServer, store: DomainStore) -> Ingestor {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), CDX_PATH))
        .expect("mock server URI should be a valid URL");
    let fetcher = RetryingFetcher::new(reqwest::Client::new(), 3, Duration::from_millis(10));
    Ingestor::with_parts(fetcher, store, endpoint)
}
