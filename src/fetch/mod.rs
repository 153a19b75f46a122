//! Rate-limit aware fetching of CDX query results.
//!
//! Retry is reserved for two situations:
//!
//! - **429 Too Many Requests**: wait `base_delay * attempt` and try again,
//!   unless this was the last allowed attempt, in which case the 429 response
//!   is returned as is.
//! - **Transport failure** (no response, or the body could not be read): wait
//!   a flat `base_delay` and try again; the last failure is returned as
//!   [`FetchError::Transport`].
//!
//! Every other status, success or not, is returned to the caller untouched.
//! A 400 from the index usually means a bad query and retrying would hide it.
//!
//! Waiting uses `tokio::time::sleep`, so a backoff only suspends the current
//! task.

mod query;

pub use query::{build_query_url, query_target};

use std::time::Duration;

use log::{debug, warn};

use crate::config::{Config, HTTP_STATUS_TOO_MANY_REQUESTS};
use crate::error_handling::FetchError;

/// A response handed back by [`RetryingFetcher::fetch`].
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// HTTP status of the final attempt
    pub status: u16,
    /// Response body as text
    pub body: String,
    /// Number of attempts made, initial attempt included
    pub attempts: u32,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP GET with bounded retries on rate limiting and transport failure.
#[derive(Debug, Clone)]
pub struct RetryingFetcher {
    client: reqwest::Client,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingFetcher {
    /// Creates a fetcher.
    ///
    /// `max_retries` is the total number of attempts; values below 1 are
    /// treated as 1.
    pub fn new(client: reqwest::Client, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            client,
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Creates a fetcher with the retry settings of a [`Config`].
    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Fetches `url`, retrying per the module-level policy.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transport` if the final attempt produced no
    /// readable response.
    pub async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            debug!("CDX request attempt {}/{}: {}", attempt, self.max_retries, url);

            let outcome = match self.client.get(url).send().await {
                Ok(response)
                    if response.status().as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS
                        && attempt < self.max_retries =>
                {
                    let delay = self.base_delay * attempt;
                    warn!(
                        "Rate limited by CDX server (attempt {}/{}), retrying in {:?}",
                        attempt, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    response.text().await.map(|body| FetchedResponse {
                        status,
                        body,
                        attempts: attempt,
                    })
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    warn!(
                        "CDX request failed (attempt {}/{}): {e}; retrying in {:?}",
                        attempt, self.max_retries, self.base_delay
                    );
                    tokio::time::sleep(self.base_delay).await;
                }
                Err(e) => {
                    return Err(FetchError::Transport {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    })
                }
            }
        }
    }
}
