//! Store-level summary document.
//!
//! The summary is derived data: it is recomputed from the `datasets` table
//! inside every mutating transaction and checked again on read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{Row, SqliteConnection};

use crate::config::{METADATA_KEY, STORE_FORMAT_VERSION};
use crate::error_handling::StoreError;
use crate::timestamp::now_millis;

/// Per-domain line of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub url_count: usize,
    /// Epoch milliseconds of the last write
    pub last_updated: i64,
}

/// Summary of everything in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreMetadata {
    pub version: String,
    /// Epoch milliseconds when the summary was first written
    pub created: i64,
    pub domains: BTreeMap<String, DomainSummary>,
    pub total_domains: usize,
    pub total_urls: usize,
}

impl StoreMetadata {
    /// Builds a summary from per-domain lines, deriving the totals.
    pub fn from_domains(created: i64, domains: BTreeMap<String, DomainSummary>) -> Self {
        let total_urls = domains.values().map(|d| d.url_count).sum();
        Self {
            version: STORE_FORMAT_VERSION.to_string(),
            created,
            total_domains: domains.len(),
            total_urls,
            domains,
        }
    }

    /// `true` when the totals agree with the per-domain lines.
    pub fn is_self_consistent(&self) -> bool {
        self.total_domains == self.domains.len()
            && self.total_urls == self.domains.values().map(|d| d.url_count).sum::<usize>()
    }
}

/// Reads the per-domain lines from the `datasets` table.
pub(crate) async fn summarize_datasets(
    conn: &mut SqliteConnection,
) -> Result<BTreeMap<String, DomainSummary>, StoreError> {
    let rows = sqlx::query("SELECT domain, url_count, fetched_at_ms FROM datasets")
        .fetch_all(&mut *conn)
        .await?;

    let mut domains = BTreeMap::new();
    for row in rows {
        let url_count: i64 = row.try_get("url_count")?;
        domains.insert(
            row.try_get::<String, _>("domain")?,
            DomainSummary {
                url_count: usize::try_from(url_count).unwrap_or_default(),
                last_updated: row.try_get("fetched_at_ms")?,
            },
        );
    }
    Ok(domains)
}

/// Reads the stored summary. A missing or unreadable document yields `None`.
pub(crate) async fn load_metadata(
    conn: &mut SqliteConnection,
) -> Result<Option<StoreMetadata>, StoreError> {
    let payload: Option<String> =
        sqlx::query_scalar("SELECT payload FROM store_metadata WHERE key = ?")
            .bind(METADATA_KEY)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(payload.and_then(|p| match serde_json::from_str(&p) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            log::warn!("Stored metadata is unreadable, it will be rebuilt: {e}");
            None
        }
    }))
}

/// Recomputes the summary from the `datasets` table and writes it.
///
/// Must run on the connection of the transaction that changed the datasets so
/// the summary commits or rolls back with them. Keeps the original `created`
/// value when one exists.
pub(crate) async fn refresh_metadata(
    conn: &mut SqliteConnection,
) -> Result<StoreMetadata, StoreError> {
    let created = load_metadata(&mut *conn)
        .await?
        .map(|m| m.created)
        .unwrap_or_else(now_millis);
    let metadata = StoreMetadata::from_domains(created, summarize_datasets(&mut *conn).await?);

    sqlx::query(
        "INSERT INTO store_metadata (key, payload) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET payload = excluded.payload",
    )
    .bind(METADATA_KEY)
    .bind(serde_json::to_string(&metadata)?)
    .execute(&mut *conn)
    .await?;

    Ok(metadata)
}
