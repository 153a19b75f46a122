//! Persistent per-domain URL datasets.
//!
//! Every mutation runs in one SQLite transaction that rewrites the affected
//! dataset rows and then recomputes the [`StoreMetadata`] document from the
//! `datasets` table, so a reader never observes metadata that disagrees with
//! the stored datasets.

use std::path::Path;
use std::time::Duration;

use clap::ValueEnum;
use log::{debug, info, warn};
use serde::Serialize;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::metadata::{load_metadata, refresh_metadata, summarize_datasets, StoreMetadata};
use super::migrations::run_migrations;
use super::pool::{init_db_pool_with_path, init_memory_pool};
use super::rows::{delete_dataset, load_dataset, replace_dataset};
use crate::app::{is_valid_archive_url, validate_domain};
use crate::config::METADATA_KEY;
use crate::dedup::{merge_records, RecordOrder};
use crate::error_handling::StoreError;
use crate::export::{
    parse_backup, parse_records, serialize_dataset, serialize_records, BackupDocument, DataFormat,
};
use crate::filter::{self, FilterCriteria};
use crate::models::{Dataset, UrlRecord};
use crate::timestamp::now_millis;

/// Ordering of [`DomainStore::list_domains`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DomainSort {
    /// Most recently updated first
    #[default]
    Date,
    /// Alphabetical
    Domain,
    /// Largest dataset first
    Urls,
}

impl DomainSort {
    fn order_clause(&self) -> &'static str {
        match self {
            DomainSort::Date => " ORDER BY fetched_at_ms DESC, domain ASC",
            DomainSort::Domain => " ORDER BY domain ASC",
            DomainSort::Urls => " ORDER BY url_count DESC, domain ASC",
        }
    }
}

/// One line of the stored-domain listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainListing {
    pub domain: String,
    pub url_count: usize,
    /// Epoch milliseconds of the last write
    pub last_updated: i64,
}

/// Approximate on-disk size of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub bytes_used: u64,
    pub page_count: u64,
    pub page_size: u64,
}

/// Keyed persistence of [`Dataset`]s plus the store-level summary.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DomainStore {
    pool: SqlitePool,
}

impl DomainStore {
    /// Opens (creating if needed) the database at `db_path` and applies
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be created, the connection
    /// fails, or a migration fails.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        info!("Opened URL store at {}", db_path.display());
        Ok(Self { pool })
    }

    /// A private in-memory store, discarded when the last clone is dropped.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = init_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Stores `records` as the dataset for `domain`, replacing any previous
    /// dataset entirely.
    ///
    /// Records sharing a case-insensitive URL are collapsed first (the most
    /// recent observation wins); the remaining records keep their order.
    ///
    /// # Returns
    ///
    /// The dataset as stored, with `fetched_at` set to now.
    pub async fn put(&self, domain: &str, records: Vec<UrlRecord>) -> Result<Dataset, StoreError> {
        let records = merge_records(records, RecordOrder::FirstSeen);
        let dataset = Dataset::new(domain, records, now_millis());
        self.write_datasets(std::slice::from_ref(&dataset)).await?;
        info!("Stored {} URLs for {}", dataset.count, domain);
        Ok(dataset)
    }

    /// Replaces several datasets in one transaction.
    async fn write_datasets(&self, datasets: &[Dataset]) -> Result<StoreMetadata, StoreError> {
        let mut tx = self.pool.begin().await?;
        for dataset in datasets {
            replace_dataset(&mut tx, dataset).await?;
        }
        let metadata = refresh_metadata(&mut tx).await?;
        tx.commit().await?;
        Ok(metadata)
    }

    /// Returns the dataset for `domain`, if one is stored.
    pub async fn get(&self, domain: &str) -> Result<Option<Dataset>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let dataset = load_dataset(&mut tx, domain).await?;
        tx.commit().await?;
        Ok(dataset)
    }

    /// Like [`get`](Self::get) but a missing dataset is `StoreError::NotFound`.
    pub async fn get_required(&self, domain: &str) -> Result<Dataset, StoreError> {
        self.get(domain)
            .await?
            .ok_or_else(|| StoreError::NotFound(domain.to_string()))
    }

    /// Removes the dataset for `domain`.
    ///
    /// # Returns
    ///
    /// `true` if a dataset was removed, `false` if none was stored.
    pub async fn delete(&self, domain: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let removed = delete_dataset(&mut tx, domain).await?;
        if removed {
            refresh_metadata(&mut tx).await?;
        }
        tx.commit().await?;
        if removed {
            info!("Deleted dataset for {domain}");
        }
        Ok(removed)
    }

    /// Lists stored domains with their sizes.
    ///
    /// # Arguments
    ///
    /// * `sort` - Ordering of the result
    /// * `search` - Optional case-insensitive substring the domain must contain;
    ///   blank means no filtering
    pub async fn list_domains(
        &self,
        sort: DomainSort,
        search: Option<&str>,
    ) -> Result<Vec<DomainListing>, StoreError> {
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT domain, url_count, fetched_at_ms FROM datasets");
        if let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query_builder.push(" WHERE instr(lower(domain), ");
            query_builder.push_bind(needle.to_lowercase());
            query_builder.push(") > 0");
        }
        query_builder.push(sort.order_clause());

        let rows = query_builder.build().fetch_all(&self.pool).await?;
        let mut listings = Vec::with_capacity(rows.len());
        for row in rows {
            let url_count: i64 = row.try_get("url_count")?;
            listings.push(DomainListing {
                domain: row.try_get("domain")?,
                url_count: usize::try_from(url_count).unwrap_or_default(),
                last_updated: row.try_get("fetched_at_ms")?,
            });
        }
        Ok(listings)
    }

    /// All stored domain names, alphabetically.
    pub async fn list_domain_names(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar("SELECT domain FROM datasets ORDER BY domain")
            .fetch_all(&self.pool)
            .await?;
        Ok(names)
    }

    /// Removes every dataset whose `fetched_at` is older than `max_age`.
    ///
    /// # Returns
    ///
    /// The number of datasets removed.
    pub async fn evict_older_than(&self, max_age: Duration) -> Result<usize, StoreError> {
        let age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_millis().saturating_sub(age_ms);

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "DELETE FROM dataset_urls
             WHERE domain IN (SELECT domain FROM datasets WHERE fetched_at_ms < ?)",
        )
        .bind(cutoff)
        .execute(&mut *tx)
        .await?;
        let removed = sqlx::query("DELETE FROM datasets WHERE fetched_at_ms < ?")
            .bind(cutoff)
            .execute(&mut *tx)
            .await?
            .rows_affected() as usize;
        if removed > 0 {
            refresh_metadata(&mut tx).await?;
        }
        tx.commit().await?;

        if removed > 0 {
            info!("Evicted {removed} dataset(s) older than {} days", max_age.as_secs() / 86_400);
        }
        Ok(removed)
    }

    /// Removes every dataset.
    ///
    /// # Returns
    ///
    /// The number of datasets removed.
    pub async fn clear_all(&self) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM dataset_urls")
            .execute(&mut *tx)
            .await?;
        let removed = sqlx::query("DELETE FROM datasets")
            .execute(&mut *tx)
            .await?
            .rows_affected() as usize;
        sqlx::query("DELETE FROM store_metadata WHERE key = ?")
            .bind(METADATA_KEY)
            .execute(&mut *tx)
            .await?;
        refresh_metadata(&mut tx).await?;
        tx.commit().await?;
        info!("Cleared {removed} dataset(s)");
        Ok(removed)
    }

    /// Returns the store summary.
    ///
    /// The stored document is checked against the `datasets` table; if it is
    /// missing, unreadable, or disagrees, it is recomputed and rewritten
    /// before being returned.
    pub async fn metadata(&self) -> Result<StoreMetadata, StoreError> {
        let mut tx = self.pool.begin().await?;
        let stored = load_metadata(&mut tx).await?;
        let actual = summarize_datasets(&mut tx).await?;
        tx.commit().await?;

        match stored {
            Some(metadata) if metadata.domains == actual && metadata.is_self_consistent() => {
                Ok(metadata)
            }
            Some(_) => {
                warn!("Store metadata disagrees with stored datasets, rebuilding");
                self.rebuild_metadata().await
            }
            None => {
                debug!("No store metadata yet, writing it");
                self.rebuild_metadata().await
            }
        }
    }

    async fn rebuild_metadata(&self) -> Result<StoreMetadata, StoreError> {
        let mut tx = self.pool.begin().await?;
        // Take the write lock before reading
        sqlx::query("UPDATE store_metadata SET payload = payload WHERE key = ?")
            .bind(METADATA_KEY)
            .execute(&mut *tx)
            .await?;
        let metadata = refresh_metadata(&mut tx).await?;
        tx.commit().await?;
        Ok(metadata)
    }

    /// Database size from SQLite's page accounting.
    pub async fn usage(&self) -> Result<StorageUsage, StoreError> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;
        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await?;
        let page_count = u64::try_from(page_count).unwrap_or_default();
        let page_size = u64::try_from(page_size).unwrap_or_default();
        Ok(StorageUsage {
            bytes_used: page_count * page_size,
            page_count,
            page_size,
        })
    }

    /// Records of `domain` passing `criteria`, in stored order.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when no dataset is stored for `domain`.
    pub async fn search(
        &self,
        domain: &str,
        criteria: &FilterCriteria,
    ) -> Result<Vec<UrlRecord>, StoreError> {
        let dataset = self.get_required(domain).await?;
        Ok(filter::apply(&dataset.records, criteria))
    }

    /// Serializes the dataset for `domain` in `format`.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when no dataset is stored for `domain`.
    pub async fn export_domain(&self, domain: &str, format: DataFormat) -> Result<String, StoreError> {
        let dataset = self.get_required(domain).await?;
        serialize_dataset(&dataset, format)
    }

    /// Serializes only the records of `domain` passing `criteria`.
    ///
    /// Empty criteria export the whole dataset exactly like
    /// [`export_domain`](Self::export_domain). Otherwise JSON output is a bare
    /// array of records; text and CSV carry the matching rows.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` when no dataset is stored for `domain`.
    pub async fn export_filtered(
        &self,
        domain: &str,
        format: DataFormat,
        criteria: &FilterCriteria,
    ) -> Result<String, StoreError> {
        let dataset = self.get_required(domain).await?;
        if criteria.is_empty() {
            return serialize_dataset(&dataset, format);
        }
        let records = filter::apply(&dataset.records, criteria);
        debug!(
            "Exporting {} of {} records for {domain}",
            records.len(),
            dataset.count
        );
        serialize_records(&records, format)
    }

    /// Replaces the dataset for `domain` with the records decoded from `data`.
    ///
    /// Rows whose URL is not an absolute http(s) URL are dropped.
    ///
    /// # Returns
    ///
    /// The number of records stored.
    ///
    /// # Errors
    ///
    /// `StoreError::Import` when the payload is unreadable or yields no valid
    /// URL; the existing dataset is left untouched in that case.
    pub async fn import_domain(
        &self,
        domain: &str,
        data: &str,
        format: DataFormat,
    ) -> Result<usize, StoreError> {
        let candidates = parse_records(data, format)?;
        let total = candidates.len();
        let valid = keep_valid(candidates);
        if valid.is_empty() {
            return Err(StoreError::Import(
                "No valid URLs found in import data".to_string(),
            ));
        }
        if valid.len() < total {
            debug!("Dropped {} invalid rows from {format} import", total - valid.len());
        }

        let dataset = self.put(domain, valid).await?;
        Ok(dataset.count)
    }

    /// Serializes every dataset into one backup document.
    pub async fn export_all(&self) -> Result<String, StoreError> {
        let mut tx = self.pool.begin().await?;
        let domains: Vec<String> = sqlx::query_scalar("SELECT domain FROM datasets ORDER BY domain")
            .fetch_all(&mut *tx)
            .await?;
        let mut datasets = Vec::with_capacity(domains.len());
        for domain in &domains {
            if let Some(dataset) = load_dataset(&mut tx, domain).await? {
                datasets.push(dataset);
            }
        }
        tx.commit().await?;

        BackupDocument::new(datasets).to_json()
    }

    /// Restores datasets from a backup document written by
    /// [`export_all`](Self::export_all).
    ///
    /// Each restored domain replaces its current dataset; domains not in the
    /// backup are kept. All datasets are written in one transaction. Entries
    /// with an invalid domain name or no valid URL are skipped.
    ///
    /// # Returns
    ///
    /// The number of datasets restored.
    ///
    /// # Errors
    ///
    /// `StoreError::Import` when the document is unreadable, or when it has
    /// entries but none of them can be restored.
    pub async fn import_all(&self, data: &str) -> Result<usize, StoreError> {
        let restored = parse_backup(data)?;
        let entries = restored.len();
        let now = now_millis();

        let mut datasets = Vec::with_capacity(entries);
        for entry in restored {
            let Some(domain) = validate_domain(&entry.domain) else {
                warn!("Skipping backup entry with invalid domain {:?}", entry.domain);
                continue;
            };
            let records = keep_valid(entry.records);
            if records.is_empty() {
                warn!("Skipping backup entry {domain}: no valid URLs");
                continue;
            }
            let records = merge_records(records, RecordOrder::FirstSeen);
            datasets.push(Dataset::new(domain, records, entry.fetched_at.unwrap_or(now)));
        }

        if datasets.is_empty() && entries > 0 {
            return Err(StoreError::Import(
                "No valid datasets found in backup".to_string(),
            ));
        }

        self.write_datasets(&datasets).await?;
        info!("Restored {} dataset(s) from backup", datasets.len());
        Ok(datasets.len())
    }
}

fn keep_valid(records: Vec<UrlRecord>) -> Vec<UrlRecord> {
    records
        .into_iter()
        .filter(|record| is_valid_archive_url(&record.url))
        .collect()
}
