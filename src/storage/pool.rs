//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pool with:
//! - WAL mode enabled so readers never block the single writer
//! - A busy timeout so concurrent writers queue instead of failing
//! - Automatic database file creation

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use log::{error, info};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DB_BUSY_TIMEOUT_SECS;
use crate::error_handling::StoreError;

/// Initializes a connection pool for the database file at `db_path`.
///
/// Creates the file if it doesn't exist.
///
/// # Errors
///
/// Returns `StoreError::FileCreation` when the file cannot be created and
/// `StoreError::Database` when the connection fails.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<SqlitePool, StoreError> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Database file created at {}", db_path.display()),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Using existing database file {}", db_path.display())
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(StoreError::FileCreation(format!(
                "{}: {e}",
                db_path.display()
            )));
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(DB_BUSY_TIMEOUT_SECS))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            StoreError::Database(e)
        })
}

/// Initializes a private in-memory database.
///
/// Each SQLite connection to `:memory:` is its own database, so the pool holds
/// exactly one connection and never recycles it.
pub async fn init_memory_pool() -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_pool_creates_database() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("urls.db");
        assert!(!path.exists());

        let pool = init_db_pool_with_path(&path)
            .await
            .expect("Failed to open pool");
        assert!(path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .expect("Failed to read journal mode");
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[tokio::test]
    async fn test_file_pool_reopens_existing_database() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("urls.db");
        init_db_pool_with_path(&path).await.expect("first open");
        init_db_pool_with_path(&path).await.expect("second open");
    }

    #[tokio::test]
    async fn test_missing_parent_directory_is_file_creation_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("missing").join("urls.db");
        let result = init_db_pool_with_path(&path).await;
        assert!(matches!(result, Err(StoreError::FileCreation(_))));
    }

    #[tokio::test]
    async fn test_memory_pool_keeps_state_between_queries() {
        let pool = init_memory_pool().await.expect("Failed to open pool");
        sqlx::query("CREATE TABLE t (v INTEGER)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO t (v) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
