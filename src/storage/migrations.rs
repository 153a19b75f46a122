// storage/migrations.rs
// Schema migrations for the URL store

use sqlx::SqlitePool;

use crate::error_handling::StoreError;

/// Runs SQLx migrations located in the `migrations/` directory.
///
/// Idempotent: already-applied migrations are skipped.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    let migrations_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir.as_path()).await?;
    migrator.run(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::pool::init_memory_pool;

    #[tokio::test]
    async fn test_migrations_create_tables_and_are_idempotent() {
        let pool = init_memory_pool().await.expect("Failed to open pool");
        run_migrations(&pool).await.expect("first run");
        run_migrations(&pool).await.expect("second run");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '_sqlx%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("Failed to list tables");
        assert_eq!(tables, vec!["dataset_urls", "datasets", "store_metadata"]);
    }
}
