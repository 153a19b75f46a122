//! Dataset row I/O inside a transaction.

use sqlx::{Row, SqliteConnection};

use crate::error_handling::StoreError;
use crate::models::{Dataset, UrlRecord};

/// Columns written per record row.
const RECORD_COLUMNS: [&str; 5] = ["domain", "position", "url", "observed_at", "status_code"];

/// Rows per INSERT statement. Keeps bind parameters far below SQLite's limit.
const INSERT_CHUNK_ROWS: usize = 500;

/// Builds a multi-row INSERT statement with `?` placeholders.
///
/// ```rust,ignore
/// let query = build_batch_insert_query("t", &["a", "b"], 2);
/// // "INSERT INTO t (a, b) VALUES (?, ?), (?, ?)"
/// ```
pub(crate) fn build_batch_insert_query(
    table_name: &str,
    columns: &[&str],
    row_count: usize,
) -> String {
    if row_count == 0 {
        return String::new();
    }

    let placeholder = format!(
        "({})",
        columns.iter().map(|_| "?").collect::<Vec<_>>().join(", ")
    );
    let placeholders: Vec<&str> = (0..row_count).map(|_| placeholder.as_str()).collect();

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table_name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Replaces the dataset row and all record rows for `dataset.domain`.
///
/// The first statement is a write, so the transaction holds the write lock
/// before anything is read.
pub(crate) async fn replace_dataset(
    conn: &mut SqliteConnection,
    dataset: &Dataset,
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM dataset_urls WHERE domain = ?")
        .bind(&dataset.domain)
        .execute(&mut *conn)
        .await?;

    sqlx::query(
        "INSERT INTO datasets (domain, fetched_at_ms, url_count) VALUES (?, ?, ?)
         ON CONFLICT(domain) DO UPDATE SET
            fetched_at_ms = excluded.fetched_at_ms,
            url_count = excluded.url_count",
    )
    .bind(&dataset.domain)
    .bind(dataset.fetched_at)
    .bind(dataset.records.len() as i64)
    .execute(&mut *conn)
    .await?;

    for (chunk_index, chunk) in dataset.records.chunks(INSERT_CHUNK_ROWS).enumerate() {
        let sql = build_batch_insert_query("dataset_urls", &RECORD_COLUMNS, chunk.len());
        let mut query = sqlx::query(&sql);
        for (offset, record) in chunk.iter().enumerate() {
            let position = (chunk_index * INSERT_CHUNK_ROWS + offset) as i64;
            query = query
                .bind(&dataset.domain)
                .bind(position)
                .bind(&record.url)
                .bind(&record.observed_at)
                .bind(i64::from(record.status_code));
        }
        query.execute(&mut *conn).await?;
    }

    Ok(())
}

/// Deletes one dataset. Returns `true` when it existed.
pub(crate) async fn delete_dataset(
    conn: &mut SqliteConnection,
    domain: &str,
) -> Result<bool, StoreError> {
    sqlx::query("DELETE FROM dataset_urls WHERE domain = ?")
        .bind(domain)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM datasets WHERE domain = ?")
        .bind(domain)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Loads one dataset with its records in stored order.
pub(crate) async fn load_dataset(
    conn: &mut SqliteConnection,
    domain: &str,
) -> Result<Option<Dataset>, StoreError> {
    let header = sqlx::query("SELECT fetched_at_ms FROM datasets WHERE domain = ?")
        .bind(domain)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(header) = header else {
        return Ok(None);
    };
    let fetched_at: i64 = header.try_get("fetched_at_ms")?;

    let rows = sqlx::query(
        "SELECT url, observed_at, status_code FROM dataset_urls
         WHERE domain = ? ORDER BY position",
    )
    .bind(domain)
    .fetch_all(&mut *conn)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let status: i64 = row.try_get("status_code")?;
        records.push(UrlRecord {
            url: row.try_get("url")?,
            observed_at: row.try_get("observed_at")?,
            status_code: u16::try_from(status).unwrap_or_default(),
        });
    }

    Ok(Some(Dataset::new(domain, records, fetched_at)))
}
