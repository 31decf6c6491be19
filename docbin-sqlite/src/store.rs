//! SQLite storage backend.
//!
//! Each collection is a table with a fixed shape:
//!
//! | column    | type | notes                                        |
//! |-----------|------|----------------------------------------------|
//! | `id`      | TEXT | primary key, supplied by the caller          |
//! | `data`    | JSON | normalized with `json()` on every write      |
//! | `created` | TEXT | engine default, RFC 3339 UTC with millis     |
//! | `updated` | TEXT | engine default, strictly advanced by updates |

use async_trait::async_trait;
use std::{str::FromStr, time::Duration};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, trace};

use docbin_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::RawDocument,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{ListQuery, Predicate},
};

use crate::{identifier::quote_identifier, query::CompiledFilter};

/// Engine expression producing the current time in the store's timestamp format.
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Next `updated` value: the current time, or one millisecond past the previous value when
/// the clock has not moved on.
const NEXT_UPDATED: &str =
    "max(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), strftime('%Y-%m-%dT%H:%M:%fZ', updated, '+0.001 seconds'))";

/// Default number of pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;
/// Default time a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Row = (String, String, String, String);

/// SQLite-backed document storage.
///
/// Cloning is cheap and clones share the connection pool. Concurrent writers are serialized
/// by the engine; the busy timeout bounds how long a statement waits for the write lock.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a builder for a database at `url`, e.g. `sqlite://data.db`.
    pub fn builder(url: &str) -> SqliteStoreBuilder {
        SqliteStoreBuilder::new(url)
    }

    /// Returns the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn storage_error(err: sqlx::Error) -> DocumentStoreError {
    DocumentStoreError::Storage(err.to_string())
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn into_raw((id, data, created, updated): Row) -> RawDocument {
    RawDocument {
        id,
        data,
        created,
        updated,
    }
}

#[async_trait]
impl StoreBackend for SqliteStore {
    async fn ensure_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                data JSON NOT NULL,
                created TEXT NOT NULL DEFAULT ({NOW}),
                updated TEXT NOT NULL DEFAULT ({NOW})
            )",
            quote_identifier(name)
        );

        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn count_documents(&self, collection: &str, filter: &[Predicate]) -> DocumentStoreResult<usize> {
        let compiled = CompiledFilter::compile(filter)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            quote_identifier(collection),
            compiled.where_clause()
        );
        debug!("Count query: {}", sql);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &compiled.values {
            query = query.bind(value.as_str());
        }

        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    async fn list_documents(&self, collection: &str, query: &ListQuery) -> DocumentStoreResult<Vec<RawDocument>> {
        let compiled = CompiledFilter::compile(&query.filter)?;
        let sql = format!(
            "SELECT id, data, created, updated FROM {}{} ORDER BY created DESC, rowid DESC LIMIT ? OFFSET ?",
            quote_identifier(collection),
            compiled.where_clause()
        );
        debug!("List query: {}", sql);

        let mut select = sqlx::query_as::<_, Row>(&sql);
        for value in &compiled.values {
            select = select.bind(value.as_str());
        }

        Ok(select
            .bind(to_i64(query.pagination.limit))
            .bind(to_i64(query.pagination.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?
            .into_iter()
            .map(into_raw)
            .collect())
    }

    async fn get_document(&self, collection: &str, id: &str) -> DocumentStoreResult<Option<RawDocument>> {
        let sql = format!(
            "SELECT id, data, created, updated FROM {} WHERE id = ?",
            quote_identifier(collection)
        );

        Ok(sqlx::query_as::<_, Row>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?
            .map(into_raw))
    }

    async fn insert_document(&self, collection: &str, id: &str, payload: &str) -> DocumentStoreResult<()> {
        let sql = format!(
            "INSERT INTO {} (id, data) VALUES (?, json(?))",
            quote_identifier(collection)
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        trace!("Inserted document {} into {}", id, collection);

        Ok(())
    }

    async fn update_document(&self, collection: &str, id: &str, payload: &str) -> DocumentStoreResult<u64> {
        let sql = format!(
            "UPDATE {} SET data = json(?), updated = {NEXT_UPDATED} WHERE id = ?",
            quote_identifier(collection)
        );

        Ok(sqlx::query(&sql)
            .bind(payload)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?
            .rows_affected())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> DocumentStoreResult<u64> {
        let sql = format!("DELETE FROM {} WHERE id = ?", quote_identifier(collection));

        Ok(sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?
            .rows_affected())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.pool.close().await;
        debug!("Connection pool closed");

        Ok(())
    }
}

/// Builder for [`SqliteStore`].
///
/// The database file is created if missing and opened in WAL mode so readers do not block
/// the writer.
///
/// ```ignore
/// use docbin::{backend::StoreBackendBuilder, sqlite::SqliteStore};
///
/// let store = SqliteStore::builder("sqlite://data.db")
///     .with_max_connections(16)
///     .build()
///     .await?;
/// ```
pub struct SqliteStoreBuilder {
    url: String,
    max_connections: u32,
    busy_timeout: Duration,
}

impl SqliteStoreBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Sets the maximum number of pooled connections.
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Sets how long a statement waits for a locked database.
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for SqliteStoreBuilder {
    type Backend = SqliteStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(self.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        debug!(
            "Opened {} with up to {} connections",
            self.url, self.max_connections
        );

        Ok(SqliteStore::new(pool))
    }
}
