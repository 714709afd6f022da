use anyhow::{Context, Result};
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::{future::Future, path::Path, str::FromStr, time::Duration};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::{
    fs::create_dir_all,
    sync::{mpsc, oneshot},
};

use super::{LocationQuery, NewLocationQuery};

type WriteOperation = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;

/// Runs writes one at a time on a dedicated task so SQLite never sees two
/// writers at once.
pub struct DatabaseWriter {
    write_tx: mpsc::UnboundedSender<WriteOperation>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Default for DatabaseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseWriter {
    pub fn new() -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<WriteOperation>();

        let handle = tokio::spawn(async move {
            while let Some(future) = write_rx.recv().await {
                future.await;
            }
        });

        Self {
            write_tx,
            _handle: handle,
        }
    }

    pub async fn execute<T, F, Fut>(&self, pool: SqlitePool, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<Result<T>>();

        let write_op = Box::pin(async move {
            let result = operation(pool).await;
            let _ = result_tx.send(result);
        });

        self.write_tx
            .send(write_op)
            .map_err(|_| anyhow::anyhow!("Database writer channel closed"))?;

        result_rx
            .await
            .map_err(|_| anyhow::anyhow!("Failed to receive write result"))?
    }
}

pub struct Database {
    pool: SqlitePool,
    writer: DatabaseWriter,
}

impl Database {
    /// Open (creating if needed) `{data_dir}/soilcast.sqlite` and migrate it.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let db_path = format!("{}/soilcast.sqlite", data_dir);

        if let Some(parent) = Path::new(&db_path).parent() {
            create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create database directory: {parent:?}"))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))?
            .create_if_missing(true)
            .pragma("journal_mode", "WAL")
            .pragma("synchronous", "NORMAL")
            .pragma("busy_timeout", "5000")
            .pragma("temp_store", "MEMORY");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let db = Self::with_pool(pool).await?;
        info!("SQLite database initialized at: {}", db_path);
        Ok(db)
    }

    /// A private database that lives as long as the returned value.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // every connection to :memory: is its own database, so keep exactly one alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self {
            pool,
            writer: DatabaseWriter::new(),
        };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Database connectivity check failed")?;

        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await
            .context("Database integrity check failed")?;
        if result != "ok" {
            return Err(anyhow::anyhow!(
                "Database integrity check failed: {}",
                result
            ));
        }

        Ok(())
    }

    /// Flush the WAL into the main file before shutdown.
    pub async fn checkpoint(&self) {
        match sqlx::query("PRAGMA wal_checkpoint(TRUNCATE);")
            .execute(&self.pool)
            .await
        {
            Ok(_) => info!("WAL checkpoint completed successfully"),
            Err(e) => log::error!("WAL checkpoint failed: {}", e),
        }
    }

    pub async fn record_location(&self, entry: NewLocationQuery) -> Result<LocationQuery> {
        let pool = self.pool.clone();
        let created_at = OffsetDateTime::now_utc();
        let stamp = created_at.format(&Rfc3339)?;

        let inserted = entry.clone();
        let id = self
            .writer
            .execute(pool, move |pool| async move {
                let result = sqlx::query(
                    "INSERT INTO location_queries (created_at, query_text, lat, lon, display_name)
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(&stamp)
                .bind(&inserted.query_text)
                .bind(inserted.lat)
                .bind(inserted.lon)
                .bind(&inserted.display_name)
                .execute(&pool)
                .await?;
                Ok(result.last_insert_rowid())
            })
            .await?;

        Ok(LocationQuery {
            id,
            created_at,
            query_text: entry.query_text,
            lat: entry.lat,
            lon: entry.lon,
            display_name: entry.display_name,
        })
    }

    /// Most recent lookups first
    pub async fn recent_locations(&self, limit: u32) -> Result<Vec<LocationQuery>> {
        let rows = sqlx::query(
            "SELECT id, created_at, query_text, lat, lon, display_name
             FROM location_queries
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<LocationQuery> {
                let created_at: String = row.try_get("created_at")?;
                Ok(LocationQuery {
                    id: row.try_get("id")?,
                    created_at: OffsetDateTime::parse(&created_at, &Rfc3339)
                        .with_context(|| format!("bad created_at: {}", created_at))?,
                    query_text: row.try_get("query_text")?,
                    lat: row.try_get("lat")?,
                    lon: row.try_get("lon")?,
                    display_name: row.try_get("display_name")?,
                })
            })
            .collect()
    }
}
