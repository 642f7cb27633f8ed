//! SQLite store: connection pool and schema bootstrap

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::{config::DatabaseConfig, error::AppResult};

/// Schema statements, applied in order on every startup
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS books (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        isbn TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS book_authors (
        book_id INTEGER NOT NULL,
        author_id INTEGER NOT NULL,
        PRIMARY KEY (book_id, author_id),
        FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
        FOREIGN KEY (author_id) REFERENCES authors(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors (author_id)",
];

/// Store handle, built once at startup and shared by the repositories
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool and bring the schema up to date
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        tracing::info!(url = %config.url, "Opening database");

        let mut options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            // SQLite leaves foreign keys off unless asked; cascades depend on them
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(5));

        if config.is_in_memory() {
            // An in-memory database lives exactly as long as its connection
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.idle_timeout(Some(Duration::from_secs(600)));
        }

        let pool = pool_options.connect_with(options).await?;
        let db = Self { pool };
        db.bootstrap().await?;

        tracing::info!("Database ready");
        Ok(db)
    }

    /// Private in-memory store with the schema applied
    pub async fn in_memory() -> AppResult<Self> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    async fn bootstrap(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!(statements = SCHEMA.len(), "Schema bootstrapped");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// True when the store answers a trivial query
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        tracing::info!("Closing database pool");
        self.pool.close().await;
    }
}
