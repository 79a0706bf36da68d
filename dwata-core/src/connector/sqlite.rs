//! SQLite source connections.
//!
//! SQLite is file-based, so a single pooled connection is sufficient and
//! no network is involved. Accepts `sqlite:` URLs, bare database file
//! paths, and `:memory:`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::{Connection, ConnectionConfig};
use crate::error::{DwataError, Result};

/// Open handle onto one SQLite database.
pub struct SqliteSourceConnection {
    pool: SqlitePool,
}

impl SqliteSourceConnection {
    /// Opens the database behind `db_url`, read-only when configured.
    pub(crate) async fn open(db_url: &str, config: &ConnectionConfig) -> Result<Self> {
        let normalized = normalize_connection_string(db_url);
        let mut options = SqliteConnectOptions::from_str(&normalized).map_err(|e| {
            DwataError::configuration(format!("invalid SQLite connection string: {e}"))
        })?;
        if config.read_only {
            options = options.read_only(true);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| DwataError::connection_failed("failed to open SQLite database", e))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Connection for SqliteSourceConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table'
            AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DwataError::connection_failed("failed to enumerate SQLite tables", e))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Normalizes file paths and `:memory:` shorthand to `sqlite:` URLs.
fn normalize_connection_string(db_url: &str) -> String {
    if db_url == ":memory:" {
        return "sqlite::memory:".to_string();
    }
    if db_url.starts_with("sqlite:") {
        return db_url.to_string();
    }
    format!("sqlite://{db_url}")
}
