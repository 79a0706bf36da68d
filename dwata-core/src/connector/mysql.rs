//! MySQL source connections.
//!
//! Enumeration reads `INFORMATION_SCHEMA.TABLES` for the connection's
//! default database. Names are cast to CHAR to avoid VARBINARY results
//! on MySQL 8.0+.

use async_trait::async_trait;
use sqlx::{Executor, MySqlPool};
use sqlx::mysql::MySqlPoolOptions;

use super::{Connection, ConnectionConfig};
use crate::error::{DwataError, Result, redact_database_url};

/// Open handle onto one MySQL database.
pub struct MySqlSourceConnection {
    pool: MySqlPool,
}

impl MySqlSourceConnection {
    /// Connects to the database behind `db_url`.
    pub(crate) async fn open(db_url: &str, config: &ConnectionConfig) -> Result<Self> {
        let query_timeout_ms = config.query_timeout.as_millis();
        let read_only = config.read_only;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET SESSION max_execution_time = {query_timeout_ms}").as_str(),
                    )
                    .await?;
                    if read_only {
                        conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                    }
                    Ok(())
                })
            })
            .connect(db_url)
            .await
            .map_err(|e| {
                DwataError::connection_failed(
                    format!("failed to connect to {}", redact_database_url(db_url)),
                    e,
                )
            })?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Connection for MySqlSourceConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = DATABASE()
            AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DwataError::connection_failed("failed to enumerate MySQL tables", e))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
