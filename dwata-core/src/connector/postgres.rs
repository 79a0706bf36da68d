//! PostgreSQL source connections.
//!
//! Pools are opened with the safety posture applied to every new session:
//! a statement timeout and, when configured, read-only transactions.
//! Enumeration is limited to base tables in the connection's default
//! schema, matching what callers see without qualifying names.

use async_trait::async_trait;
use sqlx::{Executor, PgPool};
use sqlx::postgres::PgPoolOptions;

use super::{Connection, ConnectionConfig};
use crate::error::{DwataError, Result, redact_database_url};

/// Open handle onto one PostgreSQL database.
pub struct PostgresSourceConnection {
    pool: PgPool,
}

impl PostgresSourceConnection {
    /// Connects to the database behind `db_url`.
    pub(crate) async fn open(db_url: &str, config: &ConnectionConfig) -> Result<Self> {
        let query_timeout_secs = config.query_timeout.as_secs();
        let read_only = config.read_only;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET statement_timeout = '{query_timeout_secs}s'").as_str(),
                    )
                    .await?;
                    if read_only {
                        conn.execute("SET default_transaction_read_only = on").await?;
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
impl Connection for PostgresSourceConnection {
    async fn table_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT table_name
            FROM information_schema.tables
            WHERE table_type = 'BASE TABLE'
            AND table_schema = current_schema()
            ORDER BY table_name
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DwataError::connection_failed("failed to enumerate PostgreSQL tables", e))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
