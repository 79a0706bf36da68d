//! SQLite-backed metadata store over the system database.
//!
//! Tables are created idempotently on connect; re-running the bootstrap
//! against an existing system database is a no-op. Table records carry
//! their structured attributes as serialized JSON text.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::MetadataStore;
use crate::error::{DwataError, Result};
use crate::models::{DataSourceRecord, TableRecord};

/// Metadata store backed by a SQLite database.
///
/// Cloning shares the underlying pool, so a clone can be handed to the
/// reflector while the original keeps answering queries.
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Opens (creating if missing) the system database and bootstraps its
    /// schema.
    ///
    /// # Errors
    /// Returns [`DwataError::Configuration`] for an invalid URL and
    /// [`DwataError::Metadata`] when the database cannot be opened or the
    /// schema bootstrap fails.
    pub async fn connect(db_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| {
                DwataError::configuration(format!("invalid system database URL: {e}"))
            })?
            .create_if_missing(true);

        // A single connection keeps in-memory databases alive for the
        // lifetime of the store and is plenty for metadata traffic.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<std::time::Duration>)
            .max_lifetime(None::<std::time::Duration>)
            .connect_with(options)
            .await
            .map_err(|e| DwataError::metadata("failed to open the system database", e))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Opens an in-memory store, used by tests and throwaway tooling.
    ///
    /// # Errors
    /// Returns [`DwataError::Metadata`] when the bootstrap fails.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Registers a data source label and returns its new record.
    ///
    /// This lives on the concrete store, not on [`MetadataStore`]:
    /// registration is the responsibility of the collaborator that manages
    /// configured sources, never of the reflector.
    ///
    /// # Errors
    /// Returns [`DwataError::Metadata`] when the insert fails, including
    /// on a duplicate label.
    pub async fn insert_data_source(&self, label: &str) -> Result<DataSourceRecord> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO dwata_meta_data_sources (label, created_at) VALUES (?, ?)",
        )
        .bind(label)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DwataError::metadata(format!("failed to register data source '{label}'"), e)
        })?;

        Ok(DataSourceRecord {
            id: result.last_insert_rowid(),
            label: label.to_string(),
            created_at,
        })
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS dwata_meta_data_sources (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                label TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DwataError::metadata("failed to create data sources table", e))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS dwata_meta_tables (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                data_source_id INTEGER NOT NULL
                    REFERENCES dwata_meta_data_sources (id),
                table_name TEXT NOT NULL,
                attributes TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DwataError::metadata("failed to create tables table", e))?;

        Ok(())
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn find_data_source_by_label(&self, label: &str) -> Result<Option<DataSourceRecord>> {
        let row = sqlx::query(
            "SELECT id, label, created_at FROM dwata_meta_data_sources WHERE label = ?",
        )
        .bind(label)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DwataError::metadata(format!("failed to look up data source '{label}'"), e)
        })?;

        row.map(|row| data_source_from_row(&row)).transpose()
    }

    async fn insert_table_record(
        &self,
        data_source_id: i64,
        table_name: &str,
        attributes: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        let attributes_json = serde_json::to_string(&attributes).map_err(|e| {
            DwataError::metadata(
                format!("failed to serialize attributes for table '{table_name}'"),
                e,
            )
        })?;

        sqlx::query(
            r"
            INSERT INTO dwata_meta_tables (data_source_id, table_name, attributes, created_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(data_source_id)
        .bind(table_name)
        .bind(attributes_json)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DwataError::metadata(format!("failed to record table '{table_name}'"), e)
        })?;

        Ok(())
    }

    async fn list_table_records(&self, data_source_id: i64) -> Result<Vec<TableRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, data_source_id, table_name, attributes, created_at
            FROM dwata_meta_tables
            WHERE data_source_id = ?
            ORDER BY id
            ",
        )
        .bind(data_source_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DwataError::metadata("failed to list table records", e))?;

        rows.iter().map(table_record_from_row).collect()
    }
}

fn data_source_from_row(row: &SqliteRow) -> Result<DataSourceRecord> {
    Ok(DataSourceRecord {
        id: row
            .try_get("id")
            .map_err(|e| DwataError::metadata("failed to read data source id", e))?,
        label: row
            .try_get("label")
            .map_err(|e| DwataError::metadata("failed to read data source label", e))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| DwataError::metadata("failed to read data source timestamp", e))?,
    })
}

fn table_record_from_row(row: &SqliteRow) -> Result<TableRecord> {
    let attributes_json: String = row
        .try_get("attributes")
        .map_err(|e| DwataError::metadata("failed to read table attributes", e))?;
    let attributes = serde_json::from_str(&attributes_json)
        .map_err(|e| DwataError::metadata("failed to parse table attributes", e))?;

    Ok(TableRecord {
        id: row
            .try_get("id")
            .map_err(|e| DwataError::metadata("failed to read table record id", e))?,
        data_source_id: row
            .try_get("data_source_id")
            .map_err(|e| DwataError::metadata("failed to read owning data source id", e))?,
        table_name: row
            .try_get("table_name")
            .map_err(|e| DwataError::metadata("failed to read table name", e))?,
        attributes,
        created_at: row
            .try_get("created_at")
            .map_err(|e| DwataError::metadata("failed to read table record timestamp", e))?,
    })
}
