//! Durable metadata records for known data sources and their tables.
//!
//! The reflector only depends on the [`MetadataStore`] trait; the SQLite
//! implementation in [`sqlite`] backs it with the system database.
//! Creating [`DataSourceRecord`]s is NOT part of the trait: sources are
//! registered by an external collaborator before reflection runs, and the
//! reflector treats an absent record as a precondition violation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{DataSourceRecord, TableRecord};

pub mod sqlite;

pub use sqlite::SqliteMetadataStore;

/// Insert/select operations the reflection core needs from durable storage.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Looks up the data source record for a label.
    ///
    /// # Errors
    /// Returns [`crate::DwataError::Metadata`] when the store itself fails;
    /// an absent record is `Ok(None)`, not an error.
    async fn find_data_source_by_label(&self, label: &str) -> Result<Option<DataSourceRecord>>;

    /// Appends one reflected table row.
    ///
    /// No existence check is performed; repeated reflection of the same
    /// source accumulates duplicate rows by design.
    ///
    /// # Errors
    /// Returns [`crate::DwataError::Metadata`] when the insert fails.
    async fn insert_table_record(
        &self,
        data_source_id: i64,
        table_name: &str,
        attributes: serde_json::Value,
        created_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Lists the table rows recorded for a data source, oldest first.
    ///
    /// # Errors
    /// Returns [`crate::DwataError::Metadata`] when the select fails.
    async fn list_table_records(&self, data_source_id: i64) -> Result<Vec<TableRecord>>;
}
