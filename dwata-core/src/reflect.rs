//! Schema reflection: synchronize the metadata store's table inventory
//! with the live schema of one or more database sources.
//!
//! A refresh batch is strictly sequential and all-or-nothing: the first
//! precondition violation or connection fault aborts the remaining
//! labels. Work for a label fully completes, including the connection
//! close, before the next label starts. Inserts are append-only; there is
//! no transaction around the insert loop and no mutual exclusion between
//! overlapping refreshes of the same label.

use std::time::Instant;

use chrono::Utc;

use crate::connector::{Connection, Connector};
use crate::error::{DwataError, Result, redact_database_url};
use crate::models::{DataSourceRecord, RefreshOutcome, SourceKind};
use crate::registry::SourceRegistry;
use crate::settings::SourceSettings;
use crate::store::MetadataStore;

/// Drives live schema introspection into the metadata store.
pub struct SchemaReflector {
    registry: SourceRegistry,
    connector: Box<dyn Connector>,
    store: Box<dyn MetadataStore>,
}

impl SchemaReflector {
    /// Creates a reflector over a registry, a connector, and a store.
    #[must_use]
    pub fn new(
        registry: SourceRegistry,
        connector: Box<dyn Connector>,
        store: Box<dyn MetadataStore>,
    ) -> Self {
        Self {
            registry,
            connector,
            store,
        }
    }

    /// The registry this reflector resolves labels against.
    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Reflects each labeled database source into the metadata store.
    ///
    /// Labels are processed sequentially against one registry snapshot.
    /// Every enumerated table becomes a fresh [`crate::models::TableRecord`]
    /// with empty attributes; nothing is deduplicated against earlier
    /// refreshes.
    ///
    /// # Errors
    ///
    /// The whole batch aborts on the first failing label with one of:
    /// [`DwataError::UnknownSource`], [`DwataError::NotADatabaseSource`],
    /// [`DwataError::MissingDataSourceRecord`], or
    /// [`DwataError::Connection`]. Labels after the failing one are not
    /// touched; labels before it keep their inserted records.
    pub async fn refresh(&self, labels: &[String]) -> Result<RefreshOutcome> {
        let started = Instant::now();
        let snapshot = self.registry.list_all_sources();
        let mut tables_recorded = 0;

        for label in labels {
            let descriptor = snapshot
                .iter()
                .find(|source| &source.label == label)
                .ok_or_else(|| DwataError::unknown_source(label))?;

            if descriptor.kind != SourceKind::Database {
                return Err(DwataError::not_a_database_source(label));
            }

            let db_url = match self.registry.resolve_source_settings(label)? {
                SourceSettings::Database(db) => db.db_url,
                SourceSettings::Service(_) => {
                    return Err(DwataError::not_a_database_source(label));
                }
            };

            let record = self
                .store
                .find_data_source_by_label(label)
                .await?
                .ok_or_else(|| DwataError::missing_data_source_record(label))?;

            tracing::info!(
                source = %label,
                url = %redact_database_url(&db_url),
                "reflecting database source"
            );

            let connection = self.connector.connect(&db_url).await?;
            let recorded = self.record_tables(connection.as_ref(), &record).await;
            // The handle is released even when enumeration or an insert
            // failed; only then does the failure abort the batch.
            connection.close().await;
            tables_recorded += recorded?;
        }

        Ok(RefreshOutcome {
            sources_refreshed: labels.len(),
            tables_recorded,
            refreshed_at: Utc::now(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn record_tables(
        &self,
        connection: &dyn Connection,
        record: &DataSourceRecord,
    ) -> Result<usize> {
        let names = connection.table_names().await?;
        tracing::debug!(
            source = %record.label,
            count = names.len(),
            "enumerated tables"
        );

        for name in &names {
            self.store
                .insert_table_record(
                    record.id,
                    name,
                    serde_json::Value::Array(Vec::new()),
                    Utc::now(),
                )
                .await?;
        }

        Ok(names.len())
    }
}
