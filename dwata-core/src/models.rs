//! Core data models for the source registry and the metadata store.
//!
//! Registry descriptors are derived fresh on every build and never
//! persisted; the record types mirror rows in the system database. All
//! models are serializable because the HTTP layer returns them directly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two families of configured sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A relational database addressed by connection URL.
    Database,
    /// An external service addressed by service-kind settings.
    Service,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Database => write!(f, "database"),
            SourceKind::Service => write!(f, "service"),
        }
    }
}

/// Database engines supported for reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatabaseType {
    /// PostgreSQL, schemes `postgres://` and `postgresql://`.
    PostgreSQL,
    /// MySQL, scheme `mysql://`.
    MySQL,
    /// SQLite, scheme `sqlite:` or a bare database file path.
    SQLite,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

/// One entry in the unified source registry.
///
/// Labels are the sole addressing key used by every other component.
/// `subtype` is the connection URL scheme for databases and the
/// service-kind name for services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Unique label addressing this source.
    pub label: String,
    /// Whether this is a database or a service.
    pub kind: SourceKind,
    /// Engine scheme for databases, service-kind name for services.
    pub subtype: String,
    /// Freeform flags; not validated by the registry.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl SourceDescriptor {
    /// True when this descriptor represents the system database itself.
    #[must_use]
    pub fn is_system_db(&self) -> bool {
        self.attributes
            .get("is_system_db")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Persisted row for one configured database source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceRecord {
    /// Surrogate identifier assigned by the store.
    pub id: i64,
    /// Registry label at the time of creation; unique per database source.
    pub label: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Persisted row for one reflected table of a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    /// Surrogate identifier assigned by the store.
    pub id: i64,
    /// Owning [`DataSourceRecord`] id.
    pub data_source_id: i64,
    /// Table name exactly as reported by the source.
    pub table_name: String,
    /// Column and constraint metadata; empty until a later pass fills it.
    pub attributes: serde_json::Value,
    /// Reflection timestamp.
    pub created_at: DateTime<Utc>,
}

/// Single success outcome for one whole refresh batch.
///
/// There is no per-label reporting: a batch either completes for every
/// requested label or fails on the first violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Number of database sources reflected in this batch.
    pub sources_refreshed: usize,
    /// Total table records inserted across the batch.
    pub tables_recorded: usize,
    /// When the batch finished.
    pub refreshed_at: DateTime<Utc>,
    /// Wall-clock duration of the batch.
    pub duration_ms: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_display() {
        assert_eq!(SourceKind::Database.to_string(), "database");
        assert_eq!(SourceKind::Service.to_string(), "service");
    }

    #[test]
    fn test_source_kind_serializes_lowercase() {
        let json = serde_json::to_string(&SourceKind::Database).unwrap();
        assert_eq!(json, "\"database\"");
    }

    #[test]
    fn test_is_system_db_flag() {
        let mut attributes = BTreeMap::new();
        attributes.insert("is_system_db".to_string(), serde_json::Value::Bool(true));

        let descriptor = SourceDescriptor {
            label: "dwata_meta".to_string(),
            kind: SourceKind::Database,
            subtype: "sqlite".to_string(),
            attributes,
        };
        assert!(descriptor.is_system_db());

        let plain = SourceDescriptor {
            label: "sales".to_string(),
            kind: SourceKind::Database,
            subtype: "postgres".to_string(),
            attributes: BTreeMap::new(),
        };
        assert!(!plain.is_system_db());
    }
}
