//! The source registry: one flat, label-addressed view over every
//! configured source.
//!
//! The registry owns an injected [`Settings`] instance and derives its
//! descriptor list fresh on every call; nothing here is cached or
//! persisted. One synthetic entry always exists: the system database
//! under [`META_DB_LABEL`], which resolves to a fixed connection
//! descriptor without consulting the settings at all.

use std::collections::BTreeMap;

use url::Url;

use crate::error::{DwataError, Result};
use crate::models::{SourceDescriptor, SourceKind};
use crate::settings::{DatabaseSettings, ServiceKind, Settings, SourceSettings};

/// Label of the synthetic system database entry.
pub const META_DB_LABEL: &str = "dwata_meta";

/// Fixed connection URL of the system database file.
pub const META_DB_URL: &str = "sqlite://dwata_meta.db";

/// Label-addressed view over the configured sources.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    settings: Settings,
}

impl SourceRegistry {
    /// Creates a registry over the given settings snapshot.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// The settings snapshot this registry was built over.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the unified descriptor list.
    ///
    /// Ordering: database descriptors in settings enumeration order, then
    /// the synthetic system database, then service descriptors grouped by
    /// [`ServiceKind::ALL`] order and by settings order within each kind.
    /// Empty sections contribute nothing; zero sources is not an error.
    #[must_use]
    pub fn list_all_sources(&self) -> Vec<SourceDescriptor> {
        let mut sources: Vec<SourceDescriptor> = self
            .settings
            .databases
            .iter()
            .filter(|(label, _)| {
                // The synthetic entry owns this label; a configured database
                // under the same name would otherwise appear twice.
                if label.as_str() == META_DB_LABEL {
                    tracing::warn!(
                        "ignoring configured database '{}': label is reserved for the system database",
                        META_DB_LABEL
                    );
                    false
                } else {
                    true
                }
            })
            .map(|(label, db)| SourceDescriptor {
                label: label.clone(),
                kind: SourceKind::Database,
                subtype: url_scheme(&db.db_url),
                attributes: BTreeMap::new(),
            })
            .collect();

        sources.push(system_db_descriptor());

        for kind in ServiceKind::ALL {
            for label in kind.section(&self.settings).keys() {
                sources.push(SourceDescriptor {
                    label: label.clone(),
                    kind: SourceKind::Service,
                    subtype: kind.as_str().to_string(),
                    attributes: BTreeMap::new(),
                });
            }
        }

        tracing::debug!("registry built with {} sources", sources.len());
        sources
    }

    /// Resolves a label to its raw connection settings.
    ///
    /// [`META_DB_LABEL`] short-circuits to the fixed system database
    /// descriptor and never consults the settings. Any other label is
    /// matched against the first descriptor with that exact label.
    ///
    /// # Errors
    ///
    /// Returns [`DwataError::NotFound`] when no descriptor carries the
    /// label. For a label the registry does list, resolution only fails
    /// if the settings object itself is inconsistent.
    pub fn resolve_source_settings(&self, label: &str) -> Result<SourceSettings> {
        if label == META_DB_LABEL {
            return Ok(SourceSettings::Database(DatabaseSettings {
                db_url: META_DB_URL.to_string(),
            }));
        }

        let sources = self.list_all_sources();
        let descriptor = sources
            .iter()
            .find(|source| source.label == label)
            .ok_or_else(|| DwataError::not_found(label))?;

        match descriptor.kind {
            SourceKind::Database => self
                .settings
                .databases
                .get(label)
                .cloned()
                .map(SourceSettings::Database)
                .ok_or_else(|| DwataError::not_found(label)),
            SourceKind::Service => ServiceKind::from_name(&descriptor.subtype)
                .and_then(|kind| kind.section(&self.settings).get(label))
                .cloned()
                .map(SourceSettings::Service)
                .ok_or_else(|| DwataError::not_found(label)),
        }
    }
}

/// The synthetic descriptor for the system database.
fn system_db_descriptor() -> SourceDescriptor {
    let mut attributes = BTreeMap::new();
    attributes.insert("is_system_db".to_string(), serde_json::Value::Bool(true));
    SourceDescriptor {
        label: META_DB_LABEL.to_string(),
        kind: SourceKind::Database,
        subtype: "sqlite".to_string(),
        attributes,
    }
}

/// Extracts the scheme component from a connection URL.
///
/// An unparseable URL yields an empty subtype rather than failing the
/// whole registry build; the bad entry surfaces later when a connection
/// to it is attempted.
fn url_scheme(db_url: &str) -> String {
    Url::parse(db_url).map_or_else(|_| String::new(), |url| url.scheme().to_string())
}
