//! Typed settings sections consumed by the source registry.
//!
//! Loading and watching the actual configuration file is the application
//! shell's job; this module only defines the shape the registry reads.
//! Every section defaults to empty, so an absent section contributes no
//! sources without being an error.
//!
//! Service sections are reached through [`ServiceKind`] accessors rather
//! than by reflecting over section names at runtime; the set of known
//! service kinds is enumerated in code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Process-wide configuration object, one named section per source kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Database sources, label to connection settings.
    pub databases: BTreeMap<String, DatabaseSettings>,
    /// Stripe service sources, label to opaque settings.
    pub stripe: BTreeMap<String, serde_json::Value>,
    /// Mailchimp service sources, label to opaque settings.
    pub mailchimp: BTreeMap<String, serde_json::Value>,
}

/// Connection settings for one configured database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; the scheme determines the engine.
    pub db_url: String,
}

/// Known service kinds, each mapped to its settings section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Stripe payment data.
    Stripe,
    /// Mailchimp audience data.
    Mailchimp,
}

impl ServiceKind {
    /// Every known service kind, in registry-iteration order.
    pub const ALL: &'static [ServiceKind] = &[ServiceKind::Stripe, ServiceKind::Mailchimp];

    /// Canonical lowercase name, used as the descriptor subtype.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Stripe => "stripe",
            ServiceKind::Mailchimp => "mailchimp",
        }
    }

    /// Looks up a service kind by its canonical name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.as_str() == name)
    }

    /// The settings section holding this kind's configured services.
    #[must_use]
    pub fn section(self, settings: &Settings) -> &BTreeMap<String, serde_json::Value> {
        match self {
            ServiceKind::Stripe => &settings.stripe,
            ServiceKind::Mailchimp => &settings.mailchimp,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw settings resolved for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSettings {
    /// Connection settings for a database source.
    Database(DatabaseSettings),
    /// Opaque settings for a service source.
    Service(serde_json::Value),
}

impl SourceSettings {
    /// The connection URL when this resolves to a database source.
    #[must_use]
    pub fn db_url(&self) -> Option<&str> {
        match self {
            SourceSettings::Database(db) => Some(&db.db_url),
            SourceSettings::Service(_) => None,
        }
    }
}
