//! Source registry and schema reflection core for dwata.
//!
//! This crate unifies heterogeneous configured sources, relational
//! databases and external services, under one label namespace, resolves a
//! label to its raw connection settings, and reflects the live schema of
//! a database source into the durable metadata store.
//!
//! # Architecture
//! - [`registry`]: the label-addressed view over injected [`settings::Settings`]
//! - [`connector`]: object-safe live-connection contract plus sqlx engines
//! - [`store`]: durable data source and table records in the system database
//! - [`reflect`]: the sequential, all-or-nothing refresh operation
//!
//! The HTTP layer, the settings loader, and saved-query persistence are
//! external collaborators; they consume this crate's types and never the
//! other way around.

pub mod connector;
pub mod error;
pub mod logging;
pub mod models;
pub mod reflect;
pub mod registry;
pub mod settings;
pub mod store;

// Re-export commonly used types
pub use connector::{Connection, ConnectionConfig, Connector, SqlxConnector};
pub use error::{DwataError, Result, redact_database_url};
pub use models::{
    DataSourceRecord, DatabaseType, RefreshOutcome, SourceDescriptor, SourceKind, TableRecord,
};
pub use reflect::SchemaReflector;
pub use registry::{META_DB_LABEL, META_DB_URL, SourceRegistry};
pub use settings::{DatabaseSettings, ServiceKind, Settings, SourceSettings};
pub use store::{MetadataStore, SqliteMetadataStore};
