//! Integration tests for the refresh operation against live SQLite
//! sources and a real metadata store.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use dwata_core::{
    DatabaseSettings, MetadataStore, SchemaReflector, Settings, SourceRegistry,
    SqliteMetadataStore, SqlxConnector,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Creates a SQLite database file exposing the given tables.
async fn seed_source_database(path: &Path, tables: &[&str]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    for table in tables {
        sqlx::query(&format!(
            "CREATE TABLE \"{table}\" (id INTEGER PRIMARY KEY, body TEXT)"
        ))
        .execute(&pool)
        .await
        .unwrap();
    }
    pool.close().await;
}

fn settings_with_database(label: &str, db_url: String) -> Settings {
    let mut settings = Settings::default();
    settings
        .databases
        .insert(label.to_string(), DatabaseSettings { db_url });
    settings
}

fn reflector(settings: Settings, store: &SqliteMetadataStore) -> SchemaReflector {
    SchemaReflector::new(
        SourceRegistry::new(settings),
        Box::new(SqlxConnector::default()),
        Box::new(store.clone()),
    )
}

#[tokio::test]
async fn refresh_records_each_enumerated_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    seed_source_database(&path, &["customers", "orders"]).await;

    let store = SqliteMetadataStore::in_memory().await.unwrap();
    let record = store.insert_data_source("inventory").await.unwrap();

    let settings = settings_with_database("inventory", format!("sqlite://{}", path.display()));
    let reflector = reflector(settings, &store);

    let outcome = reflector.refresh(&["inventory".to_string()]).await.unwrap();
    assert_eq!(outcome.sources_refreshed, 1);
    assert_eq!(outcome.tables_recorded, 2);

    let records = store.list_table_records(record.id).await.unwrap();
    assert_eq!(records.len(), 2);
    let names: Vec<&str> = records
        .iter()
        .map(|table| table.table_name.as_str())
        .collect();
    assert_eq!(names, vec!["customers", "orders"]);
    for table in &records {
        assert_eq!(table.data_source_id, record.id);
        assert_eq!(table.attributes, serde_json::Value::Array(Vec::new()));
    }
}

#[tokio::test]
async fn refresh_twice_doubles_the_record_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    seed_source_database(&path, &["customers", "orders"]).await;

    let store = SqliteMetadataStore::in_memory().await.unwrap();
    let record = store.insert_data_source("inventory").await.unwrap();

    let settings = settings_with_database("inventory", format!("sqlite://{}", path.display()));
    let reflector = reflector(settings, &store);

    reflector.refresh(&["inventory".to_string()]).await.unwrap();
    reflector.refresh(&["inventory".to_string()]).await.unwrap();

    // Reflection is append-only: an unchanged source reflected twice
    // accumulates duplicate rows.
    let records = store.list_table_records(record.id).await.unwrap();
    assert_eq!(records.len(), 4);
}

#[tokio::test]
async fn refresh_aborts_batch_on_service_label() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    seed_source_database(&path, &["customers"]).await;

    let store = SqliteMetadataStore::in_memory().await.unwrap();
    let record = store.insert_data_source("inventory").await.unwrap();

    let mut settings =
        settings_with_database("inventory", format!("sqlite://{}", path.display()));
    settings.stripe.insert(
        "billing".to_string(),
        serde_json::json!({"api_key": "sk_test_1"}),
    );
    let reflector = reflector(settings, &store);

    let error = reflector
        .refresh(&["billing".to_string(), "inventory".to_string()])
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "not_a_database_source");

    // The batch stopped before the database label; nothing was recorded.
    let records = store.list_table_records(record.id).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn refresh_unknown_label_leaves_store_unchanged() {
    let store = SqliteMetadataStore::in_memory().await.unwrap();
    let record = store.insert_data_source("inventory").await.unwrap();

    let reflector = reflector(Settings::default(), &store);

    let error = reflector
        .refresh(&["warehouse".to_string()])
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "unknown_source");

    let records = store.list_table_records(record.id).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn refresh_requires_an_existing_data_source_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.db");
    seed_source_database(&path, &["customers"]).await;

    let store = SqliteMetadataStore::in_memory().await.unwrap();

    let settings = settings_with_database("inventory", format!("sqlite://{}", path.display()));
    let reflector = reflector(settings, &store);

    let error = reflector
        .refresh(&["inventory".to_string()])
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "missing_data_source_record");
}

#[tokio::test]
async fn refresh_connection_failure_aborts_remaining_labels() {
    let dir = tempfile::tempdir().unwrap();
    let good_path = dir.path().join("inventory.db");
    seed_source_database(&good_path, &["customers"]).await;
    let missing_path = dir.path().join("missing.db");

    let store = SqliteMetadataStore::in_memory().await.unwrap();
    store.insert_data_source("broken").await.unwrap();
    let good_record = store.insert_data_source("inventory").await.unwrap();

    let mut settings =
        settings_with_database("broken", format!("sqlite://{}", missing_path.display()));
    settings.databases.insert(
        "inventory".to_string(),
        DatabaseSettings {
            db_url: format!("sqlite://{}", good_path.display()),
        },
    );
    let reflector = reflector(settings, &store);

    let error = reflector
        .refresh(&["broken".to_string(), "inventory".to_string()])
        .await
        .unwrap_err();
    assert_eq!(error.error_code(), "connection_failure");

    // The healthy label after the failing one was never processed.
    let records = store.list_table_records(good_record.id).await.unwrap();
    assert!(records.is_empty());
}
