//! Integration tests for the storage areas.
//!
//! The file-backed area is exercised against a temp directory: persistence
//! across reopen, malformed files, and change events.

use std::collections::HashMap;
use std::sync::Arc;

use readfocus::app::App;
use readfocus::services::markdown_export::FsDownloader;
use readfocus::services::storage::{JsonFileStorage, MemoryStorage, StorageArea};
use readfocus::types::config::ExtensionConfig;
use readfocus::types::errors::StorageError;
use readfocus::types::focus::{FocusState, FOCUS_KEY, THEME_KEY};
use readfocus::types::storage::StorageScope;
use readfocus::types::theme::ThemePreference;
use serde_json::{json, Value};
use tempfile::TempDir;

fn entry(key: &str, value: Value) -> HashMap<String, Value> {
    HashMap::from([(key.to_string(), value)])
}

#[tokio::test]
async fn test_file_storage_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::open(dir.path().join("storage.json"), StorageScope::Sync)
        .await
        .unwrap();
    assert!(storage.get(&[THEME_KEY]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_storage_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("storage.json");
    {
        let storage = JsonFileStorage::open(&path, StorageScope::Sync).await.unwrap();
        storage
            .set(FocusState {
                focus_mode_enabled: true,
                theme: ThemePreference::Paper,
            }
            .to_values())
            .await
            .unwrap();
    }

    let reopened = JsonFileStorage::open(&path, StorageScope::Sync).await.unwrap();
    let values = reopened.get(&[THEME_KEY, FOCUS_KEY]).await.unwrap();
    let state = FocusState::from_values(&values);
    assert!(state.focus_mode_enabled);
    assert_eq!(state.theme, ThemePreference::Paper);
}

async fn file_backed_app(dir: &TempDir) -> App {
    let storage = JsonFileStorage::open(dir.path().join("storage.json"), StorageScope::Sync)
        .await
        .unwrap();
    App::new(
        ExtensionConfig::default(),
        Arc::new(storage),
        Arc::new(FsDownloader::new(Some(dir.path().join("exports")))),
    )
}

#[tokio::test]
async fn test_app_state_survives_restart_on_file_storage() {
    let dir = TempDir::new().unwrap();
    {
        let mut app = file_backed_app(&dir).await;
        app.startup().await.unwrap();
        assert_eq!(app.store.state().await.unwrap(), FocusState::default());
        app.store.set_theme(ThemePreference::Dark).await.unwrap();
        app.shutdown();
    }

    let mut app = file_backed_app(&dir).await;
    // Existing state is kept; defaults are only written on first install.
    app.startup().await.unwrap();
    let state = app.store.state().await.unwrap();
    assert_eq!(state.theme, ThemePreference::Dark);
    assert!(!state.focus_mode_enabled);
    app.shutdown();
}

#[tokio::test]
async fn test_file_storage_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, "[1, 2").unwrap();
    let result = JsonFileStorage::open(&path, StorageScope::Sync).await;
    assert!(matches!(result, Err(StorageError::Serialization(_))));
}

#[tokio::test]
async fn test_file_storage_change_events() {
    let dir = TempDir::new().unwrap();
    let storage = JsonFileStorage::open(dir.path().join("s.json"), StorageScope::Local)
        .await
        .unwrap();
    let mut rx = storage.subscribe();

    storage.set(entry(THEME_KEY, json!("dark"))).await.unwrap();
    storage.set(entry(THEME_KEY, json!("dark"))).await.unwrap();
    storage.set(entry(FOCUS_KEY, json!(true))).await.unwrap();

    let first = rx.recv().await.unwrap();
    assert_eq!(first.scope, StorageScope::Local);
    assert_eq!(first.get(THEME_KEY).unwrap().new_value, Some(json!("dark")));
    let second = rx.recv().await.unwrap();
    assert!(second.get(THEME_KEY).is_none());
    assert_eq!(second.get(FOCUS_KEY).unwrap().new_value, Some(json!(true)));
}

#[tokio::test]
async fn test_multi_key_write_is_one_event() {
    let storage = MemoryStorage::new(StorageScope::Sync);
    let mut rx = storage.subscribe();
    storage.set(FocusState::default().to_values()).await.unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.changes.len(), 2);
    assert_eq!(event.get(THEME_KEY).unwrap().new_value, Some(json!("system")));
    assert_eq!(event.get(FOCUS_KEY).unwrap().new_value, Some(json!(false)));
}

#[tokio::test]
async fn test_malformed_values_read_as_defaults() {
    let storage = MemoryStorage::default();
    storage.set(entry(THEME_KEY, json!(42))).await.unwrap();
    storage.set(entry(FOCUS_KEY, json!("yes"))).await.unwrap();
    let values = storage.get(&[THEME_KEY, FOCUS_KEY]).await.unwrap();
    assert_eq!(FocusState::from_values(&values), FocusState::default());
}
