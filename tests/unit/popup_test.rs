//! Integration tests for the popup controller, driven through a full App.

use std::sync::Arc;
use std::time::Duration;

use readfocus::app::App;
use readfocus::managers::popup::{
    SaveOutcome, EXTRACTING_STATUS, READY_STATUS, SAVE_ERROR_STATUS, TOGGLE_ERROR_STATUS,
};
use readfocus::services::markdown_export::FsDownloader;
use readfocus::services::storage::MemoryStorage;
use readfocus::types::config::ExtensionConfig;
use readfocus::types::tab::ToolbarIcon;
use readfocus::types::theme::ThemePreference;
use tempfile::TempDir;

const ARTICLE: &str = r#"<html><head><title>Notes on Gardening</title></head><body>
<main><p>Tomatoes want sun, steady water and patience. Pinch the side shoots early and
tie the main stem to a cane as it grows taller through the summer.</p></main></body></html>"#;

fn setup() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let app = App::new(
        ExtensionConfig::default(),
        Arc::new(MemoryStorage::default()),
        Arc::new(FsDownloader::new(Some(dir.path().to_path_buf()))),
    );
    (dir, app)
}

#[tokio::test]
async fn test_popup_opens_with_defaults() {
    let (_dir, app) = setup();
    let popup = app.open_popup().await;
    let view = popup.view();
    assert!(!view.focus_mode_enabled);
    assert_eq!(view.active_theme, ThemePreference::System);
    assert_eq!(view.status, READY_STATUS);
    assert_eq!(view.toggle_label(), "Activate Focus Mode");
}

#[tokio::test(start_paused = true)]
async fn test_toggle_updates_view_and_status_resets() {
    let (_dir, app) = setup();
    let tab = app.tabs.open_tab("https://garden.test/", ARTICLE);
    let popup = app.open_popup().await;

    popup.click_toggle().await.unwrap();
    let view = popup.view();
    assert!(view.focus_mode_enabled);
    assert_eq!(view.toggle_class(), "toggle-button active");
    assert_eq!(view.status, "Focus mode activated!");
    assert_eq!(app.tabs.icon(tab), Some(ToolbarIcon::Active));

    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(popup.view().status, READY_STATUS);
}

#[tokio::test(start_paused = true)]
async fn test_newer_status_cancels_pending_reset() {
    let (_dir, app) = setup();
    app.tabs.open_tab("https://garden.test/", ARTICLE);
    let popup = app.open_popup().await;

    popup.click_toggle().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2000)).await;
    popup.click_theme(ThemePreference::Dark).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(popup.view().status, "dark theme applied");
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(popup.view().status, READY_STATUS);
}

#[tokio::test]
async fn test_toggle_on_restricted_page_shows_error() {
    let (_dir, app) = setup();
    app.tabs.open_tab("chrome://newtab", "");
    let popup = app.open_popup().await;

    assert!(popup.click_toggle().await.is_err());
    let view = popup.view();
    assert_eq!(view.status, TOGGLE_ERROR_STATUS);
    assert!(!view.focus_mode_enabled);
}

#[tokio::test]
async fn test_theme_button_persists_and_updates_tab() {
    let (_dir, app) = setup();
    let tab = app.tabs.open_tab("https://garden.test/", ARTICLE);
    let popup = app.open_popup().await;

    popup.click_theme(ThemePreference::Paper).await.unwrap();
    let view = popup.view();
    assert_eq!(view.active_theme, ThemePreference::Paper);
    assert_eq!(view.status, "paper theme applied");
    assert_eq!(app.store.state().await.unwrap().theme, ThemePreference::Paper);

    let marked = app
        .tabs
        .with_document(tab, |doc| {
            doc.has_class(doc.document_element().unwrap(), "reading-theme-paper")
        })
        .await
        .unwrap();
    assert!(marked);
}

#[tokio::test]
async fn test_theme_button_on_restricted_page_still_saves() {
    let (_dir, app) = setup();
    app.tabs.open_tab("chrome://newtab", "");
    let popup = app.open_popup().await;
    popup.click_theme(ThemePreference::Dark).await.unwrap();
    assert_eq!(app.store.state().await.unwrap().theme, ThemePreference::Dark);
}

#[tokio::test]
async fn test_save_article_writes_markdown() {
    let (dir, app) = setup();
    app.tabs.open_tab("https://garden.test/tomatoes", ARTICLE);
    let popup = app.open_popup().await;

    let outcome = popup.click_save().await;
    let SaveOutcome::Saved { filename, chars } = outcome.clone() else {
        panic!("unexpected outcome: {outcome:?}");
    };
    assert_eq!(filename, "notes_on_gardening.md");
    assert_eq!(popup.view().status, format!("Article saved! ({} chars)", chars));

    let written = std::fs::read_to_string(dir.path().join(&filename)).unwrap();
    assert!(written.starts_with("# Notes on Gardening\n\n**Source:** [https://garden.test/tomatoes]"));
    assert!(written.contains("Tomatoes want sun"));
}

#[tokio::test]
async fn test_save_short_article_is_rejected() {
    let (dir, app) = setup();
    app.tabs.open_tab("https://garden.test/", "<body><p>Just a stub.</p></body>");
    let popup = app.open_popup().await;

    assert_eq!(popup.click_save().await, SaveOutcome::TooShort(12));
    assert_eq!(popup.view().status, "Content too short: 12 chars");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_on_restricted_page_fails() {
    let (_dir, app) = setup();
    app.tabs.open_tab("chrome://newtab", "");
    let popup = app.open_popup().await;

    assert!(matches!(popup.click_save().await, SaveOutcome::Failed(_)));
    assert_eq!(popup.view().status, SAVE_ERROR_STATUS);
    assert_ne!(popup.view().status, EXTRACTING_STATUS);
}

#[tokio::test]
async fn test_startup_installs_defaults_once() {
    let (_dir, mut app) = setup();
    app.startup().await.unwrap();
    assert!(app.background.is_running());
    let popup = app.open_popup().await;
    popup.click_theme(ThemePreference::Paper).await.unwrap();

    app.startup().await.unwrap();
    assert_eq!(app.store.state().await.unwrap().theme, ThemePreference::Paper);
    app.shutdown();
    assert!(!app.background.is_running());
}
