//! App core for ReadFocus.
//!
//! Wires storage, the tab host, the focus state store, the background hub and
//! the downloader together, and hands out popups.

use std::sync::Arc;

use tracing::{info, warn};

use crate::managers::background::Background;
use crate::managers::popup::PopupController;
use crate::managers::tab_host::TabHost;
use crate::platform;
use crate::services::focus_store::FocusStateStore;
use crate::services::markdown_export::{Downloader, FsDownloader};
use crate::services::storage::{JsonFileStorage, StorageArea};
use crate::types::config::ExtensionConfig;
use crate::types::errors::StorageError;
use crate::types::focus::{FOCUS_KEY, THEME_KEY};
use crate::types::storage::StorageScope;

pub const STORAGE_FILE_NAME: &str = "storage.json";

pub struct App {
    pub config: ExtensionConfig,
    pub storage: Arc<dyn StorageArea>,
    pub tabs: Arc<TabHost>,
    pub store: FocusStateStore,
    pub background: Background,
    pub downloader: Arc<dyn Downloader>,
}

impl App {
    /// Builds the app around the given storage area and downloader.
    pub fn new(
        config: ExtensionConfig,
        storage: Arc<dyn StorageArea>,
        downloader: Arc<dyn Downloader>,
    ) -> Self {
        let tabs = Arc::new(TabHost::new(Arc::clone(&storage), config.clone()));
        let store = FocusStateStore::new(
            Arc::clone(&storage),
            tabs.clone(),
            tabs.clone(),
            tabs.clone(),
        );
        let background = Background::new(store.clone());
        Self {
            config,
            storage,
            tabs,
            store,
            background,
            downloader,
        }
    }

    /// File-backed storage in the platform data dir, exports to the configured directory.
    pub async fn with_platform_storage(config: ExtensionConfig) -> Result<Self, StorageError> {
        let path = platform::get_data_dir().join(STORAGE_FILE_NAME);
        let storage = JsonFileStorage::open(&path, StorageScope::Sync).await?;
        info!(path = %path.display(), "Opened storage");
        let downloader = FsDownloader::new(config.download_dir.clone());
        Ok(Self::new(config, Arc::new(storage), Arc::new(downloader)))
    }

    /// Starts the background hub. Runs the install hook when storage holds no state yet.
    pub async fn startup(&mut self) -> Result<(), StorageError> {
        let existing = self
            .storage
            .get(&[THEME_KEY, FOCUS_KEY])
            .await?;
        if existing.is_empty() {
            if let Err(e) = self.background.on_installed().await {
                warn!(error = %e, "Could not install defaults");
            }
        }
        self.background.start();
        Ok(())
    }

    /// Opens the popup against the current state.
    pub async fn open_popup(&self) -> PopupController {
        PopupController::open(
            self.store.clone(),
            Arc::clone(&self.downloader),
            self.config.clone(),
        )
        .await
    }

    pub fn shutdown(&mut self) {
        self.background.shutdown();
    }
}
