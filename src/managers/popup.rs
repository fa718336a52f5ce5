// ReadFocus popup
// View state and actions of the toolbar popup: focus toggle, theme picker and
// "save article" export.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::services::focus_store::FocusStateStore;
use crate::services::markdown_export::{Downloader, ExportedFile};
use crate::types::article::ArticleRecord;
use crate::types::config::ExtensionConfig;
use crate::types::errors::FocusError;
use crate::types::focus::FocusState;
use crate::types::message::{InjectedScript, PageMessage};
use crate::types::theme::ThemePreference;

pub const READY_STATUS: &str = "Ready to focus your reading";
pub const TOGGLE_ERROR_STATUS: &str = "Error: Could not toggle focus mode";
pub const SAVE_ERROR_STATUS: &str = "Error: Could not save article";
pub const EXTRACTING_STATUS: &str = "Extracting article content...";
pub const NO_CONTENT_STATUS: &str = "No article content found";

/// What the popup currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub focus_mode_enabled: bool,
    pub active_theme: ThemePreference,
    pub status: String,
}

impl PopupView {
    pub fn from_state(state: FocusState) -> Self {
        Self {
            focus_mode_enabled: state.focus_mode_enabled,
            active_theme: state.theme,
            status: READY_STATUS.to_string(),
        }
    }

    pub fn toggle_label(&self) -> &'static str {
        if self.focus_mode_enabled {
            "Deactivate Focus Mode"
        } else {
            "Activate Focus Mode"
        }
    }

    pub fn toggle_class(&self) -> &'static str {
        if self.focus_mode_enabled {
            "toggle-button active"
        } else {
            "toggle-button inactive"
        }
    }

    /// Each theme button with whether it is highlighted.
    pub fn theme_buttons(&self) -> Vec<(ThemePreference, bool)> {
        ThemePreference::ALL
            .into_iter()
            .map(|theme| (theme, theme == self.active_theme))
            .collect()
    }
}

/// Result of the "save article" action.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { filename: String, chars: usize },
    TooShort(usize),
    NoContent,
    Failed(String),
}

/// The popup's controller. Each instance corresponds to one opening of the popup.
pub struct PopupController {
    store: FocusStateStore,
    downloader: Arc<dyn Downloader>,
    config: ExtensionConfig,
    view: Arc<Mutex<PopupView>>,
    /// Bumped on every status change so stale resets do nothing.
    status_epoch: Arc<AtomicU64>,
}

impl PopupController {
    /// Opens the popup, showing the persisted state (defaults if storage fails).
    pub async fn open(
        store: FocusStateStore,
        downloader: Arc<dyn Downloader>,
        config: ExtensionConfig,
    ) -> Self {
        let state = match store.state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Popup could not read state, showing defaults");
                FocusState::default()
            }
        };
        Self {
            store,
            downloader,
            config,
            view: Arc::new(Mutex::new(PopupView::from_state(state))),
            status_epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn view(&self) -> PopupView {
        self.lock_view().clone()
    }

    fn lock_view(&self) -> std::sync::MutexGuard<'_, PopupView> {
        lock(&self.view)
    }

    /// Shows `message` and schedules the reset to the ready line.
    fn set_status(&self, message: String) {
        let epoch = self.status_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(status = %message, "Popup status");
        self.lock_view().status = message;

        let view = Arc::clone(&self.view);
        let status_epoch = Arc::clone(&self.status_epoch);
        let delay = self.config.status_reset();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if status_epoch.load(Ordering::SeqCst) == epoch {
                lock(&view).status = READY_STATUS.to_string();
            }
        });
    }

    pub async fn click_toggle(&self) -> Result<FocusState, FocusError> {
        match self.store.toggle_active().await {
            Ok(state) => {
                self.lock_view().focus_mode_enabled = state.focus_mode_enabled;
                let status = if state.focus_mode_enabled {
                    "Focus mode activated!"
                } else {
                    "Focus mode deactivated"
                };
                self.set_status(status.to_string());
                Ok(state)
            }
            Err(e) => {
                error!(error = %e, "Error toggling focus mode");
                self.set_status(TOGGLE_ERROR_STATUS.to_string());
                Err(e)
            }
        }
    }

    /// Persists the theme, then nudges the active tab directly.
    ///
    /// A failed nudge is ignored; the background re-broadcasts the change anyway.
    pub async fn click_theme(&self, theme: ThemePreference) -> Result<(), FocusError> {
        self.store.save_theme(theme).await?;
        self.lock_view().active_theme = theme;
        self.set_status(format!("{} theme applied", theme));

        if let Some(tab) = self.store.messenger().active_tab().await {
            if let Err(e) = self
                .store
                .messenger()
                .send_message(tab.id, PageMessage::ThemeChanged { theme })
                .await
            {
                debug!(tab = tab.id, error = %e, "Could not send theme message to tab");
            }
        }
        Ok(())
    }

    /// Extracts the active tab's article and downloads it as Markdown.
    pub async fn click_save(&self) -> SaveOutcome {
        self.set_status(EXTRACTING_STATUS.to_string());
        let outcome = self.save_active_article().await;
        let status = match &outcome {
            SaveOutcome::Saved { chars, .. } => format!("Article saved! ({} chars)", chars),
            SaveOutcome::TooShort(chars) => format!("Content too short: {} chars", chars),
            SaveOutcome::NoContent => NO_CONTENT_STATUS.to_string(),
            SaveOutcome::Failed(reason) => {
                error!(%reason, "Error saving article");
                SAVE_ERROR_STATUS.to_string()
            }
        };
        self.set_status(status);
        outcome
    }

    async fn save_active_article(&self) -> SaveOutcome {
        let Some(tab) = self.store.messenger().active_tab().await else {
            return SaveOutcome::Failed(FocusError::NoActiveTab.to_string());
        };
        let results = match self
            .store
            .injector()
            .execute_script(tab.id, InjectedScript::ExtractArticle)
            .await
        {
            Ok(results) => results,
            Err(e) => return SaveOutcome::Failed(e.to_string()),
        };

        let Some(value) = results.into_iter().next().and_then(|r| r.result) else {
            return SaveOutcome::NoContent;
        };
        let Some(article) = article_from_value(&value) else {
            return SaveOutcome::NoContent;
        };

        let chars = article.content.chars().count();
        if article.content_chars() <= self.config.min_export_chars {
            return SaveOutcome::TooShort(chars);
        }

        let file = ExportedFile::from_article(&article);
        match self.downloader.download(&file).await {
            Ok(_) => SaveOutcome::Saved {
                filename: file.filename,
                chars,
            },
            Err(e) => SaveOutcome::Failed(e.to_string()),
        }
    }
}

/// Reads an article out of a script result, tolerating missing fields.
fn article_from_value(value: &Value) -> Option<ArticleRecord> {
    let object = value.as_object()?;
    let field = |name: &str| {
        object
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(ArticleRecord {
        title: field("title"),
        content: field("content"),
        url: field("url"),
        date: field("date"),
    })
}

fn lock(view: &Mutex<PopupView>) -> std::sync::MutexGuard<'_, PopupView> {
    view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
