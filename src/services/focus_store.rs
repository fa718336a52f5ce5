//! Focus state store: the persisted focus flag and theme, and how changes reach pages.
//!
//! Storage is the single source of truth. Pages learn about theme changes from
//! broadcasts, never by reading each other's state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::services::browser_api::{ScriptInjector, TabMessenger, ToolbarAction};
use crate::services::storage::StorageArea;
use crate::types::errors::{FocusError, MessagingError, ToggleStep};
use crate::types::focus::{theme_from_value, FocusState, FOCUS_KEY, THEME_KEY};
use crate::types::message::{InjectedScript, PageMessage};
use crate::types::storage::{StorageChanges, StorageScope};
use crate::types::tab::{TabId, ToolbarIcon};
use crate::types::theme::ThemePreference;

/// Per-tab outcome of a theme broadcast.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: Vec<TabId>,
    /// Closed tabs or tabs without a listener. Expected, not failures.
    pub unreachable: Vec<TabId>,
    /// Tabs that have a listener but did not answer in time.
    pub failures: Vec<(TabId, MessagingError)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Handle to the shared focus/theme state. Cheap to clone.
#[derive(Clone)]
pub struct FocusStateStore {
    storage: Arc<dyn StorageArea>,
    messenger: Arc<dyn TabMessenger>,
    injector: Arc<dyn ScriptInjector>,
    toolbar: Arc<dyn ToolbarAction>,
}

impl FocusStateStore {
    pub fn new(
        storage: Arc<dyn StorageArea>,
        messenger: Arc<dyn TabMessenger>,
        injector: Arc<dyn ScriptInjector>,
        toolbar: Arc<dyn ToolbarAction>,
    ) -> Self {
        Self {
            storage,
            messenger,
            injector,
            toolbar,
        }
    }

    pub fn storage(&self) -> &Arc<dyn StorageArea> {
        &self.storage
    }

    pub fn messenger(&self) -> &Arc<dyn TabMessenger> {
        &self.messenger
    }

    pub fn injector(&self) -> &Arc<dyn ScriptInjector> {
        &self.injector
    }

    /// Current persisted state; missing or malformed keys read as defaults.
    pub async fn state(&self) -> Result<FocusState, FocusError> {
        let values = self.storage.get(&[FOCUS_KEY, THEME_KEY]).await?;
        Ok(FocusState::from_values(&values))
    }

    /// Writes the first-install defaults: system theme, focus mode off.
    pub async fn install_defaults(&self) -> Result<(), FocusError> {
        self.storage.set(FocusState::default().to_values()).await?;
        info!("Installed default focus state");
        Ok(())
    }

    /// Flips the focus flag, persists it, then updates the tab's page and icon.
    ///
    /// Returns the new state. If a step after the write fails, the new flag stays
    /// persisted and the error says which step failed.
    pub async fn toggle_focus(&self, tab: TabId) -> Result<FocusState, FocusError> {
        let mut state = self.state().await?;
        state.focus_mode_enabled = !state.focus_mode_enabled;
        let enabled = state.focus_mode_enabled;

        self.storage
            .set(HashMap::from([(FOCUS_KEY.to_string(), Value::Bool(enabled))]))
            .await?;

        self.injector
            .execute_script(tab, InjectedScript::for_focus(enabled))
            .await
            .map_err(|e| FocusError::PartialToggle {
                persisted: enabled,
                step: ToggleStep::Inject,
                reason: e.to_string(),
            })?;

        self.toolbar
            .set_icon(tab, ToolbarIcon::for_focus(enabled))
            .await
            .map_err(|e| FocusError::PartialToggle {
                persisted: enabled,
                step: ToggleStep::Icon,
                reason: e.to_string(),
            })?;

        info!(tab, enabled, "Toggled focus mode");
        Ok(state)
    }

    /// Toggles focus mode in the active tab.
    pub async fn toggle_active(&self) -> Result<FocusState, FocusError> {
        let tab = self
            .messenger
            .active_tab()
            .await
            .ok_or(FocusError::NoActiveTab)?;
        self.toggle_focus(tab.id).await
    }

    /// Persists the theme preference without notifying any page.
    pub async fn save_theme(&self, theme: ThemePreference) -> Result<(), FocusError> {
        self.storage
            .set(HashMap::from([(
                THEME_KEY.to_string(),
                Value::String(theme.to_string()),
            )]))
            .await?;
        Ok(())
    }

    /// Persists the theme, then tells every open tab about it.
    pub async fn set_theme(&self, theme: ThemePreference) -> Result<BroadcastReport, FocusError> {
        self.save_theme(theme).await?;
        info!(%theme, "Theme preference saved");
        Ok(self.broadcast_theme(theme).await)
    }

    /// Sends `ThemeChanged` to every open tab concurrently.
    ///
    /// Every tab is attempted. Unreachable tabs are skipped silently and slow
    /// tabs are collected as failures.
    pub async fn broadcast_theme(&self, theme: ThemePreference) -> BroadcastReport {
        let tabs = self.messenger.query_tabs().await;
        let mut pending = JoinSet::new();
        for tab in tabs {
            let messenger = Arc::clone(&self.messenger);
            pending.spawn(async move {
                let result = messenger
                    .send_message(tab.id, PageMessage::ThemeChanged { theme })
                    .await;
                (tab.id, result)
            });
        }

        let mut report = BroadcastReport::default();
        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((tab, Ok(()))) => report.delivered.push(tab),
                Ok((tab, Err(e))) if e.is_unreachable() => report.unreachable.push(tab),
                Ok((tab, Err(e))) => {
                    warn!(tab, error = %e, "Theme broadcast failed for tab");
                    report.failures.push((tab, e));
                }
                Err(e) => warn!(error = %e, "Theme broadcast task aborted"),
            }
        }
        report.delivered.sort_unstable();
        report.unreachable.sort_unstable();
        report.failures.sort_by_key(|(tab, _)| *tab);
        debug!(
            %theme,
            delivered = report.delivered.len(),
            unreachable = report.unreachable.len(),
            failed = report.failures.len(),
            "Theme broadcast finished"
        );
        report
    }

    /// Re-broadcasts the theme after any sync-scope `theme` change, whoever wrote it.
    pub fn spawn_change_propagation(&self) -> JoinHandle<()> {
        let store = self.clone();
        let mut changes = self.storage.subscribe();
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => {
                        if let Some(theme) = changed_theme(&change) {
                            store.broadcast_theme(theme).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Change propagation lagged behind storage");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Change propagation stopped");
        })
    }
}

/// The new theme, if this change set touched it in the sync area.
pub fn changed_theme(changes: &StorageChanges) -> Option<ThemePreference> {
    if changes.scope != StorageScope::Sync {
        return None;
    }
    let change = changes.get(THEME_KEY)?;
    Some(
        change
            .new_value
            .as_ref()
            .and_then(theme_from_value)
            .unwrap_or_default(),
    )
}
