// ReadFocus background context
// Install defaults, toolbar-icon toggles and the storage change hub.

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::services::focus_store::FocusStateStore;
use crate::types::errors::FocusError;
use crate::types::focus::FocusState;
use crate::types::tab::TabId;

pub struct Background {
    store: FocusStateStore,
    propagation: Option<JoinHandle<()>>,
}

impl Background {
    pub fn new(store: FocusStateStore) -> Self {
        Self {
            store,
            propagation: None,
        }
    }

    /// Starts re-broadcasting theme changes to all tabs. Idempotent.
    pub fn start(&mut self) {
        if self.propagation.is_none() {
            self.propagation = Some(self.store.spawn_change_propagation());
            info!("Background started");
        }
    }

    pub fn is_running(&self) -> bool {
        self.propagation
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    pub fn shutdown(&mut self) {
        if let Some(task) = self.propagation.take() {
            task.abort();
            info!("Background stopped");
        }
    }

    /// First-install hook: writes the default state.
    pub async fn on_installed(&self) -> Result<(), FocusError> {
        self.store.install_defaults().await
    }

    /// Toolbar button pressed on `tab`. Failures are logged, not returned.
    pub async fn on_icon_clicked(&self, tab: TabId) -> Option<FocusState> {
        match self.store.toggle_focus(tab).await {
            Ok(state) => Some(state),
            Err(e) => {
                error!(tab, error = %e, "Error toggling focus mode");
                None
            }
        }
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        self.shutdown();
    }
}
