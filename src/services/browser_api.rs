// ReadFocus browser collaborators
// Tab messaging, script injection and toolbar icon control, as provided by the host.

use async_trait::async_trait;

use crate::types::errors::{InjectionError, MessagingError};
use crate::types::message::{InjectedScript, PageMessage, ScriptResult};
use crate::types::tab::{Tab, TabId, ToolbarIcon};

/// Delivers messages to page contexts.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Every open tab, in opening order.
    async fn query_tabs(&self) -> Vec<Tab>;

    /// The focused tab of the current window.
    async fn active_tab(&self) -> Option<Tab>;

    /// Sends one message and waits for the page to acknowledge it.
    async fn send_message(&self, tab: TabId, message: PageMessage) -> Result<(), MessagingError>;
}

/// Runs named operations inside a page context.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Runs `script` in the tab's top frame and returns one result per frame.
    async fn execute_script(
        &self,
        tab: TabId,
        script: InjectedScript,
    ) -> Result<Vec<ScriptResult>, InjectionError>;
}

/// Controls the extension's toolbar button.
#[async_trait]
pub trait ToolbarAction: Send + Sync {
    async fn set_icon(&self, tab: TabId, icon: ToolbarIcon) -> Result<(), InjectionError>;
}
