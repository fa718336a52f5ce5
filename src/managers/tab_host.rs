// ReadFocus tab host
// Owns the open tabs and their page tasks, and implements the browser
// messaging, injection and toolbar APIs on top of them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dom::Document;
use crate::managers::content_script::{spawn_page, PageChannels, PageCommand, PageContext};
use crate::services::browser_api::{ScriptInjector, TabMessenger, ToolbarAction};
use crate::services::storage::StorageArea;
use crate::types::config::ExtensionConfig;
use crate::types::errors::{InjectionError, MessagingError};
use crate::types::message::{InjectedScript, PageMessage, ScriptResult};
use crate::types::tab::{Tab, TabId, ToolbarIcon};

/// URL schemes the content script is allowed to run on.
const SCRIPTABLE_SCHEMES: &[&str] = &["http://", "https://", "file://"];

pub fn is_scriptable(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    SCRIPTABLE_SCHEMES.iter().any(|s| lower.starts_with(s))
}

struct TabEntry {
    tab: Tab,
    commands: Option<mpsc::UnboundedSender<PageCommand>>,
    suspended: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Drop for TabEntry {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[derive(Default)]
struct Registry {
    tabs: BTreeMap<TabId, TabEntry>,
    next_id: TabId,
    active: Option<TabId>,
}

impl Registry {
    fn snapshot(&self, entry: &TabEntry) -> Tab {
        let mut tab = entry.tab.clone();
        tab.active = self.active == Some(tab.id);
        tab
    }
}

/// In-process stand-in for the browser's tab strip.
pub struct TabHost {
    registry: Mutex<Registry>,
    storage: Arc<dyn StorageArea>,
    config: ExtensionConfig,
    system_dark: watch::Sender<bool>,
}

impl TabHost {
    pub fn new(storage: Arc<dyn StorageArea>, config: ExtensionConfig) -> Self {
        let (system_dark, _) = watch::channel(false);
        Self {
            registry: Mutex::new(Registry {
                next_id: 1,
                ..Default::default()
            }),
            storage,
            config,
            system_dark,
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // A panic while holding the lock leaves the map itself consistent.
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Parses `html` and opens it as a new active tab. Must run inside a tokio runtime.
    pub fn open_tab(&self, url: &str, html: &str) -> TabId {
        self.open_document(Document::parse(html, url))
    }

    /// Opens an already-built document as a new active tab.
    ///
    /// Pages on scriptable URLs get a content-script task; others are inert.
    pub fn open_document(&self, doc: Document) -> TabId {
        let url = doc.url().to_string();
        let title = doc.title();
        let scriptable = is_scriptable(&url);
        let (suspended, suspended_rx) = watch::channel(false);

        let (commands, task) = if scriptable {
            let (tx, rx) = mpsc::unbounded_channel();
            let page = PageContext::new(doc, &self.config, *self.system_dark.borrow());
            let task = spawn_page(
                page,
                Arc::clone(&self.storage),
                &self.config,
                PageChannels {
                    commands: rx,
                    system_dark: self.system_dark.subscribe(),
                    suspended: suspended_rx,
                },
            );
            (Some(tx), Some(task))
        } else {
            (None, None)
        };

        let mut registry = self.registry();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.tabs.insert(
            id,
            TabEntry {
                tab: Tab {
                    id,
                    url: url.clone(),
                    title,
                    active: true,
                    has_listener: scriptable,
                    suspended: false,
                    icon: ToolbarIcon::Default,
                },
                commands,
                suspended,
                task,
            },
        );
        registry.active = Some(id);
        info!(tab = id, %url, scriptable, "Opened tab");
        id
    }

    /// Closes the tab and ends its page task. The most recently opened remaining tab becomes active.
    pub fn close_tab(&self, id: TabId) -> bool {
        let mut registry = self.registry();
        if registry.tabs.remove(&id).is_none() {
            return false;
        }
        if registry.active == Some(id) {
            registry.active = registry.tabs.keys().next_back().copied();
        }
        info!(tab = id, "Closed tab");
        true
    }

    pub fn activate(&self, id: TabId) -> bool {
        let mut registry = self.registry();
        if !registry.tabs.contains_key(&id) {
            return false;
        }
        registry.active = Some(id);
        true
    }

    /// Freezes the page task: commands queue up unanswered until `resume`.
    pub fn suspend(&self, id: TabId) -> bool {
        self.set_suspended(id, true)
    }

    pub fn resume(&self, id: TabId) -> bool {
        self.set_suspended(id, false)
    }

    fn set_suspended(&self, id: TabId, suspended: bool) -> bool {
        let mut registry = self.registry();
        let Some(entry) = registry.tabs.get_mut(&id) else {
            return false;
        };
        entry.tab.suspended = suspended;
        entry.suspended.send_replace(suspended);
        debug!(tab = id, suspended, "Tab suspension changed");
        true
    }

    /// Flips the OS colour-scheme signal seen by every page.
    pub fn set_system_prefers_dark(&self, dark: bool) {
        self.system_dark.send_replace(dark);
    }

    pub fn system_prefers_dark(&self) -> bool {
        *self.system_dark.borrow()
    }

    pub fn get_tab(&self, id: TabId) -> Option<Tab> {
        let registry = self.registry();
        registry.tabs.get(&id).map(|e| registry.snapshot(e))
    }

    pub fn icon(&self, id: TabId) -> Option<ToolbarIcon> {
        self.registry().tabs.get(&id).map(|e| e.tab.icon)
    }

    pub fn tab_count(&self) -> usize {
        self.registry().tabs.len()
    }

    fn sender(&self, id: TabId) -> Option<(Tab, Option<mpsc::UnboundedSender<PageCommand>>)> {
        let registry = self.registry();
        registry
            .tabs
            .get(&id)
            .map(|e| (e.tab.clone(), e.commands.clone()))
    }

    /// Runs `job` against the tab's document inside its page task and returns its result.
    ///
    /// Mutations the job makes are observed like any page-made change. Returns
    /// `None` if the tab has no page task or does not answer in time.
    pub async fn with_document<R, F>(&self, id: TabId, job: F) -> Option<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Document) -> R + Send + 'static,
    {
        let (_, commands) = self.sender(id)?;
        let commands = commands?;
        let (reply, rx) = oneshot::channel();
        let job = Box::new(move |doc: &mut Document| {
            let _ = reply.send(job(doc));
        });
        commands.send(PageCommand::Document(job)).ok()?;
        tokio::time::timeout(self.config.message_timeout(), rx)
            .await
            .ok()?
            .ok()
    }
}

#[async_trait]
impl TabMessenger for TabHost {
    async fn query_tabs(&self) -> Vec<Tab> {
        let registry = self.registry();
        registry.tabs.values().map(|e| registry.snapshot(e)).collect()
    }

    async fn active_tab(&self) -> Option<Tab> {
        let registry = self.registry();
        let id = registry.active?;
        registry.tabs.get(&id).map(|e| registry.snapshot(e))
    }

    async fn send_message(&self, tab: TabId, message: PageMessage) -> Result<(), MessagingError> {
        let commands = self
            .sender(tab)
            .and_then(|(_, commands)| commands)
            .ok_or(MessagingError::Unreachable(tab))?;

        let (reply, rx) = oneshot::channel();
        commands
            .send(PageCommand::Message { message, reply })
            .map_err(|_| MessagingError::Unreachable(tab))?;

        let timeout = self.config.message_timeout();
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(MessagingError::Unreachable(tab)),
            Err(_) => {
                warn!(tab, "Page did not answer message");
                Err(MessagingError::Unresponsive {
                    tab,
                    waited_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[async_trait]
impl ScriptInjector for TabHost {
    async fn execute_script(
        &self,
        tab: TabId,
        script: InjectedScript,
    ) -> Result<Vec<ScriptResult>, InjectionError> {
        let (info, commands) = self.sender(tab).ok_or(InjectionError::NoTab(tab))?;
        let commands = commands.ok_or_else(|| InjectionError::CannotAccess {
            tab,
            url: info.url.clone(),
        })?;

        let (reply, rx) = oneshot::channel();
        commands
            .send(PageCommand::Execute { script, reply })
            .map_err(|_| InjectionError::ContextGone(tab))?;

        let timeout = self.config.message_timeout();
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => Ok(vec![result]),
            Ok(Err(_)) => Err(InjectionError::ContextGone(tab)),
            Err(_) => Err(InjectionError::Timeout {
                tab,
                waited_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl ToolbarAction for TabHost {
    async fn set_icon(&self, tab: TabId, icon: ToolbarIcon) -> Result<(), InjectionError> {
        let mut registry = self.registry();
        let entry = registry
            .tabs
            .get_mut(&tab)
            .ok_or(InjectionError::NoTab(tab))?;
        entry.tab.icon = icon;
        debug!(tab, icon = icon.path(), "Set toolbar icon");
        Ok(())
    }
}
