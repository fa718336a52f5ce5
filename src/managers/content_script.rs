//! Page context: the content-script side of one open tab.
//!
//! Each page runs as one task that owns its document and handles commands one
//! at a time. On start it reads the persisted state and applies it; afterwards
//! it reacts to messages, injected scripts, colour-scheme changes and DOM
//! mutations.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dom::Document;
use crate::services::ad_suppressor::{AdSuppressor, AdSuppressorTrait, SuppressionReport};
use crate::services::content_extractor::{ContentExtractor, ContentExtractorTrait};
use crate::services::storage::StorageArea;
use crate::services::theme_applier::{ThemeApplier, ThemeApplierTrait};
use crate::types::config::ExtensionConfig;
use crate::types::focus::{FocusState, FOCUS_KEY, THEME_KEY};
use crate::types::message::{InjectedScript, PageMessage, ScriptResult};
use crate::types::theme::{EffectiveTheme, ThemePreference};

/// Class on `<body>` while focus mode is on.
pub const FOCUS_CLASS: &str = "reading-focus-mode";

/// Id of the top-level frame.
pub const TOP_FRAME: u32 = 0;

/// Closure run against the page's document inside its task.
pub type DocumentJob = Box<dyn FnOnce(&mut Document) + Send>;

/// Work delivered to a page task.
pub enum PageCommand {
    /// A runtime message; the reply acknowledges delivery.
    Message {
        message: PageMessage,
        reply: oneshot::Sender<()>,
    },
    /// A named script to run in the page.
    Execute {
        script: InjectedScript,
        reply: oneshot::Sender<ScriptResult>,
    },
    /// Direct document access for the host, such as the page changing itself.
    Document(DocumentJob),
}

/// State of one page: its document plus what the content script remembers.
pub struct PageContext {
    doc: Document,
    /// Cached preference; decides whether colour-scheme changes matter.
    theme: ThemePreference,
    system_prefers_dark: bool,
    /// Set once the delayed first ad pass has run.
    ads_armed: bool,
    applier: ThemeApplier,
    extractor: ContentExtractor,
    suppressor: AdSuppressor,
}

impl PageContext {
    pub fn new(doc: Document, config: &ExtensionConfig, system_prefers_dark: bool) -> Self {
        let suppressor = AdSuppressor::with_config(config);
        #[cfg(feature = "filter-lists")]
        let suppressor = if config.filter_rules.is_empty() {
            suppressor
        } else {
            suppressor.with_filter_rules(&config.filter_rules, &doc)
        };
        Self {
            doc,
            theme: ThemePreference::System,
            system_prefers_dark,
            ads_armed: false,
            applier: ThemeApplier::new(),
            extractor: ContentExtractor::with_config(config),
            suppressor,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme
    }

    pub fn ads_armed(&self) -> bool {
        self.ads_armed
    }

    /// Applies the stored state and starts watching `<body>` for added nodes.
    ///
    /// `None` means storage could not be read; the page is left as it is.
    pub fn initialize(&mut self, state: Option<FocusState>) {
        if let Some(body) = self.doc.body() {
            self.doc.observe_child_list(body);
        }
        let Some(state) = state else {
            return;
        };
        self.theme = state.theme;
        self.apply_theme();
        if state.focus_mode_enabled {
            self.set_focus(true);
        }
        debug!(url = self.doc.url(), theme = %state.theme, focus = state.focus_mode_enabled, "Page initialized");
    }

    pub fn handle_message(&mut self, message: PageMessage) {
        match message {
            PageMessage::ThemeChanged { theme } => {
                self.theme = theme;
                self.apply_theme();
            }
            PageMessage::ToggleFocusMode => {
                if let Some(body) = self.doc.body() {
                    self.doc.toggle_class(body, FOCUS_CLASS);
                }
            }
        }
    }

    pub fn run_script(&mut self, script: InjectedScript) -> ScriptResult {
        let result = match script {
            InjectedScript::EnableFocusMode => {
                self.set_focus(true);
                None
            }
            InjectedScript::DisableFocusMode => {
                self.set_focus(false);
                None
            }
            InjectedScript::ExtractArticle => {
                let article = self.extractor.extract(&self.doc);
                match serde_json::to_value(&article) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(error = %e, "Could not serialize extracted article");
                        None
                    }
                }
            }
        };
        debug!(script = script.name(), "Ran injected script");
        ScriptResult {
            frame_id: TOP_FRAME,
            result,
        }
    }

    /// Re-applies the theme when it follows the system and the signal flipped.
    pub fn on_system_scheme_change(&mut self, prefers_dark: bool) {
        self.system_prefers_dark = prefers_dark;
        if self.theme == ThemePreference::System {
            self.apply_theme();
        }
    }

    /// Runs a suppression pass and arms mutation-triggered passes.
    pub fn run_ad_pass(&mut self) -> SuppressionReport {
        self.ads_armed = true;
        // The pass itself only touches attributes; drop what is queued so far.
        self.doc.take_mutations();
        self.suppressor.suppress(&mut self.doc)
    }

    /// Drains recorded mutations and runs a pass if nodes were added after arming.
    pub fn flush_mutations(&mut self) -> Option<SuppressionReport> {
        let mutations = self.doc.take_mutations();
        if !self.ads_armed || !AdSuppressor::needs_pass(&mutations) {
            return None;
        }
        Some(self.suppressor.suppress(&mut self.doc))
    }

    pub fn handle_command(&mut self, command: PageCommand) {
        match command {
            PageCommand::Message { message, reply } => {
                self.handle_message(message);
                // The sender may have given up waiting.
                let _ = reply.send(());
            }
            PageCommand::Execute { script, reply } => {
                let result = self.run_script(script);
                let _ = reply.send(result);
            }
            PageCommand::Document(job) => {
                job(&mut self.doc);
                self.flush_mutations();
            }
        }
    }

    fn apply_theme(&mut self) -> EffectiveTheme {
        self.applier
            .apply(&mut self.doc, self.theme, self.system_prefers_dark)
    }

    fn set_focus(&mut self, enabled: bool) {
        let Some(body) = self.doc.body() else {
            return;
        };
        if enabled {
            self.doc.add_class(body, FOCUS_CLASS);
        } else {
            self.doc.remove_class(body, FOCUS_CLASS);
        }
    }
}

/// Channels a page task listens on.
pub struct PageChannels {
    pub commands: mpsc::UnboundedReceiver<PageCommand>,
    pub system_dark: watch::Receiver<bool>,
    pub suspended: watch::Receiver<bool>,
}

/// Reads the persisted state for a fresh page. Failures leave the page untouched.
async fn load_state(storage: &dyn StorageArea) -> Option<FocusState> {
    match storage.get(&[THEME_KEY, FOCUS_KEY]).await {
        Ok(values) => Some(FocusState::from_values(&values)),
        Err(e) => {
            warn!(error = %e, "Could not read focus state for page");
            None
        }
    }
}

/// Spawns the task driving one page until its command channel closes.
pub fn spawn_page(
    page: PageContext,
    storage: Arc<dyn StorageArea>,
    config: &ExtensionConfig,
    channels: PageChannels,
) -> JoinHandle<()> {
    let ad_delay = config.ad_initial_delay();
    tokio::spawn(run_page(page, storage, ad_delay, channels))
}

fn run_page(
    mut page: PageContext,
    storage: Arc<dyn StorageArea>,
    ad_delay: std::time::Duration,
    channels: PageChannels,
) -> impl Future<Output = ()> + Send {
    let PageChannels {
        mut commands,
        mut system_dark,
        mut suspended,
    } = channels;

    async move {
        let state = load_state(storage.as_ref()).await;
        page.initialize(state);

        let ad_timer = tokio::time::sleep(ad_delay);
        tokio::pin!(ad_timer);
        let mut ad_pending = true;
        let mut scheme_open = true;
        let mut suspend_open = true;

        loop {
            if *suspended.borrow_and_update() {
                debug!(url = page.document().url(), "Page suspended");
                if suspended.changed().await.is_err() {
                    break;
                }
                continue;
            }

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => page.handle_command(command),
                    None => break,
                },
                changed = system_dark.changed(), if scheme_open => match changed {
                    Ok(()) => {
                        let dark = *system_dark.borrow_and_update();
                        page.on_system_scheme_change(dark);
                    }
                    Err(_) => scheme_open = false,
                },
                changed = suspended.changed(), if suspend_open => {
                    if changed.is_err() {
                        suspend_open = false;
                    }
                },
                () = &mut ad_timer, if ad_pending => {
                    ad_pending = false;
                    let report = page.run_ad_pass();
                    debug!(hidden = report.hidden, "Initial ad pass done");
                },
            }
        }
        info!(url = page.document().url(), "Page context closed");
    }
}
