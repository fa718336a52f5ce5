use std::fmt;

use thiserror::Error;

use super::tab::TabId;

// === StorageError ===

/// Errors from the persistent key-value store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// The store refused the operation (quota, sync disabled, shut down).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(String),
    /// The stored data could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

// === MessagingError ===

/// Errors from sending a message to a page context.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessagingError {
    /// The tab is closed or has no listener. Expected during broadcasts.
    #[error("Tab {0} has no message listener")]
    Unreachable(TabId),
    /// The listener exists but did not answer in time.
    #[error("Tab {tab} did not respond within {waited_ms} ms")]
    Unresponsive { tab: TabId, waited_ms: u64 },
}

impl MessagingError {
    /// Unreachable targets are expected and are ignored by broadcasters.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, MessagingError::Unreachable(_))
    }
}

// === InjectionError ===

/// Errors from running a named script inside a page context.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InjectionError {
    /// No tab with this id is open.
    #[error("No tab with id {0}")]
    NoTab(TabId),
    /// The page does not allow script injection (browser-internal pages).
    #[error("Cannot access contents of {url} in tab {tab}")]
    CannotAccess { tab: TabId, url: String },
    /// The page did not finish running the script in time.
    #[error("Script in tab {tab} did not finish within {waited_ms} ms")]
    Timeout { tab: TabId, waited_ms: u64 },
    /// The page went away while the script was running.
    #[error("Tab {0} closed before the script finished")]
    ContextGone(TabId),
}

// === FocusError ===

/// Step of a focus toggle that runs after the new flag is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStep {
    Inject,
    Icon,
}

impl fmt::Display for ToggleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleStep::Inject => write!(f, "page update"),
            ToggleStep::Icon => write!(f, "icon update"),
        }
    }
}

/// Errors from the focus/theme state protocol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FocusError {
    /// Reading or writing the persisted state failed; nothing changed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The flag was persisted but a later step failed, leaving page and store out of step.
    #[error("Focus mode saved as {persisted} but {step} failed: {reason}")]
    PartialToggle {
        persisted: bool,
        step: ToggleStep,
        reason: String,
    },
    /// There is no active tab to act on.
    #[error("No active tab")]
    NoActiveTab,
}

// === ExportError ===

/// Errors from exporting an article as a file.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExportError {
    /// Writing the file failed.
    #[error("Export I/O error: {0}")]
    Io(String),
    /// The computed file name is unusable.
    #[error("Invalid export file name: {0}")]
    InvalidFileName(String),
}

// === ConfigError ===

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(String),
    #[error("Config parse error: {0}")]
    Parse(String),
}

// === SelectorError ===

/// Errors from parsing a CSS selector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Unexpected '{found}' at {position} in selector '{selector}'")]
    Unexpected {
        selector: String,
        position: usize,
        found: char,
    },
    #[error("Unsupported {feature} in selector '{selector}'")]
    Unsupported { selector: String, feature: String },
    #[error("Unterminated {what} in selector '{selector}'")]
    Unterminated { selector: String, what: &'static str },
}
