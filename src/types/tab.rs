use serde::{Deserialize, Serialize};

pub type TabId = u32;

/// Toolbar icon shown for a tab.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ToolbarIcon {
    #[default]
    Default,
    Active,
}

impl ToolbarIcon {
    pub fn for_focus(enabled: bool) -> Self {
        if enabled {
            ToolbarIcon::Active
        } else {
            ToolbarIcon::Default
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ToolbarIcon::Default => "icons/icon.png",
            ToolbarIcon::Active => "icons/icon-active.png",
        }
    }
}

/// An open tab as seen by the extension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub active: bool,
    /// Whether a content script is listening for messages in this tab.
    pub has_listener: bool,
    pub suspended: bool,
    pub icon: ToolbarIcon,
}
