use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::theme::ThemePreference;

/// Messages delivered to a page context's listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageMessage {
    ThemeChanged { theme: ThemePreference },
    ToggleFocusMode,
}

/// Operations that can be run inside a page context by name.
///
/// They take no arguments and capture nothing: the page context executes them
/// against its own document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum InjectedScript {
    EnableFocusMode,
    DisableFocusMode,
    ExtractArticle,
}

impl InjectedScript {
    pub fn name(&self) -> &'static str {
        match self {
            InjectedScript::EnableFocusMode => "enableFocusMode",
            InjectedScript::DisableFocusMode => "disableFocusMode",
            InjectedScript::ExtractArticle => "extractArticleContent",
        }
    }

    /// The script that moves focus mode into the given state.
    pub fn for_focus(enabled: bool) -> Self {
        if enabled {
            InjectedScript::EnableFocusMode
        } else {
            InjectedScript::DisableFocusMode
        }
    }
}

/// Return value of an injected script in one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptResult {
    pub frame_id: u32,
    pub result: Option<Value>,
}
