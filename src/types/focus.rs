use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::theme::ThemePreference;

/// Storage key holding the focus-mode flag.
pub const FOCUS_KEY: &str = "focusModeEnabled";
/// Storage key holding the theme preference string.
pub const THEME_KEY: &str = "theme";

/// Persisted extension state shared by every page context of one profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub focus_mode_enabled: bool,
    pub theme: ThemePreference,
}

impl FocusState {
    /// Builds the state from raw storage values.
    ///
    /// Missing or malformed entries fall back to their defaults.
    pub fn from_values(values: &HashMap<String, Value>) -> Self {
        let focus_mode_enabled = values
            .get(FOCUS_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let theme = values
            .get(THEME_KEY)
            .and_then(theme_from_value)
            .unwrap_or_default();
        Self {
            focus_mode_enabled,
            theme,
        }
    }

    /// The storage entries written by a fresh install.
    pub fn to_values(&self) -> HashMap<String, Value> {
        let mut values = HashMap::new();
        values.insert(THEME_KEY.to_string(), Value::String(self.theme.to_string()));
        values.insert(FOCUS_KEY.to_string(), Value::Bool(self.focus_mode_enabled));
        values
    }
}

/// Reads a theme preference out of a stored JSON value.
pub fn theme_from_value(value: &Value) -> Option<ThemePreference> {
    value.as_str().and_then(|s| s.parse().ok())
}
