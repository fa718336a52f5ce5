use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Theme the user picked in the popup. `System` defers to the OS colour scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    Paper,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [ThemePreference; 4] = [
        ThemePreference::Light,
        ThemePreference::Dark,
        ThemePreference::Paper,
        ThemePreference::System,
    ];

    /// Resolves the preference against the OS colour-scheme signal.
    ///
    /// `Paper` is never produced by `System`; it is only reachable by explicit choice.
    pub fn resolve(self, system_prefers_dark: bool) -> EffectiveTheme {
        match self {
            ThemePreference::Light => EffectiveTheme::Light,
            ThemePreference::Dark => EffectiveTheme::Dark,
            ThemePreference::Paper => EffectiveTheme::Paper,
            ThemePreference::System if system_prefers_dark => EffectiveTheme::Dark,
            ThemePreference::System => EffectiveTheme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::Paper => "paper",
            ThemePreference::System => "system",
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "paper" => Ok(ThemePreference::Paper),
            "system" => Ok(ThemePreference::System),
            other => Err(format!("unknown theme preference: {}", other)),
        }
    }
}

/// The visual theme actually shown on a page. Recomputed on every apply, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    Light,
    Dark,
    Paper,
}

impl EffectiveTheme {
    pub const ALL: [EffectiveTheme; 3] =
        [EffectiveTheme::Light, EffectiveTheme::Dark, EffectiveTheme::Paper];

    /// Class placed on the root element while this theme is active.
    pub fn marker_class(&self) -> &'static str {
        match self {
            EffectiveTheme::Light => "reading-theme-light",
            EffectiveTheme::Dark => "reading-theme-dark",
            EffectiveTheme::Paper => "reading-theme-paper",
        }
    }
}
