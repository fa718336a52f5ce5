use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for extraction, ad hiding, messaging and the popup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtensionConfig {
    /// A candidate region must hold more than this many characters to be chosen.
    pub min_region_chars: usize,
    /// Articles at or below this many characters are not exported.
    pub min_export_chars: usize,
    pub ad_initial_delay_ms: u64,
    pub message_timeout_ms: u64,
    pub status_reset_ms: u64,
    pub extra_ad_selectors: Vec<String>,
    /// Adblock-syntax cosmetic rules such as `##.promo-box`. Only applied when
    /// built with the `filter-lists` feature.
    pub filter_rules: Vec<String>,
    pub download_dir: Option<PathBuf>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            min_region_chars: 100,
            min_export_chars: 50,
            ad_initial_delay_ms: 1000,
            message_timeout_ms: 2000,
            status_reset_ms: 3000,
            extra_ad_selectors: Vec::new(),
            filter_rules: Vec::new(),
            download_dir: None,
        }
    }
}

impl ExtensionConfig {
    pub fn ad_initial_delay(&self) -> Duration {
        Duration::from_millis(self.ad_initial_delay_ms)
    }

    pub fn message_timeout(&self) -> Duration {
        Duration::from_millis(self.message_timeout_ms)
    }

    pub fn status_reset(&self) -> Duration {
        Duration::from_millis(self.status_reset_ms)
    }
}
