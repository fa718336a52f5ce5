//! Ad suppressor: hides advertisement-like elements by selector heuristics.
//!
//! Hiding is monotonic. A pass never un-hides anything, and elements that are
//! already out of the layout are left alone.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dom::{Document, MutationRecord, NodeId, Selector};
use crate::types::config::ExtensionConfig;

pub const DEFAULT_AD_SELECTORS: &[&str] = &[
    "[class*=\"ad\"]",
    "[id*=\"ad\"]",
    "[class*=\"advertisement\"]",
    "[id*=\"advertisement\"]",
    ".google-ads",
    ".adsystem",
    ".ad-container",
    ".sidebar-ads",
    ".banner-ad",
    "[class*=\"sponsored\"]",
    "[data-ad-client]",
];

/// Outcome of one suppression pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuppressionReport {
    /// Elements hidden by this pass.
    pub hidden: usize,
    /// Selectors that failed to parse and were skipped.
    pub skipped_selectors: Vec<String>,
}

/// Trait defining the ad suppressor interface.
pub trait AdSuppressorTrait {
    fn suppress(&self, doc: &mut Document) -> SuppressionReport;
    fn selectors(&self) -> &[String];
}

pub struct AdSuppressor {
    selectors: Vec<String>,
}

impl AdSuppressor {
    pub fn new() -> Self {
        Self::with_config(&ExtensionConfig::default())
    }

    /// Default selectors followed by the configured extras.
    pub fn with_config(config: &ExtensionConfig) -> Self {
        let mut selectors: Vec<String> = DEFAULT_AD_SELECTORS.iter().map(|s| s.to_string()).collect();
        for extra in &config.extra_ad_selectors {
            if !selectors.contains(extra) {
                selectors.push(extra.clone());
            }
        }
        Self { selectors }
    }

    /// Appends the cosmetic hide selectors that adblock-syntax `rules` apply to `doc`.
    ///
    /// Generic class and id rules are resolved against the classes and ids the
    /// document holds now.
    #[cfg(feature = "filter-lists")]
    pub fn with_filter_rules(mut self, rules: &[String], doc: &Document) -> Self {
        let root = crate::dom::document::DOCUMENT_NODE;
        let mut classes = Vec::new();
        let mut ids = Vec::new();
        for node in doc.descendants(root) {
            let Some(el) = doc.element(node) else {
                continue;
            };
            classes.extend(el.classes().map(str::to_string));
            ids.extend(el.id().map(str::to_string));
        }
        classes.sort();
        classes.dedup();
        ids.sort();
        ids.dedup();

        for selector in cosmetic_selectors(rules, doc.url(), &classes, &ids) {
            if !self.selectors.contains(&selector) {
                self.selectors.push(selector);
            }
        }
        self
    }

    /// Whether a batch of mutations should trigger another pass.
    pub fn needs_pass(mutations: &[MutationRecord]) -> bool {
        mutations.iter().any(|m| !m.added_nodes.is_empty())
    }

    /// `<html>`, `<head>` and `<body>` carry the reading markers and are never hidden.
    fn is_protected(doc: &Document, id: NodeId) -> bool {
        Some(id) == doc.document_element() || Some(id) == doc.head() || Some(id) == doc.body()
    }
}

impl Default for AdSuppressor {
    fn default() -> Self {
        Self::new()
    }
}

impl AdSuppressorTrait for AdSuppressor {
    fn suppress(&self, doc: &mut Document) -> SuppressionReport {
        let mut report = SuppressionReport::default();

        for source in &self.selectors {
            let selector = match Selector::parse(source) {
                Ok(s) => s,
                Err(e) => {
                    debug!(selector = %source, error = %e, "Skipping ad selector");
                    report.skipped_selectors.push(source.clone());
                    continue;
                }
            };
            for id in doc.query_selector_all(&selector) {
                if Self::is_protected(doc, id) || !doc.occupies_space(id) {
                    continue;
                }
                doc.set_style_property(id, "display", "none !important");
                report.hidden += 1;
            }
        }

        if report.hidden > 0 {
            info!(hidden = report.hidden, url = doc.url(), "Hid ad elements");
        }
        report
    }

    fn selectors(&self) -> &[String] {
        &self.selectors
    }
}

/// Element-hiding selectors the filter rules apply to `url`.
///
/// Site-specific rules come from the url alone. Generic `##.class` and `###id`
/// rules only match the given `classes` and `ids`, and are dropped entirely
/// when a `$generichide` exception covers the url.
#[cfg(feature = "filter-lists")]
pub fn cosmetic_selectors(
    rules: &[String],
    url: &str,
    classes: &[String],
    ids: &[String],
) -> Vec<String> {
    use adblock::lists::{FilterSet, ParseOptions};
    use adblock::Engine;

    let mut filter_set = FilterSet::new(false);
    filter_set.add_filters(rules, ParseOptions::default());
    let engine = Engine::from_filter_set(filter_set, true);

    let resources = engine.url_cosmetic_resources(url);
    let mut selectors: Vec<String> = resources.hide_selectors.iter().cloned().collect();
    if !resources.generichide {
        selectors.extend(engine.hidden_class_id_selectors(classes, ids, &resources.exceptions));
    }
    selectors.sort();
    selectors.dedup();
    debug!(url, count = selectors.len(), "Resolved cosmetic filter selectors");
    selectors
}
