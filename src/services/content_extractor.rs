//! Content extractor: picks the readable region of a page and flattens it to text.
//!
//! Best effort only. The first candidate container holding enough text wins,
//! otherwise the whole body is used.

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::dom::{Document, NodeData, NodeId, Selector};
use crate::types::article::ArticleRecord;
use crate::types::config::ExtensionConfig;

/// Containers tried in priority order.
pub const CANDIDATE_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    ".post-content",
    ".article-content",
    ".entry-content",
    ".article-body",
    ".story-body",
];

pub const UNTITLED: &str = "Untitled Article";

/// Elements whose text never reaches the reader.
const NON_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Trait defining the content extractor interface.
pub trait ContentExtractorTrait {
    fn extract(&self, doc: &Document) -> ArticleRecord;
    fn extract_at(&self, doc: &Document, date: NaiveDate) -> ArticleRecord;
}

pub struct ContentExtractor {
    min_region_chars: usize,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self::with_config(&ExtensionConfig::default())
    }

    pub fn with_config(config: &ExtensionConfig) -> Self {
        Self {
            min_region_chars: config.min_region_chars,
        }
    }

    /// The region to read from: first qualifying candidate, else `<body>`, else the root.
    pub fn select_region(&self, doc: &Document) -> NodeId {
        for source in CANDIDATE_SELECTORS {
            let selector = match Selector::parse(source) {
                Ok(s) => s,
                Err(e) => {
                    warn!(selector = source, error = %e, "Skipping candidate selector");
                    continue;
                }
            };
            let Some(first) = doc.query_selector(&selector) else {
                continue;
            };
            let chars = doc.text_content(first).trim().chars().count();
            if chars > self.min_region_chars {
                debug!(selector = source, chars, "Selected content region");
                return first;
            }
            debug!(selector = source, chars, "Candidate region too short");
        }
        match doc.body() {
            Some(body) => {
                debug!("Falling back to document body");
                body
            }
            None => doc.document_element().unwrap_or(crate::dom::document::DOCUMENT_NODE),
        }
    }

    /// Trimmed text fragments of the region in document order, joined by blank lines.
    pub fn collect_text(doc: &Document, region: NodeId) -> String {
        let mut fragments = Vec::new();
        Self::walk_text(doc, region, &mut fragments);
        fragments.join("\n\n")
    }

    fn walk_text(doc: &Document, node: NodeId, fragments: &mut Vec<String>) {
        for &child in doc.children(node) {
            match doc.data(child) {
                Some(NodeData::Text(text)) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        fragments.push(trimmed.to_string());
                    }
                }
                Some(NodeData::Element(el)) if NON_TEXT_TAGS.contains(&el.tag()) => {}
                Some(NodeData::Element(_)) => Self::walk_text(doc, child, fragments),
                _ => {}
            }
        }
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractorTrait for ContentExtractor {
    /// Extracts the article, stamped with today's local date.
    fn extract(&self, doc: &Document) -> ArticleRecord {
        self.extract_at(doc, Local::now().date_naive())
    }

    fn extract_at(&self, doc: &Document, date: NaiveDate) -> ArticleRecord {
        let title = doc.title();
        let title = match title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };

        let region = self.select_region(doc);
        let mut content = Self::collect_text(doc, region);
        if content.chars().count() < self.min_region_chars {
            debug!(
                chars = content.chars().count(),
                "Text walk too short, using raw region text"
            );
            content = doc.text_content(region);
        }
        let content = normalize_text(&content);
        debug!(chars = content.chars().count(), "Extracted article content");

        ArticleRecord {
            title,
            content,
            url: doc.url().to_string(),
            date: format_save_date(date),
        }
    }
}

/// Collapses whitespace runs to single spaces, then blank-line runs to one blank line, then trims.
pub fn normalize_text(text: &str) -> String {
    let spaced = collapse_whitespace(text);
    collapse_blank_lines(&spaced).trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Replaces every newline, whitespace, newline run with exactly two newlines.
fn collapse_blank_lines(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\n' {
            let mut j = i + 1;
            let mut last_newline = None;
            while j < chars.len() && chars[j].is_whitespace() {
                if chars[j] == '\n' {
                    last_newline = Some(j);
                }
                j += 1;
            }
            if let Some(end) = last_newline {
                out.push_str("\n\n");
                i = end + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// `M/D/YYYY` without zero padding.
pub fn format_save_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}
