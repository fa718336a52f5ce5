use serde::{Deserialize, Serialize};

/// Readable text pulled out of one page. Built per extraction and discarded after export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub content: String,
    pub url: String,
    /// Save date as shown to the user (`M/D/YYYY`).
    pub date: String,
}

impl ArticleRecord {
    /// Length of the trimmed content in characters.
    pub fn content_chars(&self) -> usize {
        self.content.trim().chars().count()
    }
}
