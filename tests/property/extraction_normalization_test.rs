//! Property-based tests for extraction and text normalization.

use chrono::NaiveDate;
use proptest::prelude::*;
use readfocus::dom::Document;
use readfocus::services::content_extractor::{normalize_text, ContentExtractor, ContentExtractorTrait};
use readfocus::services::markdown_export::export_filename;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn normalized_text_has_no_whitespace_runs(text in "[a-z \\t\\n]{0,80}") {
        let out = normalize_text(&text);
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains('\n'));
        prop_assert!(!out.contains('\t'));
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert_eq!(normalize_text(&out), out.clone());
    }

    #[test]
    fn qualifying_article_yields_its_words(words in prop::collection::vec("[a-z]{3,9}", 25..40)) {
        let text = words.join(" ");
        prop_assume!(text.chars().count() > 100);
        let html = format!(
            "<body><nav>menu items</nav><article><p>{}</p></article><footer>legal</footer></body>",
            words.join(" \n ")
        );
        let doc = Document::parse(&html, "https://t.test/");
        let article = ContentExtractor::new().extract_at(&doc, date());
        prop_assert_eq!(article.content, text);
        prop_assert_eq!(article.date, "1/31/2025");
    }

    #[test]
    fn export_filename_is_safe(title in "\\PC{0,40}") {
        let name = export_filename(&title);
        prop_assert!(name.ends_with(".md"));
        let stem = &name[..name.len() - 3];
        prop_assert_eq!(stem.len(), title.encode_utf16().count());
        prop_assert!(stem.chars().all(|c| c == '_' || c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
