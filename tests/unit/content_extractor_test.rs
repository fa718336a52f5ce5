//! Integration tests for the ContentExtractor and the Markdown export built on it.
//!
//! Pages are parsed from HTML strings so each test reads like the page it models.

use chrono::NaiveDate;
use readfocus::dom::Document;
use readfocus::services::content_extractor::{
    normalize_text, ContentExtractor, ContentExtractorTrait, UNTITLED,
};
use readfocus::services::markdown_export::{export_filename, render_markdown, ExportedFile};
use readfocus::types::config::ExtensionConfig;
use rstest::rstest;

fn saved_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 8).unwrap()
}

fn extract(html: &str) -> readfocus::types::article::ArticleRecord {
    let doc = Document::parse(html, "https://news.example/story");
    ContentExtractor::new().extract_at(&doc, saved_on())
}

// ─── Region selection ───

/// A title plus body text repeated past 100 characters inside `<article>`:
/// the article is chosen and the export name is derived from the title.
#[test]
fn test_article_tag_is_selected() {
    let body_text = "Twenty chars of text".repeat(6);
    let html = format!(
        "<html><head><title>Test Article</title></head><body>\
         <nav>Menu</nav><article><p>{}</p></article><footer>Footer</footer></body></html>",
        body_text
    );
    let article = extract(&html);

    assert_eq!(article.title, "Test Article");
    assert_eq!(article.content, body_text);
    assert!(article.content.chars().count() > 100);
    assert!(!article.content.contains("Menu"));
    assert_eq!(article.url, "https://news.example/story");
    assert_eq!(article.date, "11/8/2024");
    assert_eq!(export_filename(&article.title), "test_article.md");
}

#[test]
fn test_qualifying_region_text_is_exactly_its_normalized_text() {
    let para = "a".repeat(75);
    let html = format!(
        "<body><p>outside</p><main><p>{}</p>\n   <p>{}</p></main></body>",
        para, para
    );
    let article = extract(&html);
    assert_eq!(article.content, format!("{} {}", para, para));
}

#[test]
fn test_short_candidates_fall_back_to_body() {
    let filler = "Body paragraph with enough words to count. ".repeat(4);
    let html = format!(
        "<body><article>Too short</article><div class=\"content\">Also short</div><p>{}</p></body>",
        filler
    );
    let article = extract(&html);
    assert!(article.content.starts_with("Too short Also short Body paragraph"));
}

#[rstest]
#[case("article")]
#[case("main")]
#[case("div role=\"main\"")]
#[case("div class=\"post-content\"")]
#[case("section class=\"story-body\"")]
fn test_each_candidate_kind_is_recognised(#[case] open_tag: &str) {
    let tag = open_tag.split_whitespace().next().unwrap();
    let long = "Readable sentence number one. ".repeat(5);
    let html = format!(
        "<body><p>preamble</p><{}>{}</{}></body>",
        open_tag, long, tag
    );
    let article = extract(&html);
    assert_eq!(article.content, long.trim());
}

#[test]
fn test_candidate_priority_beats_document_order() {
    let long = "x".repeat(120);
    let html = format!(
        "<body><div class=\"entry-content\">entry {}</div><main>main {}</main></body>",
        long, long
    );
    let article = extract(&html);
    assert!(article.content.starts_with("main "));
}

// ─── Text collection ───

#[test]
fn test_short_walk_uses_raw_text() {
    // The walk skips script text; the raw fallback does not.
    let html = "<body><p>Short</p><script>var x = 1;</script></body>";
    let article = extract(html);
    assert_eq!(article.content, "Shortvar x = 1;");
}

#[test]
fn test_long_walk_skips_scripts_and_styles() {
    let long = "Plenty of readable words in this paragraph. ".repeat(3);
    let html = format!(
        "<body><style>p {{ color: red }}</style><p>{}</p><script>track()</script></body>",
        long
    );
    let article = extract(&html);
    assert_eq!(article.content, long.trim());
}

#[test]
fn test_untitled_and_empty_page() {
    let article = extract("");
    assert_eq!(article.title, UNTITLED);
    assert_eq!(article.content, "");
}

#[test]
fn test_custom_region_threshold() {
    let config = ExtensionConfig {
        min_region_chars: 10,
        ..Default::default()
    };
    let doc = Document::parse(
        "<body><p>intro</p><article>Short but enough</article></body>",
        "about:blank",
    );
    let article = ContentExtractor::with_config(&config).extract_at(&doc, saved_on());
    assert_eq!(article.content, "Short but enough");
}

#[test]
fn test_normalize_is_single_line() {
    assert_eq!(normalize_text("\n\n  one\n\ntwo \t three\n"), "one two three");
}

// ─── Export ───

#[test]
fn test_exported_file_from_extraction() {
    let long = "Text ".repeat(30);
    let html = format!("<title>Hello: World?</title><article>{}</article>", long);
    let article = extract(&html);
    let file = ExportedFile::from_article(&article);

    assert_eq!(file.filename, "hello__world_.md");
    assert_eq!(file.mime_type, "text/markdown");
    assert_eq!(file.contents, render_markdown(&article));
    assert!(file
        .contents
        .starts_with("# Hello: World?\n\n**Source:** [https://news.example/story](https://news.example/story)  \n**Saved:** 11/8/2024\n\n---\n\n"));
    assert!(file.data_url().starts_with("data:text/markdown;base64,"));
}
