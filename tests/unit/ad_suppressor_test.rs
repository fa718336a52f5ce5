//! Integration tests for the AdSuppressor.
//!
//! Covers selector matching, the rendered-size rule, protected root elements
//! and configured extra selectors.

use readfocus::dom::{Document, RenderedSize};
use readfocus::services::ad_suppressor::{AdSuppressor, AdSuppressorTrait, DEFAULT_AD_SELECTORS};
use readfocus::types::config::ExtensionConfig;
use rstest::rstest;

fn is_hidden(doc: &Document, selector: &str) -> bool {
    let id = doc.select(selector).unwrap()[0];
    doc.style_property(id, "display").as_deref() == Some("none !important")
}

#[rstest]
#[case("<div class=\"advertisement\">x</div>")]
#[case("<div id=\"top-ad\">x</div>")]
#[case("<div class=\"google-ads\">x</div>")]
#[case("<aside class=\"sidebar-ads\">x</aside>")]
#[case("<div class=\"promo sponsored-box\">x</div>")]
#[case("<ins data-ad-client=\"ca-pub-1\">x</ins>")]
fn test_default_selectors_hide(#[case] markup: &str) {
    let html = format!("<body><p>story</p>{}</body>", markup);
    let mut doc = Document::parse(&html, "https://site.test/");
    let report = AdSuppressor::new().suppress(&mut doc);
    assert_eq!(report.hidden, 1, "markup: {}", markup);
    assert!(report.skipped_selectors.is_empty());
    assert!(doc.select("p").map(|p| doc.occupies_space(p[0])).unwrap());
}

#[test]
fn test_substring_match_is_greedy() {
    // "header" contains "ad"; the heuristic hides it too.
    let mut doc = Document::parse(
        "<body><div class=\"header\">Site name</div></body>",
        "https://site.test/",
    );
    AdSuppressor::new().suppress(&mut doc);
    assert!(is_hidden(&doc, "div"));
}

#[test]
fn test_zero_size_elements_are_left_alone() {
    let mut doc = Document::parse(
        "<body><div class=\"ad-slot\"></div><div class=\"ad-frame\">x</div></body>",
        "https://site.test/",
    );
    let framed = doc.select(".ad-frame").unwrap()[0];
    doc.set_rendered_size(framed, RenderedSize::new(0.0, 0.0));

    let report = AdSuppressor::new().suppress(&mut doc);
    assert_eq!(report.hidden, 0);
    assert!(doc.style_property(framed, "display").is_none());
}

#[test]
fn test_reported_size_overrides_heuristic() {
    let mut doc = Document::parse(
        "<body><div class=\"ad-slot\"></div></body>",
        "https://site.test/",
    );
    let slot = doc.select(".ad-slot").unwrap()[0];
    doc.set_rendered_size(slot, RenderedSize::new(300.0, 0.0));
    assert_eq!(AdSuppressor::new().suppress(&mut doc).hidden, 1);
}

#[test]
fn test_already_hidden_elements_are_not_counted() {
    let mut doc = Document::parse(
        "<body><div class=\"ad\" style=\"display:none\">x</div><div hidden class=\"ad\">y</div></body>",
        "https://site.test/",
    );
    assert_eq!(AdSuppressor::new().suppress(&mut doc).hidden, 0);
}

#[test]
fn test_second_pass_is_a_no_op() {
    let mut doc = Document::parse(
        "<body><div class=\"ad\">x</div><div id=\"adbox\">y</div></body>",
        "https://site.test/",
    );
    let suppressor = AdSuppressor::new();
    assert_eq!(suppressor.suppress(&mut doc).hidden, 2);
    assert_eq!(suppressor.suppress(&mut doc).hidden, 0);
    assert!(is_hidden(&doc, ".ad"));
}

#[test]
fn test_root_elements_never_hidden() {
    let mut doc = Document::parse(
        "<html class=\"reading-theme-dark\"><body class=\"reading-focus-mode\" id=\"main-ad-page\"><p>text</p></body></html>",
        "https://site.test/",
    );
    AdSuppressor::new().suppress(&mut doc);
    let html = doc.document_element().unwrap();
    let body = doc.body().unwrap();
    assert!(doc.attribute(html, "style").is_none());
    assert!(doc.attribute(body, "style").is_none());
}

#[test]
fn test_invalid_extra_selector_is_skipped() {
    let config = ExtensionConfig {
        extra_ad_selectors: vec!["div:has(> iframe)".into(), ".promo".into()],
        ..Default::default()
    };
    let mut doc = Document::parse(
        "<body><div class=\"promo\">Deal</div></body>",
        "https://site.test/",
    );
    let suppressor = AdSuppressor::with_config(&config);
    let report = suppressor.suppress(&mut doc);

    assert_eq!(report.skipped_selectors, vec!["div:has(> iframe)".to_string()]);
    assert_eq!(report.hidden, 1);
    assert_eq!(suppressor.selectors().len(), DEFAULT_AD_SELECTORS.len() + 2);
}
