//! Property-based tests for focus toggling on a page context.
//!
//! Any even number of toggles, whether by message or by injected script pair,
//! restores the exact class sets the page started with.

use proptest::prelude::*;
use readfocus::dom::Document;
use readfocus::managers::content_script::{PageContext, FOCUS_CLASS};
use readfocus::types::config::ExtensionConfig;
use readfocus::types::focus::FocusState;
use readfocus::types::message::{InjectedScript, PageMessage};
use readfocus::types::theme::ThemePreference;

fn class_sets(page: &PageContext) -> (Vec<String>, Vec<String>) {
    let doc = page.document();
    (
        doc.class_list(doc.document_element().unwrap()),
        doc.class_list(doc.body().unwrap()),
    )
}

fn arb_body_classes() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn double_toggle_restores_markers(
        classes in arb_body_classes(),
        initially_on in any::<bool>(),
        rounds in 1usize..5,
    ) {
        let html = format!("<body class=\"{}\"><p>text</p></body>", classes.join(" "));
        let mut page = PageContext::new(
            Document::parse(&html, "https://t.test/"),
            &ExtensionConfig::default(),
            false,
        );
        page.initialize(Some(FocusState {
            focus_mode_enabled: initially_on,
            theme: ThemePreference::Light,
        }));
        let before = class_sets(&page);

        for _ in 0..rounds {
            page.handle_message(PageMessage::ToggleFocusMode);
            page.handle_message(PageMessage::ToggleFocusMode);
        }
        prop_assert_eq!(class_sets(&page), before);
    }

    #[test]
    fn script_toggle_pair_matches_state(initially_on in any::<bool>()) {
        let mut page = PageContext::new(
            Document::new("https://t.test/"),
            &ExtensionConfig::default(),
            false,
        );
        page.initialize(Some(FocusState {
            focus_mode_enabled: initially_on,
            theme: ThemePreference::System,
        }));
        let before = class_sets(&page);

        page.run_script(InjectedScript::for_focus(!initially_on));
        let body = page.document().body().unwrap();
        prop_assert_eq!(page.document().has_class(body, FOCUS_CLASS), !initially_on);

        page.run_script(InjectedScript::for_focus(initially_on));
        prop_assert_eq!(class_sets(&page), before);
    }
}
