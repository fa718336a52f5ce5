use readfocus::types::errors::*;

// === StorageError Tests ===

#[test]
fn storage_error_unavailable_display() {
    let err = StorageError::Unavailable("quota exceeded".to_string());
    assert_eq!(err.to_string(), "Storage unavailable: quota exceeded");
}

#[test]
fn storage_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(StorageError::Io("disk".to_string()));
    assert!(err.source().is_none());
}

// === MessagingError Tests ===

#[test]
fn messaging_error_unreachable_display() {
    let err = MessagingError::Unreachable(7);
    assert_eq!(err.to_string(), "Tab 7 has no message listener");
    assert!(err.is_unreachable());
}

#[test]
fn messaging_error_unresponsive_display() {
    let err = MessagingError::Unresponsive {
        tab: 3,
        waited_ms: 2000,
    };
    assert_eq!(err.to_string(), "Tab 3 did not respond within 2000 ms");
    assert!(!err.is_unreachable());
}

// === InjectionError Tests ===

#[test]
fn injection_error_cannot_access_display() {
    let err = InjectionError::CannotAccess {
        tab: 2,
        url: "chrome://settings".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Cannot access contents of chrome://settings in tab 2"
    );
}

#[test]
fn injection_error_no_tab_display() {
    assert_eq!(InjectionError::NoTab(9).to_string(), "No tab with id 9");
}

// === FocusError Tests ===

#[test]
fn focus_error_from_storage_is_transparent() {
    let err: FocusError = StorageError::Unavailable("sync disabled".to_string()).into();
    assert_eq!(err.to_string(), "Storage unavailable: sync disabled");
    assert!(matches!(err, FocusError::Storage(_)));
}

#[test]
fn focus_error_partial_toggle_display() {
    let err = FocusError::PartialToggle {
        persisted: true,
        step: ToggleStep::Inject,
        reason: "No tab with id 4".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Focus mode saved as true but page update failed: No tab with id 4"
    );
}

#[test]
fn focus_error_partial_toggle_icon_step() {
    let err = FocusError::PartialToggle {
        persisted: false,
        step: ToggleStep::Icon,
        reason: "gone".to_string(),
    };
    assert!(err.to_string().contains("icon update failed"));
}

// === ExportError / ConfigError Tests ===

#[test]
fn export_error_display() {
    let err = ExportError::InvalidFileName("../x.md".to_string());
    assert_eq!(err.to_string(), "Invalid export file name: ../x.md");
}

#[test]
fn config_error_display() {
    let err = ConfigError::Parse("expected value".to_string());
    assert_eq!(err.to_string(), "Config parse error: expected value");
}

// === SelectorError Tests ===

#[test]
fn selector_error_unsupported_display() {
    let err = SelectorError::Unsupported {
        selector: "a:hover".to_string(),
        feature: "pseudo-class".to_string(),
    };
    assert_eq!(err.to_string(), "Unsupported pseudo-class in selector 'a:hover'");
}

#[test]
fn selector_error_unterminated_display() {
    let err = SelectorError::Unterminated {
        selector: "[id".to_string(),
        what: "attribute selector",
    };
    assert_eq!(
        err.to_string(),
        "Unterminated attribute selector in selector '[id'"
    );
}
