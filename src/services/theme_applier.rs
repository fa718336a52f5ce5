//! Theme applier: puts exactly one `reading-theme-*` marker on the root element.

use tracing::debug;

use crate::dom::Document;
use crate::types::theme::{EffectiveTheme, ThemePreference};

/// Trait defining the theme applier interface.
pub trait ThemeApplierTrait {
    fn resolve(&self, preference: ThemePreference, system_prefers_dark: bool) -> EffectiveTheme;
    fn apply(
        &self,
        doc: &mut Document,
        preference: ThemePreference,
        system_prefers_dark: bool,
    ) -> EffectiveTheme;
    fn current(&self, doc: &Document) -> Option<EffectiveTheme>;
}

pub struct ThemeApplier;

impl ThemeApplier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThemeApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeApplierTrait for ThemeApplier {
    fn resolve(&self, preference: ThemePreference, system_prefers_dark: bool) -> EffectiveTheme {
        preference.resolve(system_prefers_dark)
    }

    /// Replaces whatever theme marker the root element carries with the resolved one.
    fn apply(
        &self,
        doc: &mut Document,
        preference: ThemePreference,
        system_prefers_dark: bool,
    ) -> EffectiveTheme {
        let effective = self.resolve(preference, system_prefers_dark);
        let Some(root) = doc.document_element() else {
            return effective;
        };
        for theme in EffectiveTheme::ALL {
            doc.remove_class(root, theme.marker_class());
        }
        doc.add_class(root, effective.marker_class());
        debug!(%preference, marker = effective.marker_class(), "Applied theme");
        effective
    }

    /// The theme currently marked on the root element, if any.
    fn current(&self, doc: &Document) -> Option<EffectiveTheme> {
        let root = doc.document_element()?;
        EffectiveTheme::ALL
            .into_iter()
            .find(|theme| doc.has_class(root, theme.marker_class()))
    }
}
