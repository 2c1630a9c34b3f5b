//! Translated names of fixed form elements.

/// A label with one translation per language. French is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatedLabel {
    translations: &'static [(&'static str, &'static str)],
}

impl TranslatedLabel {
    const fn new(translations: &'static [(&'static str, &'static str)]) -> Self {
        Self { translations }
    }

    /// Translation in the first language of `langlist` that has one,
    /// French otherwise.
    #[must_use]
    pub fn trans<S: AsRef<str>>(&self, langlist: &[S]) -> &'static str {
        langlist
            .iter()
            .find_map(|language| self.get(language.as_ref()))
            .or_else(|| self.get("fr"))
            .unwrap_or("")
    }

    fn get(&self, language: &str) -> Option<&'static str> {
        self.translations
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, text)| *text)
    }

    /// True when `text` is one of the translations.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.translations.iter().any(|(_, t)| *t == text)
    }
}

/// Default tabs.
pub mod tabs {
    use super::TranslatedLabel;

    pub const GENERAL: TranslatedLabel =
        TranslatedLabel::new(&[("fr", "Général"), ("en", "General")]);
    /// Catch-all tab for properties outside the template.
    pub const OTHERS: TranslatedLabel = TranslatedLabel::new(&[("fr", "Autres"), ("en", "Others")]);
    /// Descriptions of the fields of the described table.
    pub const FIELDS: TranslatedLabel = TranslatedLabel::new(&[("fr", "Champs"), ("en", "Fields")]);
}

/// Pseudo-sources offered next to real vocabularies.
pub mod sources {
    use super::TranslatedLabel;

    /// The value belongs to none of the property's vocabularies.
    pub const UNLISTED: TranslatedLabel =
        TranslatedLabel::new(&[("fr", "< non référencé >"), ("en", "< unlisted >")]);
    /// Switch to the property group twin.
    pub const MANUAL: TranslatedLabel =
        TranslatedLabel::new(&[("fr", "< manuel >"), ("en", "< manual >")]);
    /// Free IRI input, for IRI properties without vocabulary.
    pub const URI: TranslatedLabel = TranslatedLabel::new(&[("fr", "< URI >"), ("en", "< URI >")]);
}
