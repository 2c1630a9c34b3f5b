//! Editing session shared by every node of a tree.

use serde::{Deserialize, Serialize};

use crate::error::{PlumeError, Result};

/// Languages and feature toggles of one editing session.
///
/// A session is fixed when a tree is built. Row computation and the
/// language pools of translation groups are derived from it, so it is owned
/// by the tree and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    langlist: Vec<String>,
    edit: bool,
    with_language_buttons: bool,
    with_source_buttons: bool,
}

impl Session {
    /// Create a session in edit mode with both button families enabled.
    ///
    /// The first language of `langlist` is the main language. Duplicates
    /// are dropped, keeping the first occurrence.
    pub fn new<I, S>(langlist: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut languages: Vec<String> = Vec::new();
        for language in langlist {
            let language = language.into();
            if !language.is_empty() && !languages.contains(&language) {
                languages.push(language);
            }
        }
        if languages.is_empty() {
            return Err(PlumeError::MissingParameter {
                parameter: "langlist",
                node: None,
            });
        }
        Ok(Self {
            langlist: languages,
            edit: true,
            with_language_buttons: true,
            with_source_buttons: true,
        })
    }

    /// Move `language` to the front of the list. Unknown languages are
    /// ignored.
    #[must_use]
    pub fn with_main_language(mut self, language: &str) -> Self {
        if let Some(pos) = self.langlist.iter().position(|l| l == language) {
            let main = self.langlist.remove(pos);
            self.langlist.insert(0, main);
        }
        self
    }

    #[must_use]
    pub fn with_edit(mut self, edit: bool) -> Self {
        self.edit = edit;
        self
    }

    #[must_use]
    pub fn with_language_buttons(mut self, enabled: bool) -> Self {
        self.with_language_buttons = enabled;
        self
    }

    #[must_use]
    pub fn with_source_buttons(mut self, enabled: bool) -> Self {
        self.with_source_buttons = enabled;
        self
    }

    /// Main language, always the first of [`Self::langlist`].
    #[must_use]
    pub fn main_language(&self) -> &str {
        self.langlist.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn langlist(&self) -> &[String] {
        &self.langlist
    }

    #[must_use]
    pub fn knows_language(&self, language: &str) -> bool {
        self.langlist.iter().any(|l| l == language)
    }

    #[must_use]
    pub const fn edit(&self) -> bool {
        self.edit
    }

    #[must_use]
    pub const fn language_buttons(&self) -> bool {
        self.with_language_buttons
    }

    #[must_use]
    pub const fn source_buttons(&self) -> bool {
        self.with_source_buttons
    }
}
