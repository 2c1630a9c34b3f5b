//! User settings of a form.
//!
//! [`FormOptions`] holds the raw settings as a user or a configuration file
//! gives them. The effective behaviour combines them with the mode: for
//! instance `read_hide_blank` only matters in read mode. Use the
//! accessors (`hide_blank()`, `translation()`...) rather than the raw fields.

use std::fmt;
use std::str::FromStr;

use plume_tree::{PlumeError, Result, Session};
use serde::{Deserialize, Serialize};

/// Whether the form edits or only displays metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Edit,
    Read,
}

impl FromStr for Mode {
    type Err = PlumeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "edit" => Ok(Self::Edit),
            "read" => Ok(Self::Read),
            other => Err(PlumeError::UnknownParameterValue {
                parameter: "mode",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Edit => write!(f, "edit"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Raw form settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormOptions {
    pub mode: Mode,
    /// Translation mode: translation groups and language menus.
    pub translation: bool,
    /// Authorized languages, by priority.
    pub lang_list: Vec<String>,
    /// Main language. Ignored when not in `lang_list`.
    pub language: Option<String>,
    /// Longer labels stand on their own row.
    pub label_length_limit: usize,
    /// Longer literal values are shown as long text.
    pub value_length_limit: usize,
    /// Rows of a long text widget.
    pub text_edit_rowspan: u32,
    pub read_hide_blank: bool,
    pub edit_hide_unlisted: bool,
    pub read_hide_unlisted: bool,
    pub edit_only_current_language: bool,
    pub read_only_current_language: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Edit,
            translation: false,
            lang_list: vec!["fr".to_owned(), "en".to_owned()],
            language: None,
            label_length_limit: 25,
            value_length_limit: 65,
            text_edit_rowspan: 6,
            read_hide_blank: true,
            edit_hide_unlisted: false,
            read_hide_unlisted: true,
            edit_only_current_language: false,
            read_only_current_language: true,
        }
    }
}

impl FormOptions {
    /// Default settings in the given mode.
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: bool) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_lang_list<I, S>(mut self, lang_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lang_list = lang_list.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_label_length_limit(mut self, limit: usize) -> Self {
        self.label_length_limit = limit;
        self
    }

    #[must_use]
    pub fn with_value_length_limit(mut self, limit: usize) -> Self {
        self.value_length_limit = limit;
        self
    }

    #[must_use]
    pub fn with_text_edit_rowspan(mut self, rowspan: u32) -> Self {
        self.text_edit_rowspan = rowspan;
        self
    }

    #[must_use]
    pub fn with_hide_unlisted(mut self, edit: bool, read: bool) -> Self {
        self.edit_hide_unlisted = edit;
        self.read_hide_unlisted = read;
        self
    }

    #[must_use]
    pub fn with_only_current_language(mut self, edit: bool, read: bool) -> Self {
        self.edit_only_current_language = edit;
        self.read_only_current_language = read;
        self
    }

    /// Parse settings from JSON. Missing fields take their default.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
            parameter: "options",
            value: err.to_string(),
        })
    }

    #[must_use]
    pub fn edit(&self) -> bool {
        self.mode == Mode::Edit
    }

    /// Translation mode, only available when editing.
    #[must_use]
    pub fn translation(&self) -> bool {
        self.translation && self.edit()
    }

    /// Properties without value are left out of read-only forms.
    #[must_use]
    pub fn hide_blank(&self) -> bool {
        self.read_hide_blank && !self.edit()
    }

    /// Values of properties outside the template are kept as ghosts.
    #[must_use]
    pub fn hide_unlisted(&self) -> bool {
        if self.edit() {
            self.edit_hide_unlisted
        } else {
            self.read_hide_unlisted
        }
    }

    /// Only values in the main language are displayed.
    #[must_use]
    pub fn only_current_language(&self) -> bool {
        if self.edit() {
            self.edit_only_current_language && !self.translation()
        } else {
            self.read_only_current_language
        }
    }

    /// Session of the tree built with these settings.
    ///
    /// Fails with `MissingParameter` when no language is configured.
    pub fn session(&self) -> Result<Session> {
        let session = Session::new(self.lang_list.iter().cloned()).map_err(|_| {
            PlumeError::MissingParameter {
                parameter: "lang_list",
                node: None,
            }
        })?;
        let session = match &self.language {
            Some(language) => session.with_main_language(language),
            None => session,
        };
        Ok(session
            .with_edit(self.edit())
            .with_language_buttons(self.translation())
            .with_source_buttons(self.edit()))
    }
}
