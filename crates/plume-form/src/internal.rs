//! Presentation cache of a node.
//!
//! An [`InternalDict`] is a snapshot of everything a widget needs to
//! display one node. It is derived from the tree and never edited by
//! hand: the widgets dict recomputes it whenever the node changes.

use bitflags::bitflags;
use plume_rdf::namespace::xsd;
use plume_rdf::Iri;
use plume_tree::{FormTree, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

use crate::labels::sources;
use crate::value::{ValueContext, help_text_value, str_value};
use crate::vocabulary::Vocabulary;

bitflags! {
    /// Boolean presentation attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u8 {
        const HIDDEN            = 0b0000_0001;
        /// A source menu is displayed.
        const MULTIPLE_SOURCES  = 0b0000_0010;
        const HAS_LABEL         = 0b0000_0100;
        const MANDATORY         = 0b0000_1000;
        const READ_ONLY         = 0b0001_0000;
        const HAS_MINUS_BUTTON  = 0b0010_0000;
        /// The minus button exists but must not be shown.
        const HIDE_MINUS_BUTTON = 0b0100_0000;
    }
}

/// What a node stands for, from the widget's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Root,
    Tab,
    GroupOfProperties,
    GroupOfValues,
    TranslationGroup,
    Edit,
    PlusButton,
    TranslationButton,
}

impl ObjectKind {
    fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Root(_) => Self::Root,
            NodeKind::Tab(_) => Self::Tab,
            NodeKind::GroupOfProperties(_) => Self::GroupOfProperties,
            NodeKind::GroupOfValues(_) => Self::GroupOfValues,
            NodeKind::TranslationGroup(_) => Self::TranslationGroup,
            NodeKind::Value(_) => Self::Edit,
            NodeKind::PlusButton => Self::PlusButton,
            NodeKind::TranslationButton => Self::TranslationButton,
        }
    }
}

/// Main widget of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetType {
    GroupBox,
    ToolButton,
    CheckBox,
    Label,
    ComboBox,
    TextEdit,
    DateEdit,
    DateTimeEdit,
    TimeEdit,
    LineEdit,
}

/// Numeric input check attached to an edit widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeValidator {
    Int,
    Double,
}

impl TypeValidator {
    fn for_datatype(datatype: &Iri) -> Option<Self> {
        match datatype.as_str() {
            xsd::INTEGER | xsd::DURATION => Some(Self::Int),
            xsd::DECIMAL | xsd::FLOAT | xsd::DOUBLE => Some(Self::Double),
            _ => None,
        }
    }
}

/// Presentation snapshot of one node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InternalDict {
    pub object: Option<ObjectKind>,
    pub main_widget_type: Option<WidgetType>,
    pub label: Option<String>,
    pub help_text: Option<String>,
    pub flags: WidgetFlags,
    pub row: Option<u32>,
    pub rowspan: u32,
    pub label_row: Option<u32>,
    pub placeholder: Option<String>,
    pub input_mask: Option<String>,
    pub regex_validator_pattern: Option<String>,
    pub regex_validator_flags: Option<String>,
    pub type_validator: Option<TypeValidator>,
    /// Value as displayed.
    pub value: Option<String>,
    pub value_help_text: Option<String>,
    pub language_value: Option<String>,
    /// Current language first.
    pub authorized_languages: Vec<String>,
    /// Labels of the source menu.
    pub sources: Vec<String>,
    pub current_source: Option<String>,
    /// Concept labels of the current source.
    pub thesaurus_values: Vec<String>,
}

impl InternalDict {
    /// Snapshot of node `id`. Unknown nodes yield an empty dict.
    pub fn compute<V: Vocabulary>(tree: &FormTree, id: NodeId, vocabulary: &V) -> Self {
        let Some(record) = tree.node(id) else {
            return Self::default();
        };
        let mut dict = Self {
            object: Some(ObjectKind::of(&record.kind)),
            main_widget_type: widget_type(tree, id),
            row: tree.row(id),
            rowspan: tree.rowspan(id),
            label_row: tree.label_row(id),
            ..Self::default()
        };
        dict.flags.set(WidgetFlags::HIDDEN, tree.is_hidden(id));
        if record.kind.is_group() || record.kind.is_object() {
            dict.label = tree.label(id).map(str::to_owned);
        }
        if matches!(record.kind, NodeKind::Root(_) | NodeKind::Tab(_)) {
            return dict;
        }
        dict.help_text = tree.description(id).map(str::to_owned);
        dict.flags
            .set(WidgetFlags::MULTIPLE_SOURCES, tree.has_source_button(id));
        dict.flags.set(WidgetFlags::HAS_LABEL, tree.has_label(id));

        if let Some(value) = tree.value_node(id) {
            dict.fill_value(tree, id, vocabulary);
            if tree.has_language_button(id) {
                let current = value.value_language.clone();
                dict.authorized_languages = current.iter().cloned().collect();
                for language in tree.authorized_languages(id) {
                    if !dict.authorized_languages.contains(&language) {
                        dict.authorized_languages.push(language);
                    }
                }
            }
            if !tree.has_source_button(id) && !tree.is_read_only(id) {
                if let Some(source) = &value.value_source {
                    dict.thesaurus_values =
                        vocabulary.concept_labels(source, tree.session().langlist());
                }
            }
        }
        if record.kind.is_object() {
            let has_minus = tree.has_minus_button(id);
            dict.flags.set(WidgetFlags::HAS_MINUS_BUTTON, has_minus);
            dict.flags.set(
                WidgetFlags::HIDE_MINUS_BUTTON,
                has_minus && tree.is_single_child(id),
            );
            if tree.has_source_button(id) {
                dict.fill_sources(tree, id, vocabulary);
            }
        }
        dict
    }

    fn fill_value<V: Vocabulary>(&mut self, tree: &FormTree, id: NodeId, vocabulary: &V) {
        let property = tree.property(id);
        self.placeholder = property.and_then(|p| p.placeholder.clone());
        self.input_mask = property.and_then(|p| p.input_mask.clone());
        self.regex_validator_pattern = property.and_then(|p| p.regex_validator.clone());
        self.regex_validator_flags = property.and_then(|p| p.regex_validator_flags.clone());
        self.flags.set(WidgetFlags::MANDATORY, tree.is_mandatory(id));
        let read_only = tree.is_read_only(id);
        self.flags.set(WidgetFlags::READ_ONLY, read_only);
        if !read_only {
            self.type_validator = tree.xsdtype(id).and_then(TypeValidator::for_datatype);
        }
        let Some(ctx) = ValueContext::of(tree, id) else {
            return;
        };
        let value = tree.value_node(id).and_then(|v| v.value.as_ref());
        self.value = value.and_then(|term| str_value(&ctx, term, vocabulary));
        self.value_help_text = help_text_value(&ctx, value);
        self.language_value = ctx.language.map(str::to_owned);
    }

    fn fill_sources<V: Vocabulary>(&mut self, tree: &FormTree, id: NodeId, vocabulary: &V) {
        let langlist = tree.session().langlist();
        let unlisted = sources::UNLISTED.trans(langlist).to_owned();
        let uri = sources::URI.trans(langlist).to_owned();
        let manual = sources::MANUAL.trans(langlist).to_owned();
        let twin = tree.twin(id);
        let is_value = tree.value_node(id).is_some();
        let value_id = if is_value { Some(id) } else { twin };
        let value = value_id.and_then(|v| tree.value_node(v));
        let source_iris = value_id.map_or(&[][..], |v| tree.sources(v));

        if source_iris.is_empty() {
            self.sources = vec![uri.clone()];
            if is_value {
                self.current_source = Some(uri);
            }
        } else {
            self.sources = source_iris
                .iter()
                .map(|source| {
                    vocabulary
                        .source_label(source, langlist)
                        .unwrap_or_else(|| source.to_string())
                })
                .collect();
            match value.and_then(|v| v.value_source.as_ref()) {
                Some(source) if is_value => {
                    self.current_source = vocabulary
                        .source_label(source, langlist)
                        .or_else(|| Some(source.to_string()));
                    self.thesaurus_values = vocabulary.concept_labels(source, langlist);
                }
                _ => {
                    self.sources.insert(0, unlisted.clone());
                    if is_value {
                        self.current_source = Some(unlisted);
                    }
                }
            }
        }
        if twin.is_some() {
            self.sources.insert(0, manual.clone());
            if !is_value {
                self.current_source = Some(manual);
            }
        }
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(WidgetFlags::HIDDEN)
    }

    #[must_use]
    pub fn has_minus_button(&self) -> bool {
        self.flags.contains(WidgetFlags::HAS_MINUS_BUTTON)
    }

    #[must_use]
    pub fn hide_minus_button(&self) -> bool {
        self.flags.contains(WidgetFlags::HIDE_MINUS_BUTTON)
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(WidgetFlags::READ_ONLY)
    }
}

/// Main widget of `id`. `None` for the root.
#[must_use]
pub fn widget_type(tree: &FormTree, id: NodeId) -> Option<WidgetType> {
    let record = tree.node(id)?;
    match &record.kind {
        NodeKind::Root(_) => None,
        kind if kind.is_group() => Some(WidgetType::GroupBox),
        kind if kind.is_button() => Some(WidgetType::ToolButton),
        NodeKind::Value(value) => {
            let datatype = tree.xsdtype(id).map(Iri::as_str);
            Some(match datatype {
                Some(xsd::BOOLEAN) => WidgetType::CheckBox,
                _ if tree.is_read_only(id) => WidgetType::Label,
                _ if value.value_source.is_some() => WidgetType::ComboBox,
                _ if value.is_long_text => WidgetType::TextEdit,
                Some(xsd::DATE) => WidgetType::DateEdit,
                Some(xsd::DATE_TIME) => WidgetType::DateTimeEdit,
                Some(xsd::TIME) => WidgetType::TimeEdit,
                _ => WidgetType::LineEdit,
            })
        }
        _ => None,
    }
}
