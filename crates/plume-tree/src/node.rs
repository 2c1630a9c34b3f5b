//! Node records and their variant payloads.

use std::fmt;

use plume_rdf::namespace::{dcat, rdf, xsd};
use plume_rdf::{Iri, PropertyPath, Term};
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Order index used when no explicit one is given.
pub const DEFAULT_ORDER: u32 = 999;

/// Tallest widget a value may ask for, in grid rows.
pub const MAX_ROWSPAN: u32 = 50;

/// Sort key of a node among its siblings.
///
/// Compared lexicographically, so `[1]` < `[1, 0]` < `[2]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderIndex(Vec<u32>);

impl OrderIndex {
    #[must_use]
    pub fn new(parts: impl Into<Vec<u32>>) -> Self {
        Self(parts.into())
    }

    #[must_use]
    pub fn single(value: u32) -> Self {
        Self(vec![value])
    }

    #[must_use]
    pub fn parts(&self) -> &[u32] {
        &self.0
    }
}

impl Default for OrderIndex {
    fn default() -> Self {
        Self::single(DEFAULT_ORDER)
    }
}

/// Rewriting applied to IRI values before display and after input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// `mailto:` IRIs shown as plain addresses.
    Email,
    /// `tel:` IRIs shown as plain numbers.
    Phone,
}

/// Everything the tree knows about the property a node describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub predicate: Iri,
    pub path: PropertyPath,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Class of IRI or blank node values.
    #[serde(default)]
    pub rdfclass: Option<Iri>,
    /// Datatype of literal values.
    #[serde(default)]
    pub xsdtype: Option<Iri>,
    #[serde(default)]
    pub sources: Vec<Iri>,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub input_mask: Option<String>,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub regex_validator: Option<String>,
    #[serde(default)]
    pub regex_validator_flags: Option<String>,
}

impl PropertyInfo {
    /// Property with only a predicate and a path.
    #[must_use]
    pub fn new(predicate: Iri, path: PropertyPath) -> Self {
        Self {
            predicate,
            path,
            label: None,
            description: None,
            rdfclass: None,
            xsdtype: None,
            sources: Vec::new(),
            transform: None,
            placeholder: None,
            input_mask: None,
            is_mandatory: false,
            is_read_only: false,
            regex_validator: None,
            regex_validator_flags: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_xsdtype(mut self, xsdtype: Iri) -> Self {
        self.xsdtype = Some(xsdtype);
        self
    }

    #[must_use]
    pub fn with_rdfclass(mut self, rdfclass: Iri) -> Self {
        self.rdfclass = Some(rdfclass);
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Iri>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.is_read_only = read_only;
        self
    }

    /// True for `rdf:langString` properties.
    #[must_use]
    pub fn is_lang_string(&self) -> bool {
        self.xsdtype.as_ref().is_some_and(|t| t.is(rdf::LANG_STRING))
    }

    /// True when long text makes sense for this datatype.
    #[must_use]
    pub fn accepts_long_text(&self) -> bool {
        self.xsdtype
            .as_ref()
            .is_some_and(|t| t.is(rdf::LANG_STRING) || t.is(xsd::STRING))
    }
}

/// The described dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootNode {
    pub dataset_id: Iri,
}

impl RootNode {
    /// Class of the described resource.
    #[must_use]
    pub fn rdftype(&self) -> Iri {
        Iri::new(dcat::DATASET)
    }
}

/// Presentational tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabNode {
    pub label: String,
}

/// A predicate whose object is described by its own properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertiesGroup {
    /// `None` inside a value group, which holds the property.
    pub property: Option<PropertyInfo>,
    pub rdftype: Iri,
    /// Subject of the nested properties.
    pub node: Term,
}

/// A predicate holding any number of sibling values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuesGroup {
    pub property: PropertyInfo,
    pub with_minus_buttons: bool,
    /// Plus or translation button, not listed among the children.
    pub button: Option<NodeId>,
}

/// A value group whose children are translations of the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationGroup {
    pub values: ValuesGroup,
    /// Session languages not used by any child, in session order.
    pub available_languages: Vec<String>,
}

/// Leaf holding one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueNode {
    /// `None` inside a value group, which holds the property.
    pub property: Option<PropertyInfo>,
    pub value: Option<Term>,
    pub value_language: Option<String>,
    pub value_source: Option<Iri>,
    pub rowspan: u32,
    pub is_long_text: bool,
    pub independant_label: bool,
    /// Excluded from graph export.
    pub do_not_save: bool,
}

impl ValueNode {
    /// Empty value node with default layout.
    #[must_use]
    pub fn new(property: Option<PropertyInfo>) -> Self {
        Self {
            property,
            value: None,
            value_language: None,
            value_source: None,
            rowspan: 1,
            is_long_text: false,
            independant_label: false,
            do_not_save: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: Option<Term>) -> Self {
        self.value = value;
        self
    }
}

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Root(RootNode),
    Tab(TabNode),
    GroupOfProperties(PropertiesGroup),
    GroupOfValues(ValuesGroup),
    TranslationGroup(TranslationGroup),
    Value(ValueNode),
    PlusButton,
    TranslationButton,
}

impl NodeKind {
    /// Short variant name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Root(_) => "root",
            Self::Tab(_) => "tab",
            Self::GroupOfProperties(_) => "group of properties",
            Self::GroupOfValues(_) => "group of values",
            Self::TranslationGroup(_) => "translation group",
            Self::Value(_) => "value",
            Self::PlusButton => "plus button",
            Self::TranslationButton => "translation button",
        }
    }

    /// Nodes that may own children.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(
            self,
            Self::Root(_)
                | Self::Tab(_)
                | Self::GroupOfProperties(_)
                | Self::GroupOfValues(_)
                | Self::TranslationGroup(_)
        )
    }

    /// Value and translation groups.
    #[must_use]
    pub const fn is_values_group(&self) -> bool {
        matches!(self, Self::GroupOfValues(_) | Self::TranslationGroup(_))
    }

    #[must_use]
    pub const fn is_button(&self) -> bool {
        matches!(self, Self::PlusButton | Self::TranslationButton)
    }

    /// Nodes that stand for a predicate (values and property groups).
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Value(_) | Self::GroupOfProperties(_))
    }

    /// Shared value-group payload of value and translation groups.
    #[must_use]
    pub fn values_group(&self) -> Option<&ValuesGroup> {
        match self {
            Self::GroupOfValues(group) => Some(group),
            Self::TranslationGroup(group) => Some(&group.values),
            _ => None,
        }
    }

    pub(crate) fn values_group_mut(&mut self) -> Option<&mut ValuesGroup> {
        match self {
            Self::GroupOfValues(group) => Some(group),
            Self::TranslationGroup(group) => Some(&mut group.values),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&ValueNode> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub(crate) fn as_value_mut(&mut self) -> Option<&mut ValueNode> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Own property, without any delegation.
    #[must_use]
    pub fn own_property(&self) -> Option<&PropertyInfo> {
        match self {
            Self::GroupOfProperties(group) => group.property.as_ref(),
            Self::GroupOfValues(group) => Some(&group.property),
            Self::TranslationGroup(group) => Some(&group.values.property),
            Self::Value(value) => value.property.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn own_property_mut(&mut self) -> Option<&mut PropertyInfo> {
        match self {
            Self::GroupOfProperties(group) => group.property.as_mut(),
            Self::GroupOfValues(group) => Some(&mut group.property),
            Self::TranslationGroup(group) => Some(&mut group.values.property),
            Self::Value(value) => value.property.as_mut(),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One node of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    /// Owned children, in layout order. Buttons are not listed.
    pub children: Vec<NodeId>,
    /// Present in the tree but never displayed.
    pub is_ghost: bool,
    /// Hidden as the inactive member of a twin pair, or below one.
    pub is_hidden_m: bool,
    pub twin: Option<NodeId>,
    pub is_main_twin: bool,
    /// `None` inside value groups, where insertion order rules.
    pub order_idx: Option<OrderIndex>,
    pub row: Option<u32>,
    /// Set on children of value groups.
    pub is_single_child: Option<bool>,
    pub kind: NodeKind,
}

impl NodeRecord {
    pub(crate) fn new(id: NodeId, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            is_ghost: false,
            is_hidden_m: false,
            twin: None,
            is_main_twin: false,
            order_idx: None,
            row: None,
            is_single_child: None,
            kind,
        }
    }

    /// True for the non-main member of a twin pair.
    #[must_use]
    pub fn is_shadow_twin(&self) -> bool {
        self.twin.is_some() && !self.is_main_twin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_index_compares_lexicographically() {
        assert!(OrderIndex::new([1]) < OrderIndex::new([1, 0]));
        assert!(OrderIndex::new([1, 5]) < OrderIndex::new([2]));
        assert_eq!(OrderIndex::default(), OrderIndex::single(DEFAULT_ORDER));
    }

    #[test]
    fn long_text_needs_a_string_datatype() {
        let path = PropertyPath::root().child(&Iri::new("http://purl.org/dc/terms/title"));
        let info = PropertyInfo::new(Iri::new("http://purl.org/dc/terms/title"), path);
        assert!(!info.accepts_long_text());
        assert!(info.clone().with_xsdtype(Iri::new(xsd::STRING)).accepts_long_text());
        assert!(info.with_xsdtype(Iri::new(rdf::LANG_STRING)).is_lang_string());
    }

    #[test]
    fn node_kind_round_trips_through_json() {
        let kind = NodeKind::Tab(TabNode {
            label: "Général".into(),
        });
        let json = serde_json::to_string(&kind).expect("serialize");
        assert!(json.contains("\"kind\":\"tab\""));
        let back: NodeKind = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, kind);
    }
}
