//! Property schema: which properties describe each class.

use std::collections::BTreeMap;

use plume_rdf::{Iri, PropertyPath};
use plume_tree::{PlumeError, PropertyInfo, Result, Transform};
use serde::{Deserialize, Serialize};

/// Node kind of a property's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Literal,
    Iri,
    /// Values are described by their own properties.
    BlankNode,
    /// Either an IRI or a described entity, shown as twins.
    BlankNodeOrIri,
}

impl PropertyKind {
    /// Kinds built as a group of properties.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::BlankNode | Self::BlankNodeOrIri)
    }

    /// Kinds built as a value node.
    #[must_use]
    pub const fn has_value_form(self) -> bool {
        !matches!(self, Self::BlankNode)
    }
}

/// Description of one property of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub predicate: Iri,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub shape_order: Option<u32>,
    /// Class of IRI or blank node values.
    #[serde(default)]
    pub rdfclass: Option<Iri>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub input_mask: Option<String>,
    #[serde(default)]
    pub rowspan: Option<u32>,
    #[serde(default)]
    pub min_count: Option<u32>,
    #[serde(default)]
    pub max_count: Option<u32>,
    #[serde(default)]
    pub datatype: Option<Iri>,
    /// At most one value per language.
    #[serde(default)]
    pub unilang: bool,
    #[serde(default)]
    pub regex_validator: Option<String>,
    #[serde(default)]
    pub regex_validator_flags: Option<String>,
    #[serde(default)]
    pub transform: Option<Transform>,
    /// Controlled vocabularies the values are taken from.
    #[serde(default)]
    pub sources: Vec<Iri>,
    #[serde(default)]
    pub is_long_text: bool,
}

impl PropertyDescriptor {
    #[must_use]
    pub fn new(predicate: Iri, kind: PropertyKind) -> Self {
        Self {
            predicate,
            label: None,
            description: None,
            kind,
            shape_order: None,
            rdfclass: None,
            placeholder: None,
            input_mask: None,
            rowspan: None,
            min_count: None,
            max_count: None,
            datatype: None,
            unilang: false,
            regex_validator: None,
            regex_validator_flags: None,
            transform: None,
            sources: Vec::new(),
            is_long_text: false,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_datatype(mut self, datatype: Iri) -> Self {
        self.datatype = Some(datatype);
        self
    }

    #[must_use]
    pub fn with_rdfclass(mut self, rdfclass: Iri) -> Self {
        self.rdfclass = Some(rdfclass);
        self
    }

    #[must_use]
    pub fn with_count(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }

    #[must_use]
    pub fn with_unilang(mut self, unilang: bool) -> Self {
        self.unilang = unilang;
        self
    }

    #[must_use]
    pub fn with_sources(mut self, sources: Vec<Iri>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.shape_order = Some(order);
        self
    }

    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.min_count.is_some_and(|min| min > 0)
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.max_count.is_none_or(|max| max > 1)
    }

    /// Tree-level property for a node at `path`.
    #[must_use]
    pub fn property_info(&self, path: PropertyPath) -> PropertyInfo {
        PropertyInfo {
            predicate: self.predicate.clone(),
            path,
            label: self.label.clone(),
            description: self.description.clone(),
            rdfclass: self.rdfclass.clone(),
            xsdtype: self.datatype.clone(),
            sources: self.sources.clone(),
            transform: self.transform,
            placeholder: self.placeholder.clone(),
            input_mask: self.input_mask.clone(),
            is_mandatory: self.is_mandatory(),
            is_read_only: false,
            regex_validator: self.regex_validator.clone(),
            regex_validator_flags: self.regex_validator_flags.clone(),
        }
    }
}

/// Source of property descriptors.
pub trait Schema {
    /// Properties describing instances of `class`, in display order.
    /// Unknown classes have none.
    fn properties(&self, class: &Iri) -> &[PropertyDescriptor];
}

impl<T: Schema + ?Sized> Schema for &T {
    fn properties(&self, class: &Iri) -> &[PropertyDescriptor] {
        (**self).properties(class)
    }
}

/// In-memory schema keyed by class IRI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeSchema {
    shapes: BTreeMap<Iri, Vec<PropertyDescriptor>>,
}

impl ShapeSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the properties of `class`. Descriptors are kept sorted by
    /// shape order; unordered ones come last in declaration order.
    #[must_use]
    pub fn with_shape(mut self, class: Iri, mut properties: Vec<PropertyDescriptor>) -> Self {
        properties.sort_by_key(|p| p.shape_order.unwrap_or(u32::MAX));
        self.shapes.insert(class, properties);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let schema: Self =
            serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
                parameter: "schema",
                value: err.to_string(),
            })?;
        let shapes = schema
            .shapes
            .into_iter()
            .fold(Self::new(), |acc, (class, props)| acc.with_shape(class, props));
        Ok(shapes)
    }

    /// Number of described classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Schema for ShapeSchema {
    fn properties(&self, class: &Iri) -> &[PropertyDescriptor] {
        self.shapes.get(class).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dcat, dct, rdf};

    use super::*;

    #[test]
    fn cardinality_flags() {
        let title = PropertyDescriptor::new(Iri::new(dct::TITLE), PropertyKind::Literal)
            .with_count(Some(1), Some(1));
        assert!(title.is_mandatory());
        assert!(!title.is_multiple());
        let keyword = PropertyDescriptor::new(Iri::new(dcat::KEYWORD), PropertyKind::Literal);
        assert!(!keyword.is_mandatory());
        assert!(keyword.is_multiple());
    }

    #[test]
    fn shapes_are_sorted_by_order() {
        let schema = ShapeSchema::new().with_shape(
            Iri::new(dcat::DATASET),
            vec![
                PropertyDescriptor::new(Iri::new(dcat::KEYWORD), PropertyKind::Literal),
                PropertyDescriptor::new(Iri::new(dct::TITLE), PropertyKind::Literal).with_order(0),
            ],
        );
        let props = schema.properties(&Iri::new(dcat::DATASET));
        assert_eq!(props[0].predicate, Iri::new(dct::TITLE));
        assert!(schema.properties(&Iri::new(rdf::TYPE)).is_empty());
    }

    #[test]
    fn loads_from_json() {
        let raw = r#"{
            "http://www.w3.org/ns/dcat#Dataset": [
                {
                    "predicate": "http://purl.org/dc/terms/title",
                    "datatype": "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
                    "unilang": true,
                    "max_count": 1
                }
            ]
        }"#;
        let schema = ShapeSchema::from_json(raw).expect("schema");
        let props = schema.properties(&Iri::new(dcat::DATASET));
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].kind, PropertyKind::Literal);
        assert!(props[0].unilang);
    }
}
