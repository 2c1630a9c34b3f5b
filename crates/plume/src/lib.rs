#![forbid(unsafe_code)]

//! Plume metadata forms, public facade.
//!
//! Re-exports the RDF model, the form tree and the widgets dict, and
//! offers [`FormInputs`], one JSON document bundling everything a form
//! needs besides the metadata graph.
//!
//! ```ignore
//! use plume::prelude::*;
//!
//! let inputs = FormInputs::from_json(&raw)?;
//! let mut form = inputs.open(Some(&graph))?;
//! let update = form.add(button)?;
//! let exported = form.build_metagraph();
//! ```

use serde::{Deserialize, Serialize};

// --- RDF re-exports -------------------------------------------------------

pub use plume_rdf::namespace;
pub use plume_rdf::{BlankNode, Graph, Iri, Literal, PrefixMap, PropertyPath, Term, Triple};

// --- Tree re-exports ------------------------------------------------------

pub use plume_tree::{
    Action, ActionsBook, ErrorClass, ForbiddenReason, FormTree, IntegrityIssue, InvariantReport,
    NodeId, NodeKind, OrderIndex, PlumeError, Result, Session, TreeOperation, TreeOperationKind,
};

// --- Form re-exports ------------------------------------------------------

pub use plume_form::{
    Concept, ConceptScheme, FormBuilder, FormOptions, FormTemplate, FormUpdate, InternalDict,
    MemoryVocabulary, Mode, ObjectKind, OverrideData, Placement, PropertyDescriptor, PropertyKind,
    Schema, ShapeSchema, TemplateEntry, Vocabulary, WidgetFlags, WidgetKind, WidgetType,
    WidgetsDict,
};
pub use plume_form::labels;

/// Everything a form is built from, except the metadata graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInputs {
    pub options: FormOptions,
    pub schema: ShapeSchema,
    pub template: Option<FormTemplate>,
    pub data: Option<OverrideData>,
    pub vocabulary: MemoryVocabulary,
    /// Field names and descriptions of the described table.
    pub columns: Vec<(String, String)>,
    /// Extra prefixes for template and data paths, on top of the usual
    /// ones.
    pub prefixes: Vec<(String, String)>,
}

impl FormInputs {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|err| PlumeError::UnknownParameterValue {
            parameter: "form_inputs",
            value: err.to_string(),
        })
    }

    /// Build the form describing `graph`, or a blank form.
    pub fn open(&self, graph: Option<&Graph>) -> Result<WidgetsDict<&MemoryVocabulary>> {
        let mut prefixes = PrefixMap::default();
        for (prefix, namespace) in &self.prefixes {
            prefixes.bind(prefix.clone(), namespace.clone());
        }
        let mut builder = FormBuilder::new(&self.schema, self.options.clone())
            .prefixes(prefixes)
            .columns(&self.columns);
        if let Some(graph) = graph {
            builder = builder.graph(graph);
        }
        if let Some(template) = &self.template {
            builder = builder.template(template);
        }
        if let Some(data) = &self.data {
            builder = builder.data(data);
        }
        builder.build(&self.vocabulary)
    }
}

/// Common imports for form hosts.
pub mod prelude {
    pub use crate::{
        FormBuilder, FormInputs, FormOptions, FormUpdate, Graph, Iri, Literal, MemoryVocabulary,
        Mode, NodeId, PlumeError, Result, ShapeSchema, Term, Vocabulary, WidgetKind, WidgetsDict,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: &str = r#"{
        "options": { "mode": "edit", "lang_list": ["fr", "en"] },
        "schema": {
            "http://www.w3.org/ns/dcat#Dataset": [
                {
                    "predicate": "http://purl.org/dc/terms/title",
                    "label": "Libellé",
                    "datatype": "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString",
                    "min_count": 1,
                    "max_count": 1
                },
                {
                    "predicate": "https://example.org/ns#code",
                    "label": "Code",
                    "datatype": "http://www.w3.org/2001/XMLSchema#string",
                    "max_count": 1
                }
            ]
        },
        "template": {
            "tabs": ["Principal"],
            "entries": {
                "dct:title": { "tab": "Principal" },
                "ex:code": { "tab": "Principal", "is_read_only": true }
            }
        },
        "columns": [["insee_com", "Code INSEE de la commune"]],
        "prefixes": [["ex", "https://example.org/ns#"]]
    }"#;

    #[test]
    fn inputs_load_from_json() {
        let inputs = FormInputs::from_json(INPUTS).expect("inputs");
        assert_eq!(inputs.options.lang_list, ["fr", "en"]);
        assert_eq!(inputs.schema.len(), 1);
        assert!(inputs.template.is_some());
        assert_eq!(inputs.columns.len(), 1);
    }

    #[test]
    fn open_builds_a_blank_form_with_template_prefixes() {
        let inputs = FormInputs::from_json(INPUTS).expect("inputs");
        let form = inputs.open(None).expect("form");
        let tree = form.tree();
        let code = PropertyPath::root().child(&Iri::new("https://example.org/ns#code"));
        let nodes = tree.find_by_path(&code);
        assert_eq!(nodes.len(), 1);
        assert!(tree.is_read_only(nodes[0]));
        let tabs: Vec<&str> = tree
            .real_children(tree.root())
            .into_iter()
            .filter_map(|id| tree.label(id))
            .collect();
        assert_eq!(tabs, ["Principal", "Champs"]);
        assert!(
            form.build_metagraph()
                .iter()
                .all(|triple| !triple.predicate.is(namespace::plume::COLUMN))
        );
    }

    #[test]
    fn malformed_inputs_are_unknown_parameter_values() {
        let err = FormInputs::from_json("{ \"options\": 3 }").expect_err("malformed");
        assert_eq!(err.class(), ErrorClass::UnknownParameterValue);
    }
}
