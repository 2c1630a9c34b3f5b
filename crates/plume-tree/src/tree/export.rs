//! Graph export.

use plume_rdf::namespace::rdf;
use plume_rdf::{Graph, Iri, Literal, Term};

use super::FormTree;
use crate::id::NodeId;
use crate::node::NodeKind;

impl FormTree {
    /// Regenerate the metadata graph described by the tree.
    ///
    /// Tabs and value groups are transparent. A property group links its
    /// node to the enclosing subject only when something below it is
    /// exported. Inactive twins and `do_not_save` values are left out;
    /// ghosts are exported, they exist to preserve values.
    #[must_use]
    pub fn build_metagraph(&self) -> Graph {
        let mut graph = Graph::new();
        let Some(NodeKind::Root(root)) = self.node(self.root).map(|r| &r.kind) else {
            return graph;
        };
        let subject = Term::Iri(root.dataset_id.clone());
        graph.insert(subject.clone(), Iri::new(rdf::TYPE), root.rdftype());
        self.export_children(self.root, &subject, &mut graph);
        graph
    }

    fn export_children(&self, group: NodeId, subject: &Term, graph: &mut Graph) {
        let Some(record) = self.node(group) else {
            return;
        };
        for child in &record.children {
            let Some(node) = self.node(*child) else {
                continue;
            };
            if node.is_shadow_twin() {
                continue;
            }
            match &node.kind {
                NodeKind::Tab(_) | NodeKind::GroupOfValues(_) | NodeKind::TranslationGroup(_) => {
                    self.export_children(*child, subject, graph);
                }
                NodeKind::GroupOfProperties(properties) => {
                    if self.is_empty_group(*child) {
                        continue;
                    }
                    let Some(predicate) = self.predicate(*child) else {
                        continue;
                    };
                    graph.insert(subject.clone(), predicate.clone(), properties.node.clone());
                    graph.insert(
                        properties.node.clone(),
                        Iri::new(rdf::TYPE),
                        properties.rdftype.clone(),
                    );
                    self.export_children(*child, &properties.node, graph);
                }
                NodeKind::Value(value) => {
                    if value.do_not_save {
                        continue;
                    }
                    let (Some(object), Some(predicate)) = (&value.value, self.predicate(*child))
                    else {
                        continue;
                    };
                    let object = match object {
                        Term::Literal(literal) if self.is_lang_string(*child) => {
                            let language = value
                                .value_language
                                .as_deref()
                                .unwrap_or(self.session.main_language());
                            Term::Literal(Literal::lang_string(literal.lexical(), language))
                        }
                        other => other.clone(),
                    };
                    graph.insert(subject.clone(), predicate.clone(), object);
                }
                NodeKind::Root(_) | NodeKind::PlusButton | NodeKind::TranslationButton => {}
            }
        }
    }

    /// True when nothing below `group` would be exported.
    #[must_use]
    pub fn is_empty_group(&self, group: NodeId) -> bool {
        let Some(record) = self.node(group) else {
            return true;
        };
        !record.children.iter().any(|child| {
            let Some(node) = self.node(*child) else {
                return false;
            };
            if node.is_shadow_twin() {
                return false;
            }
            match &node.kind {
                NodeKind::Value(value) => !value.do_not_save && value.value.is_some(),
                kind if kind.is_group() => !self.is_empty_group(*child),
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dcat, dct, rdf, vcard};
    use plume_rdf::{BlankNode, Graph, Iri, Literal, PropertyPath};

    use crate::node::{NodeKind, PropertiesGroup, PropertyInfo, TabNode, ValueNode};
    use crate::session::Session;
    use crate::tree::{NodeSpec, TreeBuilder};

    fn dataset() -> Iri {
        Iri::new("urn:uuid:3c4dbe21-58b4-4c91-a7e7-3c5e2d6f1ab2")
    }

    #[test]
    fn exports_values_through_tabs_and_groups() {
        let session = Session::new(["fr", "en"]).expect("session");
        let mut builder = TreeBuilder::new(session, Some(dataset()));
        let root = builder.root();
        let tab = builder
            .insert(
                root,
                NodeSpec::new(NodeKind::Tab(TabNode {
                    label: "Général".into(),
                })),
            )
            .expect("insert")
            .expect("created");
        let title = Iri::new(dct::TITLE);
        let title_property = PropertyInfo::new(title.clone(), PropertyPath::root().child(&title))
            .with_xsdtype(Iri::new(rdf::LANG_STRING));
        builder
            .insert(
                tab,
                NodeSpec::new(NodeKind::Value(
                    ValueNode::new(Some(title_property))
                        .with_value(Some(Literal::lang_string("Titre", "fr").into())),
                )),
            )
            .expect("insert");

        let contact = Iri::new(dcat::CONTACT_POINT);
        let contact_path = PropertyPath::root().child(&contact);
        let empty_contact = builder
            .insert(
                tab,
                NodeSpec::new(NodeKind::GroupOfProperties(PropertiesGroup {
                    property: Some(PropertyInfo::new(contact.clone(), contact_path.clone())),
                    rdftype: Iri::new(vcard::KIND),
                    node: BlankNode::new("empty").into(),
                })),
            )
            .expect("insert")
            .expect("created");
        let name = Iri::new(vcard::FN);
        builder
            .insert(
                empty_contact,
                NodeSpec::new(NodeKind::Value(ValueNode::new(Some(PropertyInfo::new(
                    name.clone(),
                    contact_path.child(&name),
                ))))),
            )
            .expect("insert");
        let tree = builder.finish();

        let mut expected = Graph::new();
        expected.insert(dataset(), Iri::new(rdf::TYPE), Iri::new(dcat::DATASET));
        expected.insert(dataset(), title, Literal::lang_string("Titre", "fr"));
        assert!(tree.build_metagraph().is_isomorphic(&expected));
        assert!(tree.is_empty_group(empty_contact));
    }

    #[test]
    fn ghost_values_are_exported() {
        let session = Session::new(["fr"]).expect("session");
        let mut builder = TreeBuilder::new(session, Some(dataset()));
        let root = builder.root();
        let identifier = Iri::new(dct::IDENTIFIER);
        let property = PropertyInfo::new(identifier.clone(), PropertyPath::root().child(&identifier));
        let ghost = builder
            .insert(
                root,
                NodeSpec::new(NodeKind::Value(
                    ValueNode::new(Some(property)).with_value(Some(Literal::plain("abc").into())),
                ))
                .ghost(true),
            )
            .expect("insert")
            .expect("ghost with a value is kept");
        let tree = builder.finish();
        assert!(tree.is_hidden(ghost));
        assert_eq!(tree.row(ghost), None);
        let graph = tree.build_metagraph();
        assert_eq!(graph.len(), 2);
    }
}
