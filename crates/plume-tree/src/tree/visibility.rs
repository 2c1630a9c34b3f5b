//! Hidden-branch propagation and twin switching.

use plume_rdf::Iri;
use tracing::debug;

use super::FormTree;
use crate::actions::Action;
use crate::error::{ForbiddenReason, PlumeError, Result};
use crate::id::NodeId;
use crate::node::NodeKind;

impl FormTree {
    /// Set the twin-hidden state of `id` and of its branch.
    ///
    /// During recursion the inactive member of a nested twin pair keeps its
    /// own state, so revealing a branch never reveals both twins.
    pub(crate) fn hide_m(&mut self, id: NodeId, hidden: bool, rec: bool) {
        let Some(record) = self.nodes.get_mut(&id) else {
            return;
        };
        if record.is_ghost || (rec && record.is_shadow_twin()) {
            return;
        }
        let changed = record.is_hidden_m != hidden;
        record.is_hidden_m = hidden;
        let is_group = record.kind.is_group();
        if changed {
            self.log(if hidden { Action::Hide } else { Action::Show }, id);
        }
        if is_group {
            for child in self.real_children(id) {
                self.hide_m(child, hidden, true);
            }
            if let Some(button) = self.button(id) {
                self.hide_m(button, hidden, true);
            }
            if changed {
                self.compute_rows(id);
            }
        }
    }

    /// Make `id` hidden (or visible) and its twin the opposite.
    ///
    /// Does nothing for ghosts, nodes without a twin, or nodes whose parent
    /// is itself hidden.
    pub(crate) fn set_hidden_m(&mut self, id: NodeId, hidden: bool) {
        let Some(record) = self.nodes.get(&id) else {
            return;
        };
        let (Some(twin), Some(parent)) = (record.twin, record.parent) else {
            return;
        };
        if record.is_ghost || self.nodes.get(&parent).is_some_and(|p| p.is_hidden_m) {
            return;
        }
        self.hide_m(id, hidden, false);
        self.hide_m(twin, !hidden, false);
        self.settle_main_twin(id);
        self.compute_rows(parent);
        self.compute_single_children(parent);
    }

    /// The visible member of a pair is the main twin. When both are hidden
    /// by an ancestor, the value keeps the role.
    pub(crate) fn settle_main_twin(&mut self, id: NodeId) {
        let Some(twin) = self.twin(id) else {
            return;
        };
        let (value, group) = match self.nodes.get(&id).map(|record| &record.kind) {
            Some(NodeKind::Value(_)) => (id, twin),
            _ => (twin, id),
        };
        let value_hidden = self.nodes.get(&value).is_some_and(|r| r.is_hidden_m);
        let group_hidden = self.nodes.get(&group).is_some_and(|r| r.is_hidden_m);
        let value_main = !value_hidden || group_hidden;
        if let Some(record) = self.nodes.get_mut(&value) {
            record.is_main_twin = value_main;
        }
        if let Some(record) = self.nodes.get_mut(&group) {
            record.is_main_twin = !value_main;
        }
    }

    /// Break a twin link. Both nodes stand alone and are shown, unless
    /// their parent is hidden.
    pub(crate) fn unlink_twin(&mut self, id: NodeId, twin: NodeId) {
        let parent_hidden = self
            .parent(id)
            .and_then(|parent| self.nodes.get(&parent))
            .is_some_and(|parent| parent.is_hidden_m);
        for node in [id, twin] {
            if let Some(record) = self.nodes.get_mut(&node) {
                record.twin = None;
                record.is_main_twin = false;
            }
            if !parent_hidden {
                self.hide_m(node, false, false);
            }
        }
    }

    /// Switch a visible twin to its hidden counterpart.
    ///
    /// Switching away from the value form clears the value. Switching away
    /// from the property group moves to the value form with `source` as its
    /// source, and the value is cleared too.
    pub(crate) fn switch_twin(&mut self, id: NodeId, source: Option<Iri>) -> Result<()> {
        let record = self.get(id)?;
        let Some(twin) = record.twin else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NoTwin));
        };
        let is_value = matches!(record.kind, NodeKind::Value(_));
        if self.is_hidden(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::HiddenNode));
        }
        self.set_hidden_m(id, true);
        debug!(node = id.get(), twin = twin.get(), "twin switched");
        if is_value {
            self.set_value(id, None);
            self.log(Action::Sources, twin);
        } else {
            self.set_source(twin, source);
            self.set_value(twin, None);
        }
        Ok(())
    }

    /// Detach a twin pair explicitly.
    pub(crate) fn detach_twin(&mut self, id: NodeId) -> Result<()> {
        let Some(twin) = self.get(id)?.twin else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NoTwin));
        };
        self.unlink_twin(id, twin);
        self.log(Action::Sources, id);
        self.log(Action::Sources, twin);
        if let Some(parent) = self.parent(id) {
            self.compute_rows(parent);
            self.compute_single_children(parent);
        }
        Ok(())
    }

    /// Replace the value of a value node, logging an update when it changes.
    pub(crate) fn set_value(&mut self, id: NodeId, value: Option<plume_rdf::Term>) {
        let Some(node) = self.nodes.get_mut(&id).and_then(|r| r.kind.as_value_mut()) else {
            return;
        };
        if node.value != value {
            node.value = value;
            self.log(Action::Update, id);
        }
    }

    /// Set the source of a value node. Sources outside the property's
    /// list become `None`.
    pub(crate) fn set_source(&mut self, id: NodeId, source: Option<Iri>) {
        let source = source.filter(|s| self.sources(id).contains(s));
        let Some(node) = self.nodes.get_mut(&id).and_then(|r| r.kind.as_value_mut()) else {
            return;
        };
        if node.value_source != source {
            node.value_source = source;
            self.log(Action::Sources, id);
            self.log(Action::Thesaurus, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dcat, vcard};
    use plume_rdf::{BlankNode, Iri, Literal, PropertyPath};

    use crate::node::{NodeKind, PropertiesGroup, PropertyInfo, ValueNode};
    use crate::session::Session;
    use crate::tree::{FormTree, NodeSpec, TreeBuilder};
    use crate::NodeId;

    fn contact_tree(value_hidden: bool) -> (FormTree, NodeId, NodeId, NodeId) {
        let session = Session::new(["fr", "en"]).expect("session");
        let mut builder = TreeBuilder::new(session, None);
        let root = builder.root();
        let predicate = Iri::new(dcat::CONTACT_POINT);
        let path = PropertyPath::root().child(&predicate);
        let property = PropertyInfo::new(predicate, path.clone())
            .with_label("Point de contact")
            .with_rdfclass(Iri::new(vcard::KIND));
        let group = builder
            .insert(
                root,
                NodeSpec::new(NodeKind::GroupOfProperties(PropertiesGroup {
                    property: Some(property.clone()),
                    rdftype: Iri::new(vcard::KIND),
                    node: BlankNode::new("c").into(),
                })),
            )
            .expect("insert")
            .expect("created");
        let name_predicate = Iri::new(vcard::FN);
        let name = builder
            .insert(
                group,
                NodeSpec::new(NodeKind::Value(
                    ValueNode::new(Some(PropertyInfo::new(
                        name_predicate.clone(),
                        path.child(&name_predicate),
                    )))
                    .with_value(Some(Literal::plain("Jean").into())),
                )),
            )
            .expect("insert")
            .expect("created");
        let value = builder
            .insert(
                root,
                NodeSpec::new(NodeKind::Value(
                    ValueNode::new(Some(property))
                        .with_value(Some(Iri::new("https://example.org/contact").into())),
                )),
            )
            .expect("insert")
            .expect("created");
        builder.link_twins(value, group, value_hidden).expect("twins");
        (builder.finish(), value, group, name)
    }

    #[test]
    fn exactly_one_twin_is_visible() {
        let (tree, value, group, name) = contact_tree(false);
        assert!(!tree.is_hidden(value));
        assert!(tree.is_hidden(group));
        assert!(tree.is_hidden(name));
        assert_eq!(tree.row(value), tree.row(group));
    }

    #[test]
    fn switching_to_the_group_clears_the_value() {
        let (mut tree, value, group, name) = contact_tree(false);
        tree.switch_twin(value, None).expect("switch");
        assert!(tree.is_hidden(value));
        assert!(!tree.is_hidden(group));
        assert!(!tree.is_hidden(name));
        assert_eq!(tree.value_node(value).and_then(|v| v.value.clone()), None);
        assert!(tree.actions().show.contains(&group));
        assert!(tree.actions().hide.contains(&value));
        assert!(tree.actions().update.contains(&value));
    }

    #[test]
    fn hidden_twin_cannot_be_switched() {
        let (mut tree, _, group, _) = contact_tree(false);
        assert!(tree.switch_twin(group, None).is_err());
    }

    #[test]
    fn detached_twins_are_both_visible() {
        let (mut tree, value, group, name) = contact_tree(true);
        tree.detach_twin(value).expect("detach");
        assert!(!tree.is_hidden(value));
        assert!(!tree.is_hidden(group));
        assert!(!tree.is_hidden(name));
        assert_eq!(tree.twin(value), None);
    }
}
