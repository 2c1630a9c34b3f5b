//! Structural edits: copying branches, adding through buttons, removing
//! nodes.

use plume_rdf::BlankNode;

use super::FormTree;
use super::builder::{NodeSpec, Phase};
use crate::actions::Action;
use crate::error::{ForbiddenReason, PlumeError, Result};
use crate::id::NodeId;
use crate::node::NodeKind;

impl FormTree {
    /// Copy the branch of `id` under `parent`.
    ///
    /// An `empty` copy drops values, languages and sources, and copies only
    /// the first child of a value group. A value twin is copied with its
    /// property group, never on its own, so copying it directly yields
    /// `None`.
    pub(crate) fn copy(&mut self, id: NodeId, parent: NodeId, empty: bool) -> Result<Option<NodeId>> {
        let record = self.get(id)?;
        if id == self.root {
            return Err(PlumeError::forbidden(id, ForbiddenReason::RootCopy));
        }
        if record.is_ghost {
            return Err(PlumeError::forbidden(id, ForbiddenReason::GhostCopy));
        }
        if matches!(record.kind, NodeKind::Value(_)) && record.twin.is_some() {
            return Ok(None);
        }
        self.copy_node(id, parent, empty)
    }

    fn copy_node(&mut self, id: NodeId, parent: NodeId, empty: bool) -> Result<Option<NodeId>> {
        let record = self.get(id)?.clone();
        let mut kind = record.kind.clone();
        match &mut kind {
            NodeKind::Value(value) if empty => {
                value.value = None;
                value.value_language = None;
                value.value_source = None;
            }
            NodeKind::GroupOfProperties(group) => group.node = BlankNode::fresh().into(),
            NodeKind::GroupOfValues(group) => group.button = None,
            NodeKind::TranslationGroup(group) => group.values.button = None,
            _ => {}
        }
        let mut spec = NodeSpec::new(kind);
        spec.order_idx = record.order_idx;
        let Some(copy) = self.insert_node(parent, spec, Phase::Live)? else {
            return Ok(None);
        };

        if record.kind.is_group() {
            let mut children = self.real_children(id);
            if empty && record.kind.is_values_group() {
                children.truncate(1);
            }
            for child in children {
                self.copy(child, copy, empty)?;
            }
            if let Some(button) = self.button(id) {
                let kind = self.get(button)?.kind.clone();
                self.insert_node(copy, NodeSpec::new(kind), Phase::Live)?;
            }
        }

        if let (NodeKind::GroupOfProperties(_), Some(twin)) = (&record.kind, record.twin) {
            let value_hidden = self.get(twin)?.is_hidden_m;
            if let Some(twin_copy) = self.copy_node(twin, parent, empty)? {
                self.link_twins(twin_copy, copy, value_hidden, Phase::Live)?;
            }
        }
        Ok(Some(copy))
    }

    /// Add a sibling through a plus or translation button.
    pub(crate) fn add(&mut self, button: NodeId) -> Result<NodeId> {
        let record = self.get(button)?;
        if !record.kind.is_button() {
            return Err(PlumeError::forbidden(button, ForbiddenReason::NotAButton));
        }
        let Some(group) = record.parent else {
            return Err(PlumeError::forbidden(button, ForbiddenReason::NotAButton));
        };
        if matches!(record.kind, NodeKind::TranslationButton)
            && self.available_languages(group).is_none_or(<[String]>::is_empty)
        {
            return Err(PlumeError::forbidden(
                button,
                ForbiddenReason::LanguagePoolExhausted,
            ));
        }
        if self.is_hidden(button) {
            return Err(PlumeError::forbidden(button, ForbiddenReason::HiddenButton));
        }
        let template = self.real_children(group).into_iter().find(|child| {
            self.node(*child)
                .is_some_and(|c| !(matches!(c.kind, NodeKind::Value(_)) && c.twin.is_some()))
        });
        let Some(template) = template else {
            return Err(PlumeError::forbidden(group, ForbiddenReason::EmptyGroup));
        };
        self.copy(template, group, true)?
            .ok_or_else(|| PlumeError::forbidden(group, ForbiddenReason::EmptyGroup))
    }

    /// Remove a node of a value group, with its twin.
    pub(crate) fn drop_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(PlumeError::forbidden(id, ForbiddenReason::RootRemoval));
        }
        let record = self.get(id)?;
        let twin = record.twin;
        let Some(parent) = record.parent else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::RootRemoval));
        };
        if !self.has_minus_button(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NoMinusButton));
        }
        if self.is_single_child(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::LastChild));
        }
        if self.is_hidden(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::HiddenNode));
        }
        let language = self
            .value_node(id)
            .and_then(|value| value.value_language.clone());

        if let Some(twin) = twin {
            for node in [id, twin] {
                if let Some(record) = self.nodes.get_mut(&node) {
                    record.twin = None;
                }
            }
            self.remove_subtree(twin);
        }
        self.remove_subtree(id);
        self.compute_rows(parent);
        self.compute_single_children(parent);
        if let Some(language) = language {
            if matches!(
                self.node(parent).map(|r| &r.kind),
                Some(NodeKind::TranslationGroup(_))
            ) {
                self.language_in(parent, &language);
            }
        }
        Ok(())
    }

    /// Delete the branch of `id`, including buttons. A surviving twin is
    /// unlinked and shown.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        let mut branch = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(record) = self.nodes.get(&node) else {
                continue;
            };
            branch.push(node);
            stack.extend(record.children.iter().copied());
            if let Some(button) = record.kind.values_group().and_then(|g| g.button) {
                stack.push(button);
            }
        }
        if let Some(twin) = self.twin(id) {
            self.unlink_twin(id, twin);
        }
        if let Some(parent) = self.parent(id) {
            if let Some(record) = self.nodes.get_mut(&parent) {
                record.children.retain(|child| *child != id);
                if let Some(group) = record.kind.values_group_mut() {
                    if group.button == Some(id) {
                        group.button = None;
                    }
                }
            }
        }
        for node in branch {
            self.log(Action::Drop, node);
            self.nodes.remove(&node);
        }
    }
}
