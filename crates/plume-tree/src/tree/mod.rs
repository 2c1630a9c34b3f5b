//! Arena-backed form model tree.
//!
//! Nodes live in a map keyed by [`NodeId`]; parent links, child lists,
//! twin links and button links are plain ids. The tree owns its
//! [`Session`] and its [`ActionsBook`], so every mutation reads the same
//! configuration and logs to the same book.
//!
//! Trees are produced by a [`TreeBuilder`] and then mutated through
//! [`FormTree::apply`].

mod builder;
mod copy;
mod export;
mod languages;
mod layout;
mod ops;
mod visibility;

use std::collections::BTreeMap;

use plume_rdf::namespace::rdf;
use plume_rdf::{Iri, PropertyPath};
use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionsBook};
use crate::error::{PlumeError, Result};
use crate::id::NodeId;
use crate::node::{NodeKind, NodeRecord, OrderIndex, PropertyInfo, RootNode, ValueNode};
use crate::session::Session;

pub use builder::{NodeSpec, TreeBuilder};
pub use ops::{TreeOperation, TreeOperationKind, TreeOperationOutcome};

/// Form model tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTree {
    session: Session,
    root: NodeId,
    next_id: NodeId,
    nodes: BTreeMap<NodeId, NodeRecord>,
    #[serde(skip)]
    book: ActionsBook,
}

/// Visibility tier used by tree order: visible, hidden, then ghost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Tier {
    Visible,
    Hidden,
    Ghost,
}

impl FormTree {
    /// Tree with a lone root describing `dataset_id`, or a fresh
    /// `urn:uuid:` identifier.
    pub(crate) fn with_root(session: Session, dataset_id: Option<Iri>) -> Self {
        let root = NodeId::MIN;
        let dataset_id = dataset_id.unwrap_or_else(Iri::random_urn);
        let mut nodes = BTreeMap::new();
        nodes.insert(
            root,
            NodeRecord::new(root, None, NodeKind::Root(RootNode { dataset_id })),
        );
        Self {
            session,
            root,
            next_id: root.checked_next().unwrap_or(root),
            nodes,
            book: ActionsBook::new(),
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Identifier of the described dataset.
    #[must_use]
    pub fn dataset_id(&self) -> Option<&Iri> {
        match self.nodes.get(&self.root).map(|record| &record.kind) {
            Some(NodeKind::Root(root)) => Some(&root.dataset_id),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Lookup a node, failing with an integrity breach when unknown.
    pub fn get(&self, id: NodeId) -> Result<&NodeRecord> {
        self.nodes.get(&id).ok_or_else(|| PlumeError::unknown_node(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| PlumeError::unknown_node(id))
    }

    /// Iterate nodes in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    /// Pending change log.
    #[must_use]
    pub fn actions(&self) -> &ActionsBook {
        &self.book
    }

    pub fn clear_actions(&mut self) {
        self.book.clear();
    }

    pub fn drain_actions(&mut self, preserve: bool) -> ActionsBook {
        self.book.drain(preserve)
    }

    /// Log `action` for `id`. Ghosts are never logged.
    pub(crate) fn log(&mut self, action: Action, id: NodeId) {
        if self.nodes.get(&id).is_some_and(|record| !record.is_ghost) {
            self.book.record(action, id);
        }
    }

    fn allocate_id(&mut self) -> Result<NodeId> {
        let id = self.next_id;
        self.next_id = id.checked_next()?;
        Ok(id)
    }

    // ====================================================================
    // Relationships
    // ====================================================================

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|record| record.parent)
    }

    fn parent_kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.parent(id)
            .and_then(|parent| self.nodes.get(&parent))
            .map(|record| &record.kind)
    }

    /// Children that are not ghosts.
    #[must_use]
    pub fn real_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes.get(&id).map_or_else(Vec::new, |record| {
            record
                .children
                .iter()
                .copied()
                .filter(|child| self.nodes.get(child).is_some_and(|c| !c.is_ghost))
                .collect()
        })
    }

    /// Button of a value or translation group.
    #[must_use]
    pub fn button(&self, id: NodeId) -> Option<NodeId> {
        self.nodes
            .get(&id)
            .and_then(|record| record.kind.values_group())
            .and_then(|group| group.button)
    }

    /// Group a button belongs to.
    #[must_use]
    pub fn button_group(&self, id: NodeId) -> Option<NodeId> {
        let record = self.nodes.get(&id)?;
        record.kind.is_button().then_some(record.parent).flatten()
    }

    #[must_use]
    pub fn twin(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|record| record.twin)
    }

    /// Depth of the node, the root being generation 0.
    #[must_use]
    pub fn generation(&self, id: NodeId) -> usize {
        let mut generation = 0;
        let mut current = self.parent(id);
        while let Some(parent) = current {
            generation += 1;
            current = self.parent(parent);
        }
        generation
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    // ====================================================================
    // Delegated attributes
    // ====================================================================

    /// Property of a node: nodes in a value group read the group's, an
    /// inactive twin reads identity fields from the main twin.
    #[must_use]
    pub fn property(&self, id: NodeId) -> Option<&PropertyInfo> {
        let record = self.nodes.get(&id)?;
        if let Some(group) = self.parent_kind(id).and_then(NodeKind::values_group) {
            if record.kind.is_object() {
                return Some(&group.property);
            }
        }
        record.kind.own_property()
    }

    /// Node whose property carries the identity fields of `id`.
    fn identity_source(&self, id: NodeId) -> NodeId {
        match self.nodes.get(&id) {
            Some(record) if record.is_shadow_twin() => record.twin.unwrap_or(id),
            _ => id,
        }
    }

    #[must_use]
    pub fn predicate(&self, id: NodeId) -> Option<&Iri> {
        self.property(self.identity_source(id))
            .map(|property| &property.predicate)
    }

    #[must_use]
    pub fn path(&self, id: NodeId) -> Option<&PropertyPath> {
        self.property(self.identity_source(id))
            .map(|property| &property.path)
    }

    /// Label of a node. Tabs carry their own.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        if let Some(NodeKind::Tab(tab)) = self.nodes.get(&id).map(|record| &record.kind) {
            return Some(&tab.label);
        }
        self.property(self.identity_source(id))
            .and_then(|property| property.label.as_deref())
    }

    #[must_use]
    pub fn description(&self, id: NodeId) -> Option<&str> {
        self.property(self.identity_source(id))
            .and_then(|property| property.description.as_deref())
    }

    /// Class of the node's values, or of the node itself for groups of
    /// properties and the root.
    #[must_use]
    pub fn rdftype(&self, id: NodeId) -> Option<Iri> {
        match self.nodes.get(&id).map(|record| &record.kind) {
            Some(NodeKind::Root(root)) => Some(root.rdftype()),
            Some(NodeKind::GroupOfProperties(group)) => Some(group.rdftype.clone()),
            Some(_) => self.property(id).and_then(|p| p.rdfclass.clone()),
            None => None,
        }
    }

    #[must_use]
    pub fn xsdtype(&self, id: NodeId) -> Option<&Iri> {
        match self.nodes.get(&id).map(|record| &record.kind) {
            Some(NodeKind::Value(_) | NodeKind::GroupOfValues(_) | NodeKind::TranslationGroup(_)) => {
                self.property(id).and_then(|p| p.xsdtype.as_ref())
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn is_lang_string(&self, id: NodeId) -> bool {
        self.xsdtype(id).is_some_and(|t| t.is(rdf::LANG_STRING))
    }

    #[must_use]
    pub fn is_read_only(&self, id: NodeId) -> bool {
        self.property(id).is_some_and(|p| p.is_read_only)
    }

    #[must_use]
    pub fn is_mandatory(&self, id: NodeId) -> bool {
        self.property(id).is_some_and(|p| p.is_mandatory)
    }

    #[must_use]
    pub fn sources(&self, id: NodeId) -> &[Iri] {
        match self.nodes.get(&id).map(|record| &record.kind) {
            Some(NodeKind::Value(_) | NodeKind::GroupOfValues(_)) => {
                self.property(id).map_or(&[], |p| p.sources.as_slice())
            }
            _ => &[],
        }
    }

    #[must_use]
    pub fn value_node(&self, id: NodeId) -> Option<&ValueNode> {
        self.nodes.get(&id).and_then(|record| record.kind.as_value())
    }

    #[must_use]
    pub fn order_idx(&self, id: NodeId) -> Option<&OrderIndex> {
        self.nodes.get(&id).and_then(|record| record.order_idx.as_ref())
    }

    // ====================================================================
    // Derived layout and visibility
    // ====================================================================

    /// Hidden for structural reasons: an exhausted translation button or
    /// the plus button of a read-only group.
    #[must_use]
    pub fn is_hidden_b(&self, id: NodeId) -> bool {
        let Some(record) = self.nodes.get(&id) else {
            return false;
        };
        let Some(parent) = record.parent.and_then(|p| self.nodes.get(&p)) else {
            return false;
        };
        match (&record.kind, &parent.kind) {
            (NodeKind::TranslationButton, NodeKind::TranslationGroup(group)) => {
                group.available_languages.is_empty()
            }
            (NodeKind::PlusButton, NodeKind::GroupOfValues(group)) => group.property.is_read_only,
            _ => false,
        }
    }

    /// Ghost, structurally hidden, or below the hidden member of a twin
    /// pair.
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_none_or(|record| record.is_ghost || record.is_hidden_m)
            || self.is_hidden_b(id)
    }

    #[must_use]
    pub fn is_ghost(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|record| record.is_ghost)
    }

    /// Grid rows occupied by the node.
    #[must_use]
    pub fn rowspan(&self, id: NodeId) -> u32 {
        match self.nodes.get(&id) {
            None => 0,
            Some(record) if record.is_ghost => 0,
            Some(record) => match &record.kind {
                NodeKind::Value(_) if record.twin.is_some() => 1,
                NodeKind::Value(value) => value.rowspan,
                _ => 1,
            },
        }
    }

    #[must_use]
    pub fn row(&self, id: NodeId) -> Option<u32> {
        self.nodes
            .get(&id)
            .filter(|record| !record.is_ghost)
            .and_then(|record| record.row)
    }

    #[must_use]
    pub fn independant_label(&self, id: NodeId) -> bool {
        self.value_node(id).is_some_and(|value| value.independant_label)
    }

    /// Row of a label standing on its own row, just above the value.
    #[must_use]
    pub fn label_row(&self, id: NodeId) -> Option<u32> {
        if !self.independant_label(id) {
            return None;
        }
        self.row(id).and_then(|row| row.checked_sub(1))
    }

    #[must_use]
    pub fn is_long_text(&self, id: NodeId) -> bool {
        self.value_node(id).is_some_and(|value| value.is_long_text)
    }

    /// True for the only remaining child of a value group.
    #[must_use]
    pub fn is_single_child(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|record| !record.is_ghost && record.is_single_child == Some(true))
    }

    /// A minus button lets the user remove the node from its value group.
    #[must_use]
    pub fn has_minus_button(&self, id: NodeId) -> bool {
        let Some(record) = self.nodes.get(&id) else {
            return false;
        };
        if record.is_ghost || !record.kind.is_object() {
            return false;
        }
        self.parent_kind(id)
            .and_then(NodeKind::values_group)
            .is_some_and(|group| group.with_minus_buttons && !group.property.is_read_only)
    }

    /// A language menu lets the user change the value's language.
    #[must_use]
    pub fn has_language_button(&self, id: NodeId) -> bool {
        self.session.language_buttons()
            && self.value_node(id).is_some()
            && self.is_lang_string(id)
            && !self.is_read_only(id)
    }

    /// A source menu lets the user pick a vocabulary or the manual form.
    #[must_use]
    pub fn has_source_button(&self, id: NodeId) -> bool {
        let Some(record) = self.nodes.get(&id) else {
            return false;
        };
        if !self.session.source_buttons() || !self.session.edit() || self.is_read_only(id) {
            return false;
        }
        match &record.kind {
            NodeKind::GroupOfProperties(_) => record.twin.is_some(),
            NodeKind::Value(_) => record.twin.is_some() || self.sources(id).len() > 1,
            _ => false,
        }
    }

    /// A value outside value groups displays its own label.
    #[must_use]
    pub fn has_label(&self, id: NodeId) -> bool {
        self.value_node(id).is_some()
            && self.parent_kind(id).is_none_or(|kind| !kind.is_values_group())
            && self.label(id).is_some()
    }

    /// Languages still offered by the translation group of `id` (or by
    /// `id` itself when it is one).
    #[must_use]
    pub fn available_languages(&self, id: NodeId) -> Option<&[String]> {
        let group = match self.nodes.get(&id).map(|record| &record.kind) {
            Some(NodeKind::TranslationGroup(_)) => id,
            Some(_) => self.parent(id)?,
            None => return None,
        };
        match self.nodes.get(&group).map(|record| &record.kind) {
            Some(NodeKind::TranslationGroup(group)) => Some(&group.available_languages),
            _ => None,
        }
    }

    // ====================================================================
    // Traversal
    // ====================================================================

    fn tier(&self, id: NodeId) -> Tier {
        if self.is_ghost(id) {
            Tier::Ghost
        } else if self.is_hidden(id) {
            Tier::Hidden
        } else {
            Tier::Visible
        }
    }

    /// Children and button of `id`, sorted by visibility tier, then order
    /// index, then insertion.
    #[must_use]
    pub fn ordered_children(&self, id: NodeId) -> Vec<NodeId> {
        let Some(record) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut children: Vec<(Tier, bool, Option<&OrderIndex>, usize, NodeId)> = record
            .children
            .iter()
            .enumerate()
            .map(|(pos, child)| (self.tier(*child), false, self.order_idx(*child), pos, *child))
            .collect();
        if let Some(button) = self.button(id) {
            children.push((self.tier(button), true, None, usize::MAX, button));
        }
        children.sort();
        children.into_iter().map(|(.., child)| child).collect()
    }

    /// Depth-first traversal from the root in tree order.
    #[must_use]
    pub fn tree_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.ordered_children(id);
            stack.extend(children.into_iter().rev());
        }
        order
    }

    /// Nodes whose path is `path`, in tree order.
    #[must_use]
    pub fn find_by_path(&self, path: &PropertyPath) -> Vec<NodeId> {
        self.tree_order()
            .into_iter()
            .filter(|id| self.path(*id).is_some_and(|p| p == path))
            .collect()
    }
}
