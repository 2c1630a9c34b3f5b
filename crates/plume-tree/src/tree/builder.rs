//! Node creation and the two-phase tree builder.

use plume_rdf::{Iri, Term};
use tracing::warn;

use super::FormTree;
use crate::actions::Action;
use crate::error::{ForbiddenReason, IntegrityIssue, PlumeError, Result};
use crate::id::NodeId;
use crate::node::{MAX_ROWSPAN, NodeKind, NodeRecord, OrderIndex, PropertyInfo};
use crate::session::Session;

/// When row, single-child and pool bookkeeping runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Bulk construction: bookkeeping waits for [`TreeBuilder::finish`].
    Build,
    /// Live edit: every insertion refreshes its parent.
    Live,
}

/// Description of a node to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub is_ghost: bool,
    pub order_idx: Option<OrderIndex>,
}

impl NodeSpec {
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            is_ghost: false,
            order_idx: None,
        }
    }

    #[must_use]
    pub fn ghost(mut self, is_ghost: bool) -> Self {
        self.is_ghost = is_ghost;
        self
    }

    #[must_use]
    pub fn order(mut self, order_idx: OrderIndex) -> Self {
        self.order_idx = Some(order_idx);
        self
    }
}

/// Accumulates nodes without per-insertion bookkeeping, then finalizes
/// rows, single-child flags and cleanup once.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    tree: FormTree,
}

impl TreeBuilder {
    /// Start a tree describing `dataset_id` (a fresh `urn:uuid:` IRI when
    /// `None`).
    #[must_use]
    pub fn new(session: Session, dataset_id: Option<Iri>) -> Self {
        Self {
            tree: FormTree::with_root(session, dataset_id),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// Tree under construction, for lookups.
    #[must_use]
    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    /// Insert a node under `parent`.
    ///
    /// Returns `None` when the node is not materialized at all: a ghost
    /// value without a value, or a ghost button.
    pub fn insert(&mut self, parent: NodeId, spec: NodeSpec) -> Result<Option<NodeId>> {
        self.tree.insert_node(parent, spec, Phase::Build)
    }

    /// Declare `value` and `group` alternate forms of the same property.
    pub fn link_twins(&mut self, value: NodeId, group: NodeId, value_hidden: bool) -> Result<()> {
        self.tree.link_twins(value, group, value_hidden, Phase::Build)
    }

    /// Remove empty groups, then compute rows and single-child flags of
    /// every group. The returned tree has an empty action book.
    #[must_use]
    pub fn finish(mut self) -> FormTree {
        self.tree.clean();
        let groups: Vec<NodeId> = self
            .tree
            .tree_order()
            .into_iter()
            .filter(|id| self.tree.node(*id).is_some_and(|r| r.kind.is_group()))
            .collect();
        for group in groups {
            self.tree.compute_rows(group);
            self.tree.compute_single_children(group);
        }
        self.tree.clear_actions();
        self.tree
    }
}

impl FormTree {
    pub(crate) fn insert_node(
        &mut self,
        parent: NodeId,
        spec: NodeSpec,
        phase: Phase,
    ) -> Result<Option<NodeId>> {
        let parent_record = self.get(parent)?;
        let is_ghost = spec.is_ghost || parent_record.is_ghost;
        let is_hidden_m = parent_record.is_hidden_m;
        let in_values_group = parent_record.kind.is_values_group();
        let in_translation_group = matches!(parent_record.kind, NodeKind::TranslationGroup(_));

        let mut kind = spec.kind;
        if is_ghost {
            match kind {
                NodeKind::Value(ref value) if value.value.is_none() => return Ok(None),
                NodeKind::PlusButton | NodeKind::TranslationButton => return Ok(None),
                NodeKind::TranslationGroup(group) => kind = NodeKind::GroupOfValues(group.values),
                _ => {}
            }
        }
        self.check_parent(parent, &kind)?;

        let main_language = self.session.main_language().to_owned();
        let group_property = self.property_of_group(parent);
        match &mut kind {
            NodeKind::GroupOfProperties(group) => {
                if in_values_group {
                    group.property = None;
                } else if group.property.is_none() {
                    return Err(missing("predicate", parent));
                }
                if group.node.as_literal().is_some() {
                    return Err(PlumeError::UnknownParameterValue {
                        parameter: "node",
                        value: group.node.to_string(),
                    });
                }
            }
            NodeKind::TranslationGroup(group) => {
                let property = &mut group.values.property;
                property.xsdtype = Some(Iri::new(plume_rdf::namespace::rdf::LANG_STRING));
                property.rdfclass = None;
                property.sources.clear();
                property.transform = None;
                group.available_languages = self.session.langlist().to_vec();
            }
            NodeKind::Value(value) => {
                if in_values_group {
                    value.property = None;
                }
                let Some(property) = group_property.as_ref().or(value.property.as_ref()) else {
                    return Err(missing("predicate", parent));
                };
                let property = property.clone();
                value.is_long_text &= property.accepts_long_text();
                value.independant_label &= property.label.is_some();
                value.rowspan = value.rowspan.clamp(1, MAX_ROWSPAN);
                if value
                    .value_source
                    .as_ref()
                    .is_some_and(|source| !property.sources.contains(source))
                {
                    value.value_source = None;
                }
                if property.is_lang_string() {
                    let explicit = value.value_language.take().or_else(|| {
                        value
                            .value
                            .as_ref()
                            .and_then(Term::as_literal)
                            .and_then(|literal| literal.language().map(str::to_owned))
                    });
                    value.value_language = match explicit {
                        Some(language) => Some(language),
                        None if in_translation_group && !is_ghost => {
                            match self.available_languages(parent).and_then(|l| l.first()) {
                                Some(language) => Some(language.clone()),
                                None if phase == Phase::Live => {
                                    return Err(PlumeError::breach(
                                        parent,
                                        IntegrityIssue::NoAvailableLanguage,
                                    ));
                                }
                                None => Some(main_language.clone()),
                            }
                        }
                        None => Some(main_language.clone()),
                    };
                } else {
                    value.value_language = None;
                }
            }
            _ => {}
        }

        let id = self.allocate_id()?;
        let mut record = NodeRecord::new(id, Some(parent), kind);
        record.is_ghost = is_ghost;
        record.is_hidden_m = is_hidden_m;
        if !in_values_group && !record.kind.is_button() {
            record.order_idx = Some(spec.order_idx.unwrap_or_default());
        }
        let is_button = record.kind.is_button();
        let language = record
            .kind
            .as_value()
            .and_then(|value| value.value_language.clone());
        self.nodes.insert(id, record);

        let parent_record = self.get_mut(parent)?;
        if is_button {
            if let Some(group) = parent_record.kind.values_group_mut() {
                group.button = Some(id);
            }
        } else {
            parent_record.children.push(id);
        }
        self.log(Action::Create, id);

        if in_translation_group && !is_ghost {
            if let Some(language) = language {
                if !self.session.knows_language(&language) {
                    warn!(node = id.get(), %language, "translation outside the session languages");
                } else if !self
                    .available_languages(parent)
                    .is_some_and(|pool| pool.contains(&language))
                {
                    warn!(node = id.get(), %language, "duplicate translation language");
                }
                self.language_out(parent, &language);
            }
        }

        if phase == Phase::Live {
            self.compute_rows(parent);
            self.compute_single_children(parent);
        }
        Ok(Some(id))
    }

    fn property_of_group(&self, parent: NodeId) -> Option<PropertyInfo> {
        self.node(parent)
            .and_then(|record| record.kind.values_group())
            .map(|group| group.property.clone())
    }

    fn check_parent(&self, parent: NodeId, kind: &NodeKind) -> Result<()> {
        let parent_record = self.get(parent)?;
        let allowed = match (kind, &parent_record.kind) {
            (NodeKind::Root(_), _) => false,
            (NodeKind::Tab(_), NodeKind::Root(_) | NodeKind::GroupOfProperties(_)) => true,
            (
                NodeKind::GroupOfValues(_) | NodeKind::TranslationGroup(_),
                NodeKind::Root(_) | NodeKind::Tab(_) | NodeKind::GroupOfProperties(_),
            ) => true,
            (NodeKind::GroupOfProperties(_), NodeKind::TranslationGroup(_)) => false,
            (NodeKind::GroupOfProperties(_), NodeKind::GroupOfValues(group)) => {
                if group.property.rdfclass.is_none() {
                    return Err(PlumeError::breach(parent, IntegrityIssue::MissingParentClass));
                }
                true
            }
            (NodeKind::GroupOfProperties(_) | NodeKind::Value(_), other) => other.is_group(),
            (NodeKind::PlusButton, NodeKind::GroupOfValues(_))
            | (NodeKind::TranslationButton, NodeKind::TranslationGroup(_)) => true,
            _ => false,
        };
        if !allowed {
            return Err(PlumeError::forbidden(
                parent,
                ForbiddenReason::ParentKindMismatch {
                    parent: parent_record.kind.name(),
                    child: kind.name(),
                },
            ));
        }
        if kind.is_button() {
            if self.button(parent).is_some() {
                return Err(PlumeError::forbidden(parent, ForbiddenReason::DuplicateButton));
            }
            return Ok(());
        }
        let is_tab = matches!(kind, NodeKind::Tab(_));
        let mixed = parent_record.children.iter().any(|child| {
            self.node(*child)
                .is_some_and(|c| matches!(c.kind, NodeKind::Tab(_)) != is_tab)
        });
        if mixed {
            return Err(PlumeError::forbidden(parent, ForbiddenReason::MixedTabSiblings));
        }
        Ok(())
    }

    /// Link a value and a property group as twins. `value_hidden` tells
    /// which of the two is displayed.
    pub(crate) fn link_twins(
        &mut self,
        value: NodeId,
        group: NodeId,
        value_hidden: bool,
        phase: Phase,
    ) -> Result<()> {
        let value_record = self.get(value)?;
        let group_record = self.get(group)?;
        if value_record.is_ghost || group_record.is_ghost {
            return Err(PlumeError::forbidden(value, ForbiddenReason::GhostTwin));
        }
        if !matches!(value_record.kind, NodeKind::Value(_))
            || !matches!(group_record.kind, NodeKind::GroupOfProperties(_))
        {
            return Err(PlumeError::forbidden(value, ForbiddenReason::TwinKindMismatch));
        }
        if value_record.parent != group_record.parent {
            return Err(PlumeError::forbidden(value, ForbiddenReason::TwinParentMismatch));
        }
        if value_record.twin.is_some() || group_record.twin.is_some() {
            return Err(PlumeError::forbidden(value, ForbiddenReason::TwinTaken));
        }
        let parent = value_record.parent;
        let parent_hidden = parent.is_some_and(|p| self.node(p).is_some_and(|r| r.is_hidden_m));

        self.get_mut(value)?.twin = Some(group);
        self.get_mut(group)?.twin = Some(value);
        if !parent_hidden {
            self.hide_m(value, value_hidden, false);
            self.hide_m(group, !value_hidden, false);
        }
        self.settle_main_twin(value);

        if phase == Phase::Live {
            if let Some(parent) = parent {
                self.compute_rows(parent);
                self.compute_single_children(parent);
            }
        }
        Ok(())
    }

    /// Groups without children disappear, groups holding only ghosts
    /// become ghosts.
    pub(crate) fn clean(&mut self) {
        let order = self.tree_order();
        for id in order.into_iter().rev() {
            if id == self.root {
                continue;
            }
            let Some(record) = self.node(id) else {
                continue;
            };
            if !record.kind.is_group() {
                continue;
            }
            if record.children.is_empty() {
                self.remove_subtree(id);
                continue;
            }
            if !record.is_ghost && record.children.iter().all(|child| self.is_ghost(*child)) {
                self.make_ghost(id);
            }
        }
    }

    fn make_ghost(&mut self, id: NodeId) {
        if let Some(button) = self.button(id) {
            self.remove_subtree(button);
        }
        if let Some(twin) = self.twin(id) {
            self.unlink_twin(id, twin);
        }
        if let Some(record) = self.nodes.get_mut(&id) {
            record.is_ghost = true;
            record.row = None;
        }
    }
}

fn missing(parameter: &'static str, parent: NodeId) -> PlumeError {
    PlumeError::MissingParameter {
        parameter,
        node: Some(parent),
    }
}
