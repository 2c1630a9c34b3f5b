//! Transactional tree operations.

use plume_rdf::{Iri, Literal, Term};
use serde::{Deserialize, Serialize};

use super::FormTree;
use crate::actions::{Action, ActionsBook};
use crate::error::{ForbiddenReason, PlumeError, Result};
use crate::id::NodeId;
use crate::node::{NodeKind, NodeRecord, OrderIndex};

/// One user-level edit of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeOperation {
    /// Add a sibling through a plus or translation button.
    Add { button: NodeId },
    /// Remove a node of a value group, with its twin.
    Drop { node: NodeId },
    /// Hide a visible twin and show the other one. `source` becomes the
    /// source of the value twin when switching away from the property
    /// group.
    SwitchTwin { node: NodeId, source: Option<Iri> },
    ChangeLanguage { node: NodeId, language: String },
    /// Pick another vocabulary for a value. The value is cleared.
    ChangeSource { node: NodeId, source: Option<Iri> },
    /// Reposition a node among its siblings. No effect in value groups.
    SetOrder { node: NodeId, order_idx: OrderIndex },
    UpdateValue {
        node: NodeId,
        value: Option<Term>,
        #[serde(default)]
        override_read_only: bool,
    },
    /// Break a twin pair; both members stay and are shown.
    DetachTwin { node: NodeId },
}

/// Operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeOperationKind {
    Add,
    Drop,
    SwitchTwin,
    ChangeLanguage,
    ChangeSource,
    SetOrder,
    UpdateValue,
    DetachTwin,
}

impl TreeOperation {
    /// Operation family.
    #[must_use]
    pub const fn kind(&self) -> TreeOperationKind {
        match self {
            Self::Add { .. } => TreeOperationKind::Add,
            Self::Drop { .. } => TreeOperationKind::Drop,
            Self::SwitchTwin { .. } => TreeOperationKind::SwitchTwin,
            Self::ChangeLanguage { .. } => TreeOperationKind::ChangeLanguage,
            Self::ChangeSource { .. } => TreeOperationKind::ChangeSource,
            Self::SetOrder { .. } => TreeOperationKind::SetOrder,
            Self::UpdateValue { .. } => TreeOperationKind::UpdateValue,
            Self::DetachTwin { .. } => TreeOperationKind::DetachTwin,
        }
    }

    /// Node the operation is invoked on.
    #[must_use]
    pub const fn target(&self) -> NodeId {
        match self {
            Self::Add { button } => *button,
            Self::Drop { node }
            | Self::SwitchTwin { node, .. }
            | Self::ChangeLanguage { node, .. }
            | Self::ChangeSource { node, .. }
            | Self::SetOrder { node, .. }
            | Self::UpdateValue { node, .. }
            | Self::DetachTwin { node } => *node,
        }
    }
}

/// Result of a successful [`FormTree::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOperationOutcome {
    pub kind: TreeOperationKind,
    pub target: NodeId,
    /// Node created by an `Add`.
    pub created: Option<NodeId>,
    /// Everything the presentation layer must do.
    pub actions: ActionsBook,
    pub before_hash: u64,
    pub after_hash: u64,
}

impl FormTree {
    /// Apply one operation atomically.
    ///
    /// The operation runs on a working copy with an empty action book. The
    /// copy is validated before it replaces `self`; on any failure `self` is
    /// unchanged.
    pub fn apply(&mut self, operation: TreeOperation) -> Result<TreeOperationOutcome> {
        let kind = operation.kind();
        let target = operation.target();
        let span = tracing::debug_span!("tree.apply", op = ?kind, node = target.get());
        let _guard = span.enter();

        let before_hash = self.state_hash();
        let mut working = self.clone();
        working.clear_actions();
        let created = working.apply_inner(operation)?;
        working.validate()?;

        let actions = working.drain_actions(false);
        let after_hash = working.state_hash();
        *self = working;
        Ok(TreeOperationOutcome {
            kind,
            target,
            created,
            actions,
            before_hash,
            after_hash,
        })
    }

    fn apply_inner(&mut self, operation: TreeOperation) -> Result<Option<NodeId>> {
        match operation {
            TreeOperation::Add { button } => self.add(button).map(Some),
            TreeOperation::Drop { node } => self.drop_node(node).map(|()| None),
            TreeOperation::SwitchTwin { node, source } => {
                self.switch_twin(node, source).map(|()| None)
            }
            TreeOperation::ChangeLanguage { node, language } => {
                self.change_language(node, &language).map(|()| None)
            }
            TreeOperation::ChangeSource { node, source } => {
                self.change_source(node, source).map(|()| None)
            }
            TreeOperation::SetOrder { node, order_idx } => {
                self.set_order(node, order_idx).map(|()| None)
            }
            TreeOperation::UpdateValue {
                node,
                value,
                override_read_only,
            } => self.update_value(node, value, override_read_only).map(|()| None),
            TreeOperation::DetachTwin { node } => self.detach_twin(node).map(|()| None),
        }
    }

    fn change_source(&mut self, id: NodeId, source: Option<Iri>) -> Result<()> {
        let Some(value) = self.get(id)?.kind.as_value() else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NotAValue));
        };
        if value.value_source == source {
            return Ok(());
        }
        if self.is_hidden(id) {
            return Err(PlumeError::forbidden(id, ForbiddenReason::HiddenNode));
        }
        if let Some(source) = &source {
            if !self.sources(id).contains(source) {
                return Err(PlumeError::forbidden(
                    id,
                    ForbiddenReason::SourceNotAuthorized {
                        source: source.to_string(),
                    },
                ));
            }
        }
        self.set_source(id, source);
        self.set_value(id, None);
        Ok(())
    }

    fn set_order(&mut self, id: NodeId, order_idx: OrderIndex) -> Result<()> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(());
        };
        if self.get(parent)?.kind.is_values_group() {
            return Ok(());
        }
        self.get_mut(id)?.order_idx = Some(order_idx);
        self.compute_rows(parent);
        Ok(())
    }

    fn update_value(&mut self, id: NodeId, value: Option<Term>, override_read_only: bool) -> Result<()> {
        let Some(node) = self.get(id)?.kind.as_value() else {
            return Err(PlumeError::forbidden(id, ForbiddenReason::NotAValue));
        };
        let language = node.value_language.clone();
        if self.is_read_only(id) && !override_read_only {
            return Err(PlumeError::forbidden(id, ForbiddenReason::ReadOnly));
        }
        let value = match (value, language) {
            (Some(Term::Literal(literal)), Some(language)) if self.is_lang_string(id) => Some(
                Term::Literal(Literal::lang_string(literal.lexical(), &language)),
            ),
            (value, _) => value,
        };
        if let Some(node) = self.get_mut(id)?.kind.as_value_mut() {
            if node.value == value {
                return Ok(());
            }
            node.value = value;
        }
        self.log(Action::Modified, id);
        Ok(())
    }

    /// Deterministic structural hash of the tree, for operation logs.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0001_0000_01b3;

        fn mix(hash: &mut u64, byte: u8) {
            *hash ^= u64::from(byte);
            *hash = hash.wrapping_mul(PRIME);
        }

        fn mix_bytes(hash: &mut u64, bytes: &[u8]) {
            for byte in bytes {
                mix(hash, *byte);
            }
        }

        fn mix_u64(hash: &mut u64, value: u64) {
            mix_bytes(hash, &value.to_le_bytes());
        }

        fn mix_bool(hash: &mut u64, value: bool) {
            mix(hash, u8::from(value));
        }

        fn mix_str(hash: &mut u64, value: &str) {
            mix_u64(hash, value.len() as u64);
            mix_bytes(hash, value.as_bytes());
        }

        fn mix_opt_id(hash: &mut u64, value: Option<NodeId>) {
            match value {
                Some(value) => {
                    mix(hash, 1);
                    mix_u64(hash, value.get());
                }
                None => mix(hash, 0),
            }
        }

        fn mix_opt_str(hash: &mut u64, value: Option<&str>) {
            match value {
                Some(value) => {
                    mix(hash, 1);
                    mix_str(hash, value);
                }
                None => mix(hash, 0),
            }
        }

        fn mix_record(hash: &mut u64, record: &NodeRecord) {
            mix_u64(hash, record.id.get());
            mix_opt_id(hash, record.parent);
            mix_u64(hash, record.children.len() as u64);
            for child in &record.children {
                mix_u64(hash, child.get());
            }
            mix_bool(hash, record.is_ghost);
            mix_bool(hash, record.is_hidden_m);
            mix_opt_id(hash, record.twin);
            mix_bool(hash, record.is_main_twin);
            match &record.order_idx {
                Some(order) => {
                    mix(hash, 1);
                    for part in order.parts() {
                        mix_u64(hash, u64::from(*part));
                    }
                }
                None => mix(hash, 0),
            }
            mix_u64(hash, record.row.map_or(u64::MAX, u64::from));
            mix(hash, record.is_single_child.map_or(2, u8::from));
            mix_str(hash, record.kind.name());
            match &record.kind {
                NodeKind::TranslationGroup(group) => {
                    mix_opt_id(hash, group.values.button);
                    for language in &group.available_languages {
                        mix_str(hash, language);
                    }
                }
                NodeKind::GroupOfValues(group) => mix_opt_id(hash, group.button),
                NodeKind::GroupOfProperties(group) => mix_str(hash, &group.node.to_ntriples()),
                NodeKind::Value(value) => {
                    let term = value.value.as_ref().map(Term::to_ntriples);
                    mix_opt_str(hash, term.as_deref());
                    mix_opt_str(hash, value.value_language.as_deref());
                    mix_opt_str(hash, value.value_source.as_ref().map(Iri::as_str));
                }
                NodeKind::Tab(tab) => mix_str(hash, &tab.label),
                NodeKind::Root(root) => mix_str(hash, root.dataset_id.as_str()),
                NodeKind::PlusButton | NodeKind::TranslationButton => {}
            }
        }

        let mut hash = OFFSET_BASIS;
        mix_u64(&mut hash, self.root.get());
        mix_u64(&mut hash, self.nodes.len() as u64);
        for record in self.nodes.values() {
            mix_record(&mut hash, record);
        }
        hash
    }
}
