//! Edit API of the widgets dict.
//!
//! Every method checks the request against the cached presentation, runs
//! one tree operation and refreshes the caches. On error nothing changes.

use std::collections::{BTreeMap, BTreeSet};

use plume_rdf::{Iri, Term};
use plume_tree::{
    ActionsBook, ForbiddenReason, IntegrityIssue, NodeId, OrderIndex, PlumeError, Result,
    TreeOperation, TreeOperationOutcome,
};
use tracing::debug;

use super::{FormUpdate, WidgetsDict};
use crate::grid::{self, Placement, WidgetKind};
use crate::internal::InternalDict;
use crate::labels::sources;
use crate::value::{ValueContext, prepare_value};
use crate::vocabulary::Vocabulary;

fn forbidden(node: NodeId, reason: ForbiddenReason) -> PlumeError {
    PlumeError::ForbiddenOperation {
        node: Some(node),
        reason,
    }
}

impl<V: Vocabulary> WidgetsDict<V> {
    /// Add a value through a plus or translation button.
    pub fn add(&mut self, button: NodeId) -> Result<FormUpdate> {
        self.apply(TreeOperation::Add { button })
    }

    /// Remove a node of a value group, with its twin.
    pub fn drop(&mut self, node: NodeId) -> Result<FormUpdate> {
        self.apply(TreeOperation::Drop { node })
    }

    /// Pick another language for a language string, from its language
    /// menu.
    pub fn change_language(&mut self, node: NodeId, language: &str) -> Result<FormUpdate> {
        let dict = self.cached(node)?;
        if dict.language_value.as_deref() == Some(language) {
            return Ok(FormUpdate::default());
        }
        if !self.tree.has_language_button(node) {
            return Err(forbidden(node, ForbiddenReason::NoLanguageButton));
        }
        if dict.is_hidden() {
            return Err(forbidden(node, ForbiddenReason::HiddenNode));
        }
        if !dict.authorized_languages.iter().any(|l| l == language) {
            return Err(forbidden(
                node,
                ForbiddenReason::LanguageNotAuthorized {
                    language: language.to_owned(),
                },
            ));
        }
        self.apply(TreeOperation::ChangeLanguage {
            node,
            language: language.to_owned(),
        })
    }

    /// Pick another entry of the source menu of `node`.
    ///
    /// Moving to or from the manual entry switches twins. Other entries
    /// change the vocabulary of the value, which is cleared.
    pub fn change_source(&mut self, node: NodeId, label: &str) -> Result<FormUpdate> {
        if !self.tree.has_source_button(node) {
            return Err(forbidden(node, ForbiddenReason::NoSourceButton));
        }
        let dict = self.cached(node)?;
        if dict.current_source.as_deref() == Some(label) {
            return Ok(FormUpdate::default());
        }
        if !dict.sources.iter().any(|s| s == label) {
            return Err(forbidden(
                node,
                ForbiddenReason::SourceNotAuthorized {
                    source: label.to_owned(),
                },
            ));
        }
        if dict.is_hidden() {
            return Err(forbidden(node, ForbiddenReason::HiddenNode));
        }

        let is_value = self.tree.value_node(node).is_some();
        let source = self.source_from_label(node, label);
        let operation = if !is_value {
            TreeOperation::SwitchTwin { node, source }
        } else if sources::MANUAL.matches(label) {
            TreeOperation::SwitchTwin { node, source: None }
        } else {
            TreeOperation::ChangeSource { node, source }
        };
        self.apply(operation)
    }

    /// Store the user input `raw` in value node `node`.
    ///
    /// Input that does not fit the datatype clears the value.
    pub fn update_value(&mut self, node: NodeId, raw: &str) -> Result<FormUpdate> {
        let ctx = ValueContext::of(&self.tree, node)
            .ok_or_else(|| forbidden(node, ForbiddenReason::NotAValue))?;
        let value = prepare_value(&ctx, raw, &self.vocabulary);
        self.update_term(node, value, false)
    }

    /// Store `value` as is. Read-only nodes need `override_read_only`.
    pub fn update_term(
        &mut self,
        node: NodeId,
        value: Option<Term>,
        override_read_only: bool,
    ) -> Result<FormUpdate> {
        self.apply(TreeOperation::UpdateValue {
            node,
            value,
            override_read_only,
        })
    }

    pub fn set_order(&mut self, node: NodeId, order_idx: OrderIndex) -> Result<FormUpdate> {
        self.apply(TreeOperation::SetOrder { node, order_idx })
    }

    /// Show both members of a twin pair for good.
    pub fn detach_twin(&mut self, node: NodeId) -> Result<FormUpdate> {
        self.apply(TreeOperation::DetachTwin { node })
    }

    /// Run `operation` on the tree and refresh the caches.
    pub fn apply(&mut self, operation: TreeOperation) -> Result<FormUpdate> {
        let TreeOperationOutcome {
            kind,
            created,
            actions,
            ..
        } = self.tree.apply(operation)?;
        self.refresh_cache();

        let update = FormUpdate {
            created,
            placements: self.placements_after(created, &actions),
            actions,
        };
        if !update.is_empty() {
            self.modified = true;
        }
        debug!(op = ?kind, created = created.map(NodeId::get), "form edited");
        Ok(update)
    }

    fn cached(&self, node: NodeId) -> Result<&InternalDict> {
        self.cache.get(&node).ok_or(PlumeError::IntegrityBreach {
            node: Some(node),
            breach: IntegrityIssue::UnknownNode,
        })
    }

    /// Source IRI behind a menu label. Pseudo-sources have none.
    fn source_from_label(&self, node: NodeId, label: &str) -> Option<Iri> {
        if sources::UNLISTED.matches(label)
            || sources::URI.matches(label)
            || sources::MANUAL.matches(label)
        {
            return None;
        }
        let value = if self.tree.value_node(node).is_some() {
            node
        } else {
            self.tree.twin(node)?
        };
        let langlist = self.tree.session().langlist();
        self.tree
            .sources(value)
            .iter()
            .find(|source| {
                self.vocabulary
                    .source_label(source, langlist)
                    .unwrap_or_else(|| source.to_string())
                    == label
            })
            .cloned()
    }

    fn placements_after(
        &self,
        created: Option<NodeId>,
        actions: &ActionsBook,
    ) -> BTreeMap<NodeId, Vec<(WidgetKind, Placement)>> {
        let nodes: BTreeSet<NodeId> = created
            .into_iter()
            .chain(actions.create.iter().copied())
            .chain(actions.moved.iter().copied())
            .chain(actions.show.iter().copied())
            .collect();
        nodes
            .into_iter()
            .filter(|id| self.tree.contains(*id))
            .map(|id| (id, grid::placements(&self.tree, id)))
            .collect()
    }
}
