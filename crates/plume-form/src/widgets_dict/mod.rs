//! The widgets dict: a form tree plus the presentation cache of every node.
//!
//! A [`WidgetsDict`] is built once from a schema, a metadata graph and the
//! optional template and override data (see [`FormBuilder`]). Afterwards
//! every user action goes through the edit API, which checks the request,
//! applies it to the tree atomically, refreshes the caches and returns a
//! [`FormUpdate`] telling the presentation layer what to change.

mod build;
mod edit;

use std::collections::BTreeMap;

use plume_rdf::Graph;
use plume_tree::{ActionsBook, FormTree, NodeId, NodeKind, Result};

use crate::grid::{self, Placement, WidgetKind};
use crate::internal::{InternalDict, ObjectKind};
use crate::options::FormOptions;
use crate::vocabulary::Vocabulary;

pub use build::FormBuilder;

/// Everything the presentation layer must do after an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormUpdate {
    /// Node created by an add.
    pub created: Option<NodeId>,
    /// Node lists per action, ghosts excluded.
    pub actions: ActionsBook,
    /// New placements of every widget of created and moved nodes.
    pub placements: BTreeMap<NodeId, Vec<(WidgetKind, Placement)>>,
}

impl FormUpdate {
    /// True when nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_none() && self.actions.is_empty()
    }
}

/// Form tree with its presentation caches.
#[derive(Debug, Clone)]
pub struct WidgetsDict<V> {
    tree: FormTree,
    options: FormOptions,
    vocabulary: V,
    cache: BTreeMap<NodeId, InternalDict>,
    modified: bool,
}

impl<V: Vocabulary> WidgetsDict<V> {
    fn from_tree(tree: FormTree, options: FormOptions, vocabulary: V) -> Self {
        let mut dict = Self {
            tree,
            options,
            vocabulary,
            cache: BTreeMap::new(),
            modified: false,
        };
        dict.refresh_cache();
        dict
    }

    /// Recompute the cache of every node, in tree order.
    fn refresh_cache(&mut self) {
        let order = self.tree.tree_order();
        self.cache = order
            .into_iter()
            .map(|id| (id, InternalDict::compute(&self.tree, id, &self.vocabulary)))
            .collect();
    }

    #[must_use]
    pub fn tree(&self) -> &FormTree {
        &self.tree
    }

    #[must_use]
    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    #[must_use]
    pub fn vocabulary(&self) -> &V {
        &self.vocabulary
    }

    /// Presentation cache of `id`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&InternalDict> {
        self.cache.get(&id)
    }

    /// Cached nodes, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &InternalDict)> {
        self.cache.iter().map(|(id, dict)| (*id, dict))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True once an edit changed the described metadata or the layout.
    #[must_use]
    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Kind of group the children of `id` (or `id` itself, for groups)
    /// belong to. The root and tabs count as groups of properties.
    #[must_use]
    pub fn group_kind(&self, id: NodeId) -> Option<ObjectKind> {
        let record = self.tree.node(id)?;
        let group = if record.kind.is_group() {
            record
        } else {
            self.tree.node(record.parent?)?
        };
        Some(match &group.kind {
            NodeKind::Root(_) | NodeKind::Tab(_) | NodeKind::GroupOfProperties(_) => {
                ObjectKind::GroupOfProperties
            }
            NodeKind::GroupOfValues(_) => ObjectKind::GroupOfValues,
            NodeKind::TranslationGroup(_) => ObjectKind::TranslationGroup,
            _ => return None,
        })
    }

    /// Metadata graph described by the form.
    #[must_use]
    pub fn build_metagraph(&self) -> Graph {
        self.tree.build_metagraph()
    }

    /// True when nothing below `group` would be exported.
    #[must_use]
    pub fn is_empty(&self, group: NodeId) -> bool {
        self.tree.is_empty_group(group)
    }

    /// Grid placement of widget `kind` of `id`.
    #[must_use]
    pub fn widget_placement(&self, id: NodeId, kind: WidgetKind) -> Option<Placement> {
        grid::widget_placement(&self.tree, id, kind)
    }

    /// Check that no two widgets share a cell and no grid has holes.
    pub fn check_grids(&self) -> Result<()> {
        grid::check_grids(&self.tree)
    }
}
