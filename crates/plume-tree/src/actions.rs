//! Change log of tree mutations.
//!
//! Every mutation appends the nodes whose widgets need work to the book of
//! the tree. The presentation layer clears the book before a unit of work
//! and drains it afterwards, which yields exactly the incremental
//! instructions needed to reconcile its widgets.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Kind of a book entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Widgets must be created.
    Create,
    /// Widgets must be deleted.
    Drop,
    Show,
    Hide,
    ShowMinusButton,
    HideMinusButton,
    /// Widgets must move to the node's new row.
    Moved,
    /// Language menu must be rebuilt.
    Languages,
    /// Source menu must be rebuilt.
    Sources,
    /// Concept list must be reloaded.
    Thesaurus,
    /// The widget must display the node's new value.
    Update,
    /// Derived presentation attributes must be recomputed.
    Modified,
}

impl Action {
    pub const ALL: [Self; 12] = [
        Self::Create,
        Self::Drop,
        Self::Show,
        Self::Hide,
        Self::ShowMinusButton,
        Self::HideMinusButton,
        Self::Moved,
        Self::Languages,
        Self::Sources,
        Self::Thesaurus,
        Self::Update,
        Self::Modified,
    ];
}

/// Per-action lists of nodes, each without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsBook {
    pub create: Vec<NodeId>,
    pub drop: Vec<NodeId>,
    pub show: Vec<NodeId>,
    pub hide: Vec<NodeId>,
    pub show_minus_button: Vec<NodeId>,
    pub hide_minus_button: Vec<NodeId>,
    pub moved: Vec<NodeId>,
    pub languages: Vec<NodeId>,
    pub sources: Vec<NodeId>,
    pub thesaurus: Vec<NodeId>,
    pub update: Vec<NodeId>,
    pub modified: Vec<NodeId>,
}

impl ActionsBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List holding entries of `action`.
    #[must_use]
    pub fn list(&self, action: Action) -> &[NodeId] {
        match action {
            Action::Create => &self.create,
            Action::Drop => &self.drop,
            Action::Show => &self.show,
            Action::Hide => &self.hide,
            Action::ShowMinusButton => &self.show_minus_button,
            Action::HideMinusButton => &self.hide_minus_button,
            Action::Moved => &self.moved,
            Action::Languages => &self.languages,
            Action::Sources => &self.sources,
            Action::Thesaurus => &self.thesaurus,
            Action::Update => &self.update,
            Action::Modified => &self.modified,
        }
    }

    fn list_mut(&mut self, action: Action) -> &mut Vec<NodeId> {
        match action {
            Action::Create => &mut self.create,
            Action::Drop => &mut self.drop,
            Action::Show => &mut self.show,
            Action::Hide => &mut self.hide,
            Action::ShowMinusButton => &mut self.show_minus_button,
            Action::HideMinusButton => &mut self.hide_minus_button,
            Action::Moved => &mut self.moved,
            Action::Languages => &mut self.languages,
            Action::Sources => &mut self.sources,
            Action::Thesaurus => &mut self.thesaurus,
            Action::Update => &mut self.update,
            Action::Modified => &mut self.modified,
        }
    }

    /// Append `node` to the list of `action`, unless already there.
    ///
    /// Opposite visibility entries cancel out: showing a node that is
    /// pending a hide removes the hide, and the other way round.
    pub fn record(&mut self, action: Action, node: NodeId) {
        let opposite = match action {
            Action::Show => Some(Action::Hide),
            Action::Hide => Some(Action::Show),
            Action::ShowMinusButton => Some(Action::HideMinusButton),
            Action::HideMinusButton => Some(Action::ShowMinusButton),
            _ => None,
        };
        if let Some(opposite) = opposite {
            self.list_mut(opposite).retain(|id| *id != node);
        }
        let list = self.list_mut(action);
        if !list.contains(&node) {
            list.push(node);
        }
    }

    #[must_use]
    pub fn contains(&self, action: Action, node: NodeId) -> bool {
        self.list(action).contains(&node)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        Action::ALL.iter().all(|action| self.list(*action).is_empty())
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Take the book, leaving an empty one behind unless `preserve` is set.
    ///
    /// Dropped nodes are purged from every list except `drop` in the
    /// returned book.
    pub fn drain(&mut self, preserve: bool) -> Self {
        let mut book = if preserve {
            self.clone()
        } else {
            std::mem::take(self)
        };
        let dropped = book.drop.clone();
        if !dropped.is_empty() {
            for action in Action::ALL {
                if action != Action::Drop {
                    book.list_mut(action).retain(|id| !dropped.contains(id));
                }
            }
        }
        book
    }
}
