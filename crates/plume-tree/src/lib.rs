#![forbid(unsafe_code)]

//! Form model tree for Plume metadata forms.
//!
//! A [`FormTree`] holds, node by node, everything a form needs to display
//! and edit the metadata of one dataset: tabs, groups of properties, groups
//! of values, translation groups, value leaves and the plus / translation
//! buttons of value groups.
//!
//! The tree keeps these invariants after every operation:
//!
//! - Visible children of a group occupy contiguous rows starting at 0.
//! - The lone child of a value group has no usable minus button.
//! - Exactly one member of a twin pair is displayed.
//! - The language pool of a translation group plus the languages its
//!   children use is the session language list.
//! - Tabs never share a parent with other nodes.
//!
//! Every mutation goes through [`FormTree::apply`], which reports the
//! widgets to create, drop, show, hide, move or refresh as an
//! [`ActionsBook`].

pub mod actions;
pub mod error;
pub mod id;
pub mod invariants;
pub mod node;
pub mod session;
pub mod tree;

pub use actions::{Action, ActionsBook};
pub use error::{ErrorClass, ForbiddenReason, IntegrityIssue, PlumeError, Result};
pub use id::NodeId;
pub use invariants::{InvariantCode, InvariantIssue, InvariantReport};
pub use node::{
    DEFAULT_ORDER, MAX_ROWSPAN, NodeKind, NodeRecord, OrderIndex, PropertiesGroup, PropertyInfo, RootNode,
    TabNode, Transform, TranslationGroup, ValueNode, ValuesGroup,
};
pub use session::Session;
pub use tree::{FormTree, NodeSpec, TreeBuilder, TreeOperation, TreeOperationKind, TreeOperationOutcome};
