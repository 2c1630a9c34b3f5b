//! Error taxonomy shared by the tree and the form layer.
//!
//! Every failure belongs to one of four classes (see [`ErrorClass`]):
//! a required parameter is missing, an operation would break a tree
//! invariant, a valid request is semantically refused, or a caller value is
//! outside its domain. Failing operations never leave a tree half-mutated.

use std::fmt;

use crate::id::NodeId;
use crate::invariants::InvariantCode;

/// Convenience alias used throughout the Plume crates.
pub type Result<T> = std::result::Result<T, PlumeError>;

/// Error class, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    MissingParameter,
    IntegrityBreach,
    ForbiddenOperation,
    UnknownParameterValue,
}

/// Top-level error for tree and form operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlumeError {
    /// A structurally required field was not supplied.
    MissingParameter {
        parameter: &'static str,
        node: Option<NodeId>,
    },
    /// The operation would violate a tree invariant.
    IntegrityBreach {
        node: Option<NodeId>,
        breach: IntegrityIssue,
    },
    /// The request is well-formed but not allowed.
    ForbiddenOperation {
        node: Option<NodeId>,
        reason: ForbiddenReason,
    },
    /// A caller-supplied value is outside the accepted domain.
    UnknownParameterValue {
        parameter: &'static str,
        value: String,
    },
}

impl PlumeError {
    pub(crate) fn forbidden(node: NodeId, reason: ForbiddenReason) -> Self {
        Self::ForbiddenOperation {
            node: Some(node),
            reason,
        }
    }

    pub(crate) fn breach(node: NodeId, breach: IntegrityIssue) -> Self {
        Self::IntegrityBreach {
            node: Some(node),
            breach,
        }
    }

    pub(crate) fn unknown_node(node: NodeId) -> Self {
        Self::breach(node, IntegrityIssue::UnknownNode)
    }

    /// Error class of this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingParameter { .. } => ErrorClass::MissingParameter,
            Self::IntegrityBreach { .. } => ErrorClass::IntegrityBreach,
            Self::ForbiddenOperation { .. } => ErrorClass::ForbiddenOperation,
            Self::UnknownParameterValue { .. } => ErrorClass::UnknownParameterValue,
        }
    }

    /// Node the error was raised on, if any.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        match self {
            Self::MissingParameter { node, .. }
            | Self::IntegrityBreach { node, .. }
            | Self::ForbiddenOperation { node, .. } => *node,
            Self::UnknownParameterValue { .. } => None,
        }
    }
}

fn write_node(f: &mut fmt::Formatter<'_>, node: Option<NodeId>) -> fmt::Result {
    match node {
        Some(node) => write!(f, " (node {node})"),
        None => Ok(()),
    }
}

impl fmt::Display for PlumeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParameter { parameter, node } => {
                write!(f, "missing parameter '{parameter}'")?;
                write_node(f, *node)
            }
            Self::IntegrityBreach { node, breach } => {
                write!(f, "integrity breach: {breach}")?;
                write_node(f, *node)
            }
            Self::ForbiddenOperation { node, reason } => {
                write!(f, "forbidden operation: {reason}")?;
                write_node(f, *node)
            }
            Self::UnknownParameterValue { parameter, value } => {
                write!(f, "unknown value '{value}' for parameter '{parameter}'")
            }
        }
    }
}

impl std::error::Error for PlumeError {}

/// What an [`PlumeError::IntegrityBreach`] detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    UnknownNode,
    UnknownTab { label: String },
    UnknownPath { path: String },
    /// A property group inside a value group needs the group's class.
    MissingParentClass,
    NoAvailableLanguage,
    IdSpaceExhausted,
    GridOverlap { row: u32, column: u32 },
    GridGap { row: u32, column: u32 },
    EmptyGrid,
    InvariantViolated { code: InvariantCode, message: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode => write!(f, "unknown node"),
            Self::UnknownTab { label } => write!(f, "unknown tab '{label}'"),
            Self::UnknownPath { path } => write!(f, "no node for path '{path}'"),
            Self::MissingParentClass => {
                write!(f, "the parent value group does not declare a class")
            }
            Self::NoAvailableLanguage => write!(f, "no available language left in the group"),
            Self::IdSpaceExhausted => write!(f, "node id space exhausted"),
            Self::GridOverlap { row, column } => {
                write!(f, "two widgets share grid cell ({row}, {column})")
            }
            Self::GridGap { row, column } => write!(f, "empty grid cell ({row}, {column})"),
            Self::EmptyGrid => write!(f, "visible group with an empty grid"),
            Self::InvariantViolated { code, message } => write!(f, "{code:?}: {message}"),
        }
    }
}

/// Why a [`PlumeError::ForbiddenOperation`] was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForbiddenReason {
    GhostCopy,
    RootCopy,
    RootRemoval,
    NotAButton,
    HiddenButton,
    NoMinusButton,
    LastChild,
    HiddenNode,
    NotAValue,
    NotAGroup,
    EmptyGroup,
    ReadOnly,
    NoLanguageButton,
    NotALanguageString,
    LanguageNotAuthorized { language: String },
    LanguagePoolExhausted,
    NoSourceButton,
    SourceNotAuthorized { source: String },
    NoTwin,
    GhostTwin,
    TwinKindMismatch,
    TwinParentMismatch,
    TwinTaken,
    ParentKindMismatch {
        parent: &'static str,
        child: &'static str,
    },
    MixedTabSiblings,
    DuplicateButton,
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GhostCopy => write!(f, "a ghost node cannot be copied"),
            Self::RootCopy => write!(f, "the root cannot be copied"),
            Self::RootRemoval => write!(f, "the root cannot be removed"),
            Self::NotAButton => write!(f, "not a plus or translation button"),
            Self::HiddenButton => write!(f, "the button is hidden"),
            Self::NoMinusButton => write!(f, "the node has no minus button"),
            Self::LastChild => write!(f, "the last child of a group cannot be removed"),
            Self::HiddenNode => write!(f, "the node is hidden"),
            Self::NotAValue => write!(f, "not a value node"),
            Self::NotAGroup => write!(f, "not a group node"),
            Self::EmptyGroup => write!(f, "the group has no child to copy"),
            Self::ReadOnly => write!(f, "the value is read-only"),
            Self::NoLanguageButton => write!(f, "the node has no language button"),
            Self::NotALanguageString => write!(f, "the value is not a language string"),
            Self::LanguageNotAuthorized { language } => {
                write!(f, "language '{language}' is not authorized")
            }
            Self::LanguagePoolExhausted => write!(f, "no more available language"),
            Self::NoSourceButton => write!(f, "the node has no source button"),
            Self::SourceNotAuthorized { source } => {
                write!(f, "source '{source}' is not authorized")
            }
            Self::NoTwin => write!(f, "the node has no twin"),
            Self::GhostTwin => write!(f, "a ghost node cannot have a twin"),
            Self::TwinKindMismatch => {
                write!(f, "twins must be one value and one property group")
            }
            Self::TwinParentMismatch => write!(f, "twins must share the same parent"),
            Self::TwinTaken => write!(f, "the twin already belongs to a pair"),
            Self::ParentKindMismatch { parent, child } => {
                write!(f, "a {child} node cannot be placed under a {parent} node")
            }
            Self::MixedTabSiblings => write!(f, "tabs and other nodes cannot be siblings"),
            Self::DuplicateButton => write!(f, "the group already has a button"),
        }
    }
}
