//! Node identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IntegrityIssue, PlumeError};

/// Stable identifier of a node in a [`FormTree`](crate::FormTree).
///
/// `0` is reserved so ids are always non-zero. Ids are allocated in
/// increasing order and never reused within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node id, always the root.
    pub const MIN: Self = Self(1);

    /// Create a node id, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, PlumeError> {
        if raw == 0 {
            return Err(PlumeError::UnknownParameterValue {
                parameter: "node_id",
                value: raw.to_string(),
            });
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next id, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, PlumeError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(PlumeError::IntegrityBreach {
                node: Some(self),
                breach: IntegrityIssue::IdSpaceExhausted,
            });
        };
        Self::new(next)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
