//! Structured invariant diagnostics for form trees.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{IntegrityIssue, PlumeError, Result};
use crate::id::NodeId;
use crate::node::NodeKind;
use crate::tree::FormTree;

/// Stable code for invariant findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCode {
    MissingParent,
    MissingChild,
    ParentMismatch,
    DanglingTwin,
    DanglingButton,
    MixedTabSiblings,
    RowGap,
    RowOverlap,
    MisplacedButton,
    SingleChildMismatch,
    TwinExclusivity,
    LanguagePool,
}

/// One invariant finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantIssue {
    pub code: InvariantCode,
    pub node: NodeId,
    pub message: String,
}

/// Invariant report over a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantReport {
    pub state_hash: u64,
    pub issues: Vec<InvariantIssue>,
}

impl InvariantReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Codes of all findings, deduplicated.
    #[must_use]
    pub fn codes(&self) -> BTreeSet<InvariantCode> {
        self.issues.iter().map(|issue| issue.code).collect()
    }
}

struct Collector {
    issues: Vec<InvariantIssue>,
}

impl Collector {
    fn push(&mut self, code: InvariantCode, node: NodeId, message: impl Into<String>) {
        self.issues.push(InvariantIssue {
            code,
            node,
            message: message.into(),
        });
    }
}

impl FormTree {
    /// Inspect every invariant and list what is broken.
    #[must_use]
    pub fn invariant_report(&self) -> InvariantReport {
        let mut out = Collector { issues: Vec::new() };
        for record in self.nodes() {
            self.check_links(record.id, &mut out);
            if record.kind.is_group() && !record.is_ghost {
                self.check_tabs(record.id, &mut out);
                self.check_rows(record.id, &mut out);
                self.check_single_children(record.id, &mut out);
                self.check_pool(record.id, &mut out);
            }
            self.check_twins(record.id, &mut out);
        }
        InvariantReport {
            state_hash: self.state_hash(),
            issues: out.issues,
        }
    }

    /// Fail with the first invariant finding, if any.
    pub fn validate(&self) -> Result<()> {
        let report = self.invariant_report();
        match report.issues.into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(PlumeError::IntegrityBreach {
                node: Some(issue.node),
                breach: IntegrityIssue::InvariantViolated {
                    code: issue.code,
                    message: issue.message,
                },
            }),
        }
    }

    fn check_links(&self, id: NodeId, out: &mut Collector) {
        let Some(record) = self.node(id) else {
            return;
        };
        match record.parent {
            None if id != self.root() => out.push(InvariantCode::MissingParent, id, "orphan node"),
            None => {}
            Some(parent) => match self.node(parent) {
                None => out.push(InvariantCode::MissingParent, id, "parent does not exist"),
                Some(parent_record) => {
                    let listed = if record.kind.is_button() {
                        self.button(parent) == Some(id)
                    } else {
                        parent_record.children.contains(&id)
                    };
                    if !listed {
                        out.push(
                            InvariantCode::ParentMismatch,
                            id,
                            "parent does not reference the node",
                        );
                    }
                }
            },
        }
        for child in &record.children {
            match self.node(*child) {
                None => out.push(InvariantCode::MissingChild, id, format!("child {child} missing")),
                Some(c) if c.parent != Some(id) => out.push(
                    InvariantCode::ParentMismatch,
                    *child,
                    "child points to another parent",
                ),
                Some(_) => {}
            }
        }
        if let Some(button) = self.button(id) {
            if self.node(button).is_none_or(|b| b.parent != Some(id) || !b.kind.is_button()) {
                out.push(InvariantCode::DanglingButton, id, "button link is broken");
            }
        }
        if let Some(twin) = record.twin {
            let ok = self
                .node(twin)
                .is_some_and(|t| t.twin == Some(id) && t.parent == record.parent);
            if !ok {
                out.push(InvariantCode::DanglingTwin, id, "twin link is broken");
            }
        }
    }

    fn check_tabs(&self, id: NodeId, out: &mut Collector) {
        let Some(record) = self.node(id) else {
            return;
        };
        let tabs = record
            .children
            .iter()
            .filter(|c| self.node(**c).is_some_and(|r| matches!(r.kind, NodeKind::Tab(_))))
            .count();
        if tabs != 0 && tabs != record.children.len() {
            out.push(
                InvariantCode::MixedTabSiblings,
                id,
                "tabs share a parent with other nodes",
            );
        }
    }

    fn check_rows(&self, id: NodeId, out: &mut Collector) {
        let mut spans: Vec<(u32, u32, NodeId)> = Vec::new();
        for child in self.real_children(id) {
            let Some(record) = self.node(child) else {
                continue;
            };
            if record.is_shadow_twin() {
                continue;
            }
            let Some(row) = record.row else {
                out.push(InvariantCode::RowGap, child, "no row assigned");
                continue;
            };
            let start = if self.independant_label(child) {
                row.saturating_sub(1)
            } else {
                row
            };
            spans.push((start, row.saturating_add(self.rowspan(child)), child));
            if let Some(twin) = record.twin {
                if self.node(twin).and_then(|t| t.row) != Some(row) {
                    out.push(InvariantCode::RowOverlap, twin, "twins on different rows");
                }
            }
        }
        spans.sort_unstable();
        let mut cursor = 0;
        for (start, end, child) in spans {
            if start > cursor {
                out.push(InvariantCode::RowGap, child, format!("rows {cursor}..{start} are empty"));
            } else if start < cursor {
                out.push(InvariantCode::RowOverlap, child, format!("row {start} already used"));
            }
            cursor = cursor.max(end);
        }
        if let Some(button) = self.button(id) {
            if self.node(button).and_then(|b| b.row) != Some(cursor) {
                out.push(
                    InvariantCode::MisplacedButton,
                    button,
                    format!("button expected on row {cursor}"),
                );
            }
        }
    }

    fn check_single_children(&self, id: NodeId, out: &mut Collector) {
        if !self.node(id).is_some_and(|r| r.kind.is_values_group()) {
            return;
        }
        let children = self.real_children(id);
        let count = children
            .iter()
            .filter(|c| self.node(**c).is_some_and(|r| !r.is_shadow_twin()))
            .count();
        for child in children {
            if self.node(child).and_then(|r| r.is_single_child) != Some(count < 2) {
                out.push(
                    InvariantCode::SingleChildMismatch,
                    child,
                    format!("group has {count} children"),
                );
            }
        }
    }

    fn check_twins(&self, id: NodeId, out: &mut Collector) {
        let Some(record) = self.node(id) else {
            return;
        };
        let Some(twin) = record.twin else {
            return;
        };
        // Each pair is checked once, from its value.
        if !matches!(record.kind, NodeKind::Value(_)) {
            return;
        }
        let Some(twin_record) = self.node(twin) else {
            return;
        };
        let forced = record
            .parent
            .and_then(|p| self.node(p))
            .is_some_and(|p| p.is_hidden_m);
        if !forced && record.is_hidden_m == twin_record.is_hidden_m {
            out.push(
                InvariantCode::TwinExclusivity,
                id,
                "exactly one twin must be hidden",
            );
        }
        if record.is_main_twin == twin_record.is_main_twin {
            out.push(InvariantCode::TwinExclusivity, id, "exactly one main twin");
        }
        if !forced && record.is_main_twin == record.is_hidden_m {
            out.push(InvariantCode::TwinExclusivity, id, "the main twin must be visible");
        }
    }

    fn check_pool(&self, id: NodeId, out: &mut Collector) {
        let Some(NodeKind::TranslationGroup(group)) = self.node(id).map(|r| &r.kind) else {
            return;
        };
        let langlist = self.session().langlist();
        let pool: BTreeSet<&str> = group.available_languages.iter().map(String::as_str).collect();
        if pool.len() != group.available_languages.len() {
            out.push(InvariantCode::LanguagePool, id, "duplicate pooled language");
        }
        let used: BTreeSet<&str> = self
            .real_children(id)
            .into_iter()
            .filter_map(|child| self.value_node(child))
            .filter_map(|value| value.value_language.as_deref())
            .collect();
        for language in langlist {
            let pooled = pool.contains(language.as_str());
            let in_use = used.contains(language.as_str());
            if pooled == in_use {
                out.push(
                    InvariantCode::LanguagePool,
                    id,
                    format!("language '{language}' pooled={pooled} used={in_use}"),
                );
            }
        }
        if pool.iter().any(|language| !langlist.iter().any(|l| l == language)) {
            out.push(InvariantCode::LanguagePool, id, "pool holds an unknown language");
        }
    }
}
