//! Row and single-child bookkeeping.

use tracing::debug;

use super::FormTree;
use crate::actions::Action;
use crate::id::NodeId;

impl FormTree {
    /// Recompute the rows of the direct children of `group`.
    ///
    /// Children are sorted by order index first, except in value groups
    /// where insertion order is kept. Each child takes the running row,
    /// plus one when its label stands on its own row, and advances it by
    /// its rowspan. Twins share one row and the button of a value group
    /// comes last. Returns the next free row.
    pub(crate) fn compute_rows(&mut self, group: NodeId) -> u32 {
        let Some(record) = self.nodes.get(&group) else {
            return 0;
        };
        if record.is_ghost || !record.kind.is_group() {
            return 0;
        }
        let sortable = !record.kind.is_values_group();
        if sortable {
            let mut children = record.children.clone();
            children.sort_by(|a, b| self.order_idx(*a).cmp(&self.order_idx(*b)));
            if let Some(record) = self.nodes.get_mut(&group) {
                record.children = children;
            }
        }

        let mut row: u32 = 0;
        for child in self.real_children(group) {
            let Some(record) = self.nodes.get(&child) else {
                continue;
            };
            if record.is_shadow_twin() {
                continue;
            }
            let twin = record.twin;
            if self.independant_label(child) {
                row = row.saturating_add(1);
            }
            self.move_to_row(child, row);
            if let Some(twin) = twin {
                self.move_to_row(twin, row);
            }
            row = row.saturating_add(self.rowspan(child));
        }
        if let Some(button) = self.button(group) {
            self.move_to_row(button, row);
            row = row.saturating_add(self.rowspan(button));
        }
        row
    }

    fn move_to_row(&mut self, id: NodeId, row: u32) {
        let Some(record) = self.nodes.get_mut(&id) else {
            return;
        };
        if record.row != Some(row) {
            record.row = Some(row);
            debug!(node = id.get(), row, "row moved");
            self.log(Action::Moved, id);
        }
    }

    /// Refresh the single-child flag of every real child of a value group.
    ///
    /// A twin pair counts once. Crossing the two-children threshold logs
    /// the minus buttons to show or hide.
    pub(crate) fn compute_single_children(&mut self, group: NodeId) {
        let Some(record) = self.nodes.get(&group) else {
            return;
        };
        if record.is_ghost || !record.kind.is_values_group() {
            return;
        }
        let children = self.real_children(group);
        let count = children
            .iter()
            .filter(|child| self.nodes.get(child).is_some_and(|c| !c.is_shadow_twin()))
            .count();
        let single = count < 2;
        for child in children {
            let Some(record) = self.nodes.get_mut(&child) else {
                continue;
            };
            if record.is_single_child != Some(single) {
                record.is_single_child = Some(single);
                let action = if single {
                    Action::HideMinusButton
                } else {
                    Action::ShowMinusButton
                };
                self.log(action, child);
            }
        }
    }
}
