//! Placement of widgets in the grid of their parent group.
//!
//! Every group lays its children out on a grid [`GRID_WIDTH`] columns wide.
//! A node contributes up to five widgets: its main widget, a label, and
//! the source, language and minus buttons packed at the right edge.

use std::collections::{BTreeMap, BTreeSet};

use plume_tree::{FormTree, IntegrityIssue, NodeId, NodeKind, PlumeError, Result};

/// Number of columns of a group grid.
pub const GRID_WIDTH: u32 = 6;

/// One of the widgets a node may display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    Main,
    Minus,
    Source,
    Language,
    Label,
}

impl WidgetKind {
    pub const ALL: [Self; 5] = [
        Self::Main,
        Self::Minus,
        Self::Source,
        Self::Language,
        Self::Label,
    ];
}

/// Cell range of a widget: `(row, column, rowspan, colspan)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub row: u32,
    pub column: u32,
    pub rowspan: u32,
    pub colspan: u32,
}

impl Placement {
    #[must_use]
    pub const fn new(row: u32, column: u32, rowspan: u32, colspan: u32) -> Self {
        Self {
            row,
            column,
            rowspan,
            colspan,
        }
    }

    /// Covered cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.row..self.row.saturating_add(self.rowspan)).flat_map(move |row| {
            (self.column..self.column.saturating_add(self.colspan)).map(move |c| (row, c))
        })
    }

    fn is_empty(&self) -> bool {
        self.rowspan == 0 || self.colspan == 0
    }
}

/// Widgets of `id` that exist, main widget first.
#[must_use]
pub fn widget_kinds(tree: &FormTree, id: NodeId) -> Vec<WidgetKind> {
    WidgetKind::ALL
        .into_iter()
        .filter(|kind| has_widget(tree, id, *kind))
        .collect()
}

fn has_widget(tree: &FormTree, id: NodeId, kind: WidgetKind) -> bool {
    match kind {
        WidgetKind::Main => tree.contains(id),
        WidgetKind::Minus => tree.has_minus_button(id),
        WidgetKind::Source => tree.has_source_button(id),
        WidgetKind::Language => tree.has_language_button(id),
        WidgetKind::Label => tree.has_label(id),
    }
}

/// Buttons at the right edge, from left to right.
fn side_buttons(tree: &FormTree, id: NodeId) -> Vec<WidgetKind> {
    [WidgetKind::Source, WidgetKind::Language, WidgetKind::Minus]
        .into_iter()
        .filter(|kind| has_widget(tree, id, *kind))
        .collect()
}

/// Where widget `kind` of `id` goes in its parent's grid.
///
/// `None` when the node has no such widget or is not laid out (ghosts,
/// unknown nodes). The root and tabs get an empty placement.
#[must_use]
pub fn widget_placement(tree: &FormTree, id: NodeId, kind: WidgetKind) -> Option<Placement> {
    let record = tree.node(id)?;
    if matches!(record.kind, NodeKind::Root(_) | NodeKind::Tab(_)) {
        return (kind == WidgetKind::Main).then_some(Placement::new(0, 0, 0, 0));
    }
    if !has_widget(tree, id, kind) {
        return None;
    }
    let row = tree.row(id)?;
    if record.kind.is_button() {
        return (kind == WidgetKind::Main).then_some(Placement::new(row, 0, 1, 1));
    }
    let same_row_label = tree.has_label(id) && !tree.independant_label(id);
    let buttons = side_buttons(tree, id);
    let first_button = GRID_WIDTH.saturating_sub(u32::try_from(buttons.len()).unwrap_or(0));
    match kind {
        WidgetKind::Label => Some(match tree.label_row(id) {
            Some(label_row) => Placement::new(label_row, 0, 1, GRID_WIDTH),
            None => Placement::new(row, 0, 1, 1),
        }),
        WidgetKind::Main => {
            let column = u32::from(same_row_label);
            Some(Placement::new(
                row,
                column,
                tree.rowspan(id).max(1),
                first_button.saturating_sub(column),
            ))
        }
        side => {
            let pos = buttons.iter().position(|k| *k == side)?;
            let column = first_button + u32::try_from(pos).unwrap_or(0);
            Some(Placement::new(row, column, 1, 1))
        }
    }
}

/// Check the grids of every group.
///
/// Visible widgets must not share a cell, must not leave a hole before
/// another widget of the same row, and every visible group must hold at
/// least one widget.
pub fn check_grids(tree: &FormTree) -> Result<()> {
    let mut grids: BTreeMap<NodeId, BTreeMap<(u32, u32), NodeId>> = BTreeMap::new();
    for id in tree.tree_order() {
        let Some(record) = tree.node(id) else {
            continue;
        };
        if matches!(record.kind, NodeKind::Root(_) | NodeKind::Tab(_)) || tree.is_hidden(id) {
            continue;
        }
        let Some(parent) = record.parent else {
            continue;
        };
        let grid = grids.entry(parent).or_default();
        for kind in widget_kinds(tree, id) {
            let Some(placement) = widget_placement(tree, id, kind) else {
                continue;
            };
            for cell in placement.cells() {
                if grid.insert(cell, id).is_some() {
                    return Err(PlumeError::IntegrityBreach {
                        node: Some(id),
                        breach: IntegrityIssue::GridOverlap {
                            row: cell.0,
                            column: cell.1,
                        },
                    });
                }
            }
        }
    }

    for id in tree.tree_order() {
        let Some(record) = tree.node(id) else {
            continue;
        };
        if !record.kind.is_group() || id == tree.root() || tree.is_hidden(id) {
            continue;
        }
        let Some(grid) = grids.get(&id).filter(|grid| !grid.is_empty()) else {
            return Err(PlumeError::IntegrityBreach {
                node: Some(id),
                breach: IntegrityIssue::EmptyGrid,
            });
        };
        check_gaps(id, grid)?;
    }
    Ok(())
}

fn check_gaps(group: NodeId, grid: &BTreeMap<(u32, u32), NodeId>) -> Result<()> {
    let rows: BTreeSet<u32> = grid.keys().map(|(row, _)| *row).collect();
    for row in rows {
        let mut hole = None;
        for column in 0..GRID_WIDTH {
            match (grid.contains_key(&(row, column)), hole) {
                (false, None) => hole = Some(column),
                (true, Some(empty)) => {
                    return Err(PlumeError::IntegrityBreach {
                        node: Some(group),
                        breach: IntegrityIssue::GridGap { row, column: empty },
                    });
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Placements of every visible widget of `id`, for layout refreshes.
#[must_use]
pub fn placements(tree: &FormTree, id: NodeId) -> Vec<(WidgetKind, Placement)> {
    widget_kinds(tree, id)
        .into_iter()
        .filter_map(|kind| widget_placement(tree, id, kind).map(|p| (kind, p)))
        .filter(|(_, placement)| !placement.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use plume_rdf::namespace::{dct, rdf};
    use plume_rdf::{Iri, Literal, PropertyPath};
    use plume_tree::{
        NodeSpec, PropertyInfo, Session, TabNode, TreeBuilder, ValueNode, ValuesGroup,
    };

    use super::*;

    fn title(label: &str) -> PropertyInfo {
        PropertyInfo::new(
            Iri::new(dct::TITLE),
            PropertyPath::root().child(&Iri::new(dct::TITLE)),
        )
        .with_label(label)
        .with_xsdtype(Iri::new(rdf::LANG_STRING))
    }

    fn session() -> Session {
        Session::new(["fr", "en"]).expect("session")
    }

    fn tab(builder: &mut TreeBuilder) -> NodeId {
        let root = builder.root();
        builder
            .insert(
                root,
                NodeSpec::new(NodeKind::Tab(TabNode {
                    label: "Général".into(),
                })),
            )
            .expect("tab")
            .expect("created")
    }

    #[test]
    fn label_then_main_widget() {
        let mut builder = TreeBuilder::new(session().with_language_buttons(false), None);
        let tab = tab(&mut builder);
        let value = ValueNode::new(Some(title("Titre")))
            .with_value(Some(Literal::lang_string("Titre", "fr").into()));
        let id = builder
            .insert(tab, NodeSpec::new(NodeKind::Value(value)))
            .expect("insert")
            .expect("created");
        let tree = builder.finish();
        assert_eq!(
            widget_placement(&tree, id, WidgetKind::Label),
            Some(Placement::new(0, 0, 1, 1))
        );
        assert_eq!(
            widget_placement(&tree, id, WidgetKind::Main),
            Some(Placement::new(0, 1, 1, 5))
        );
        assert_eq!(widget_placement(&tree, id, WidgetKind::Minus), None);
        assert!(check_grids(&tree).is_ok());
    }

    #[test]
    fn minus_and_language_buttons_sit_on_the_right() {
        let mut builder = TreeBuilder::new(session(), None);
        let tab = tab(&mut builder);
        let group = builder
            .insert(
                tab,
                NodeSpec::new(NodeKind::GroupOfValues(ValuesGroup {
                    property: title("Titre"),
                    with_minus_buttons: true,
                    button: None,
                })),
            )
            .expect("group")
            .expect("created");
        let mut values = Vec::new();
        for text in ["un", "deux"] {
            let value = ValueNode::new(None)
                .with_value(Some(Literal::lang_string(text, "fr").into()));
            values.push(
                builder
                    .insert(group, NodeSpec::new(NodeKind::Value(value)))
                    .expect("value")
                    .expect("created"),
            );
        }
        let button = builder
            .insert(group, NodeSpec::new(NodeKind::PlusButton))
            .expect("button")
            .expect("created");
        let tree = builder.finish();

        assert_eq!(
            widget_placement(&tree, values[1], WidgetKind::Main),
            Some(Placement::new(1, 0, 1, 4))
        );
        assert_eq!(
            widget_placement(&tree, values[1], WidgetKind::Language),
            Some(Placement::new(1, 4, 1, 1))
        );
        assert_eq!(
            widget_placement(&tree, values[1], WidgetKind::Minus),
            Some(Placement::new(1, 5, 1, 1))
        );
        assert_eq!(
            widget_placement(&tree, button, WidgetKind::Main),
            Some(Placement::new(2, 0, 1, 1))
        );
        assert!(check_grids(&tree).is_ok());
    }

    #[test]
    fn gaps_are_reported() {
        let mut grid = BTreeMap::new();
        let node = NodeId::MIN;
        grid.insert((0, 0), node);
        grid.insert((0, 2), node);
        let err = check_gaps(node, &grid).expect_err("gap");
        assert!(matches!(
            err,
            PlumeError::IntegrityBreach {
                breach: IntegrityIssue::GridGap { row: 0, column: 1 },
                ..
            }
        ));
    }
}
