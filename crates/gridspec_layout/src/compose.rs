//! Placement of body and footer nodes into the grid.

use crate::column_index::ColumnIndex;
use crate::spec::{
    EnumCellRole, SpecCellAssignment, SpecCellRange, SpecDataNode, SpecFooterNode, SpecSheetLayout,
};
use crate::theme::ThemeContext;

/// Column used when a node's key and header reference are both unknown.
pub const N_COL_FALLBACK: usize = 1;

/// Per-table state shared by every composed row.
pub struct SpecRowComposeContext<'a> {
    /// Column lookup of the current table.
    pub column_index: &'a ColumnIndex,
    /// Style presets for named references.
    pub theme: &'a ThemeContext,
}

/// Place `node` and its same-row children on `row_pointer`.
///
/// Returns `row_pointer + 1` when the node jumps, else `row_pointer`.
pub fn compose_data_row(
    node: &SpecDataNode,
    row_pointer: usize,
    ctx: &SpecRowComposeContext<'_>,
    layout: &mut SpecSheetLayout,
) -> usize {
    place_node(node, row_pointer, ctx, layout, EnumCellRole::Body);
    for child in &node.children {
        place_node(child, row_pointer, ctx, layout, EnumCellRole::Body);
    }
    derive_row_next(node, row_pointer)
}

/// Footer counterpart of [`compose_data_row`] honouring `merge_to`.
pub fn compose_footer_row(
    node: &SpecFooterNode,
    row_pointer: usize,
    ctx: &SpecRowComposeContext<'_>,
    layout: &mut SpecSheetLayout,
) -> usize {
    for fragment in std::iter::once(node).chain(node.children.iter()) {
        let n_col = place_node(fragment, row_pointer, ctx, layout, EnumCellRole::Footer);
        if !fragment.merge_cell {
            continue;
        }
        let Some(n_col_to) = fragment.merge_to else {
            continue;
        };
        if n_col_to > n_col {
            let region = SpecCellRange::new(row_pointer, n_col, row_pointer, n_col_to);
            layout.add_merge(region);
        } else {
            let msg = format!(
                "Footer merge on row {row_pointer} ignored: merge_to={n_col_to} is not right of column {n_col}."
            );
            log::warn!("{msg}");
            layout.report.warn(msg);
        }
    }
    derive_row_next(node, row_pointer)
}

/// Column of `node` in `column_index`, by key then header reference.
pub fn resolve_node_column(node: &SpecDataNode, column_index: &ColumnIndex) -> Option<usize> {
    column_index.resolve(node.key.as_deref(), node.header_ref.as_deref())
}

fn derive_row_next(node: &SpecDataNode, row_pointer: usize) -> usize {
    if node.jump { row_pointer + 1 } else { row_pointer }
}

fn place_node(
    node: &SpecDataNode,
    row: usize,
    ctx: &SpecRowComposeContext<'_>,
    layout: &mut SpecSheetLayout,
    role: EnumCellRole,
) -> usize {
    let n_col = match resolve_node_column(node, ctx.column_index) {
        Some(n_col) => n_col,
        None => {
            let msg = format!(
                "Row {row}: no column for key={:?} header={:?}; using column {N_COL_FALLBACK}.",
                node.key, node.header_ref
            );
            log::debug!("{msg}");
            layout.report.warn(msg);
            N_COL_FALLBACK
        }
    };

    let style = node
        .style
        .as_ref()
        .and_then(|style| ctx.theme.resolve(style, &mut layout.report));

    let mut cell = SpecCellAssignment::new(node.value.clone(), style, role);
    cell.link = node.link.clone();
    cell.num_format = node.num_format.clone();
    cell.comment = node.comment.clone();
    cell.validation = node.validation.clone();
    layout.set_cell(row, n_col, cell);

    if let Some(height) = node.row_height {
        layout.row_heights.insert(row, height);
    }
    n_col
}
