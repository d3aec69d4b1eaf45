//! Nested header block construction and smart merge planning.

use std::collections::BTreeMap;

use crate::conf::C_STYLE_HEADER;
use crate::span::{calculate_col_span, calculate_max_depth};
use crate::spec::{
    EnumCellRole, EnumCellValue, SpecCellAssignment, SpecCellFormat, SpecCellRange, SpecHeaderNode,
    SpecLayoutReport, SpecMergeRegion, SpecSheetLayout,
};
use crate::theme::ThemeContext;

////////////////////////////////////////////////////////////////////////////////
// #region HeaderBlock

/// Output of [`build_nested_headers`]: one row per depth level plus merges.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecHeaderBlock {
    /// Header cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecCellAssignment>,
    /// Smart merge regions, single cells excluded.
    pub merges: Vec<SpecMergeRegion>,
    /// Heights declared on header nodes, by row.
    pub row_heights: BTreeMap<usize, f64>,
    /// Widths declared on leaf headers, by column.
    pub column_widths: BTreeMap<usize, f64>,
    /// First block row.
    pub row_start: usize,
    /// First row after the block.
    pub row_next: usize,
    /// Columns spanned by the block.
    pub col_count: usize,
}

impl SpecHeaderBlock {
    fn empty(row_start: usize) -> Self {
        Self {
            row_start,
            row_next: row_start,
            ..Default::default()
        }
    }

    /// Number of header rows in the block.
    pub fn height(&self) -> usize {
        self.row_next - self.row_start
    }

    /// Display text of one block row, columns `1..=col_count`.
    pub fn derive_row_texts(&self, row: usize) -> Vec<String> {
        (1..=self.col_count)
            .map(|col| {
                self.cells
                    .get(&(row, col))
                    .map(|cell| cell.value.to_alias())
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Move the block into a sheet layout.
    pub fn apply_to(self, layout: &mut SpecSheetLayout) {
        layout.cells.extend(self.cells);
        for region in self.merges {
            layout.add_merge(region);
        }
        layout.row_heights.extend(self.row_heights);
        layout.column_widths.extend(self.column_widths);
    }
}

struct SpecHeaderSlot<'a> {
    node: Option<&'a SpecHeaderNode>,
    col_start: usize,
    span: usize,
    fmt: Option<SpecCellFormat>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NestedHeaders

/// Expand `headers` into `max_depth` rows starting at `row_start`.
///
/// Each depth row holds the nodes living at that depth; a branch that ended
/// higher up is continued with blank cells so columns stay aligned.
pub fn build_nested_headers(
    headers: &[SpecHeaderNode],
    row_start: usize,
    theme: &ThemeContext,
    report: &mut SpecLayoutReport,
) -> SpecHeaderBlock {
    let mut block = SpecHeaderBlock::empty(row_start);
    if headers.is_empty() {
        return block;
    }

    let n_depth_max = calculate_max_depth(headers);
    let row_end = row_start + n_depth_max - 1;

    let mut l_slots = Vec::with_capacity(headers.len());
    let mut n_col_cursor = 1;
    for header in headers {
        let n_span = calculate_col_span(header);
        l_slots.push(SpecHeaderSlot {
            node: Some(header),
            col_start: n_col_cursor,
            span: n_span,
            fmt: theme.resolve_or(header.style.as_ref(), C_STYLE_HEADER, report),
        });
        n_col_cursor += n_span;
    }

    for n_depth in 0..n_depth_max {
        let row = row_start + n_depth;
        let mut l_slots_next = Vec::with_capacity(l_slots.len());

        for slot in &l_slots {
            write_header_slot(&mut block, row, slot);

            match slot.node {
                Some(node) if !node.is_leaf() => {
                    let mut n_col_child = slot.col_start;
                    for child in &node.children {
                        let n_span = calculate_col_span(child);
                        l_slots_next.push(SpecHeaderSlot {
                            node: Some(child),
                            col_start: n_col_child,
                            span: n_span,
                            fmt: theme.resolve_or(child.style.as_ref(), C_STYLE_HEADER, report),
                        });
                        n_col_child += n_span;
                    }
                }
                _ => l_slots_next.push(SpecHeaderSlot {
                    node: None,
                    col_start: slot.col_start,
                    span: slot.span,
                    fmt: slot.fmt.clone(),
                }),
            }
        }

        l_slots = l_slots_next;
    }

    block.merges = plan_smart_merges(headers, row_start, row_end);
    block.row_next = row_start + n_depth_max;
    block.col_count = n_col_cursor - 1;
    block
}

fn write_header_slot(block: &mut SpecHeaderBlock, row: usize, slot: &SpecHeaderSlot<'_>) {
    for col in slot.col_start..slot.col_start + slot.span {
        let value = match slot.node {
            Some(node) if col == slot.col_start => node.value.clone(),
            _ => EnumCellValue::None,
        };
        block.cells.insert(
            (row, col),
            SpecCellAssignment::new(value, slot.fmt.clone(), EnumCellRole::Header),
        );
    }

    let Some(node) = slot.node else {
        return;
    };
    if let Some(height) = node.row_height {
        block.row_heights.insert(row, height);
    }
    if node.is_leaf()
        && let Some(width) = node.width
    {
        block.column_widths.insert(slot.col_start, width);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SmartMerge

/// Derive merge regions for a header block spanning `row_start..=row_end`.
///
/// Leaves merge vertically down to `row_end`; parents merge horizontally on
/// their own row and recurse one row down. 1x1 regions are not emitted.
pub fn plan_smart_merges(
    headers: &[SpecHeaderNode],
    row_start: usize,
    row_end: usize,
) -> Vec<SpecMergeRegion> {
    let mut l_merges = Vec::new();
    let mut n_col_cursor = 1;
    for header in headers {
        plan_node_merges(header, row_start, row_end, n_col_cursor, &mut l_merges);
        n_col_cursor += calculate_col_span(header);
    }
    l_merges
}

fn plan_node_merges(
    node: &SpecHeaderNode,
    row: usize,
    row_end: usize,
    col_start: usize,
    l_merges: &mut Vec<SpecMergeRegion>,
) {
    let col_end = col_start + calculate_col_span(node) - 1;

    if node.is_leaf() {
        let region = SpecCellRange::new(row, col_start, row_end, col_end);
        push_region(l_merges, region);
        return;
    }

    push_region(l_merges, SpecCellRange::new(row, col_start, row, col_end));
    let mut n_col_child = col_start;
    for child in &node.children {
        plan_node_merges(child, row + 1, row_end, n_col_child, l_merges);
        n_col_child += calculate_col_span(child);
    }
}

fn push_region(l_merges: &mut Vec<SpecMergeRegion>, region: SpecMergeRegion) {
    if !region.is_single_cell() {
        l_merges.push(region);
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
