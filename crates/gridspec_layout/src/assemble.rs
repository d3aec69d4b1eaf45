//! Table and sheet assembly: the row pointer fold over a sheet's tables.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::column_index::ColumnIndex;
use crate::compose::{
    N_COL_FALLBACK, SpecRowComposeContext, compose_data_row, compose_footer_row,
    resolve_node_column,
};
use crate::conf::C_STYLE_TITLE;
use crate::grid::build_nested_headers;
use crate::span::calculate_total_span;
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellRole, SpecAutofitCellsPolicy, SpecCellAssignment, SpecCellRange,
    SpecDataNode, SpecLayoutOptions, SpecSheetLayout, SpecTable, SpecTableExtent,
};
use crate::theme::ThemeContext;

////////////////////////////////////////////////////////////////////////////////
// #region SheetAssembly

/// Assemble every table of a sheet as a left fold over the row pointer.
///
/// Empty tables are skipped and take no spacing.
pub fn assemble_sheet<'a, I>(
    tables: I,
    theme: &ThemeContext,
    options: &SpecLayoutOptions,
) -> SpecSheetLayout
where
    I: IntoIterator<Item = &'a SpecTable>,
{
    let mut layout = SpecSheetLayout::default();

    let row_next = tables
        .into_iter()
        .filter(|table| !table.is_empty())
        .enumerate()
        .fold(options.row_start, |row, (n_idx_table, table)| {
            assemble_table(table, n_idx_table, row, theme, options, &mut layout)
        });
    layout.row_next = row_next;

    apply_autofit_column_widths(&mut layout, &options.policy_autofit);

    log::debug!(
        "Assembled sheet: tables={} cells={} merges={} row_next={}",
        layout.report.tables.len(),
        layout.cells.len(),
        layout.merges.len(),
        layout.row_next
    );
    layout
}

/// Assemble one table from `row_start`; returns the row the next table starts from.
///
/// Sequence: spacing, title rows, nested sub-header block, body rows, footer
/// rows, then the border/stripe overlay and filter range over the occupied
/// rectangle. The overlay never touches a cell that carries a style.
pub fn assemble_table(
    table: &SpecTable,
    n_idx_table: usize,
    row_start: usize,
    theme: &ThemeContext,
    options: &SpecLayoutOptions,
    layout: &mut SpecSheetLayout,
) -> usize {
    let if_add_spacing = table.add_spacing.unwrap_or(n_idx_table > 0);
    let row_table_start = if if_add_spacing {
        row_start + options.rows_table_spacing
    } else {
        row_start
    };

    let column_index = ColumnIndex::build(&table.sub_headers);
    let n_cols_max = calculate_table_col_count(table, &column_index);
    let mut row_pointer = row_table_start;

    for header in &table.headers {
        let fmt = theme.resolve_or(header.style.as_ref(), C_STYLE_TITLE, &mut layout.report);
        layout.set_cell(
            row_pointer,
            1,
            SpecCellAssignment::new(header.value.clone(), fmt, EnumCellRole::Title),
        );
        if header.merge_cell {
            layout.add_merge(SpecCellRange::new(row_pointer, 1, row_pointer, n_cols_max));
        }
        if let Some(height) = header.row_height {
            layout.row_heights.insert(row_pointer, height);
        }
        row_pointer += 1;
    }

    let block = build_nested_headers(&table.sub_headers, row_pointer, theme, &mut layout.report);
    row_pointer = block.row_next;
    block.apply_to(layout);

    let row_body_start = row_pointer;
    let ctx = SpecRowComposeContext {
        column_index: &column_index,
        theme,
    };
    row_pointer = table.body.iter().fold(row_pointer, |row, node| {
        compose_data_row(node, row, &ctx, layout)
    });
    row_pointer = table.footers.iter().fold(row_pointer, |row, node| {
        compose_footer_row(node, row, &ctx, layout)
    });

    let Some(row_last) = layout.row_last().filter(|row| *row >= row_table_start) else {
        log::debug!("Table {n_idx_table} wrote no cells.");
        return row_pointer;
    };

    if table.borders || table.stripes {
        apply_table_decoration(
            layout,
            theme,
            table,
            row_table_start..=row_last,
            row_body_start,
            n_cols_max,
        );
    }
    if table.auto_filter {
        layout
            .filter_ranges
            .push(SpecCellRange::new(row_table_start, 1, row_last, n_cols_max));
    }

    layout.report.tables.push(SpecTableExtent {
        row_start: row_table_start,
        row_end: row_last,
        col_count: n_cols_max,
    });
    log::debug!(
        "Table {n_idx_table}: rows {row_table_start}..={row_last}, columns 1..={n_cols_max}"
    );

    usize::max(row_pointer, row_last + 1)
}

/// Width of a table: widest of its header block, column index and placed nodes.
///
/// Only footer merges widen the table; body nodes never merge.
pub fn calculate_table_col_count(table: &SpecTable, column_index: &ColumnIndex) -> usize {
    let resolve_col =
        |node: &SpecDataNode| resolve_node_column(node, column_index).unwrap_or(N_COL_FALLBACK);

    let n_cols_body = table
        .body
        .iter()
        .flat_map(|node| std::iter::once(node).chain(node.children.iter()))
        .map(resolve_col)
        .max()
        .unwrap_or(0);
    let n_cols_footers = table
        .footers
        .iter()
        .flat_map(|node| std::iter::once(node).chain(node.children.iter()))
        .map(|node| match node.merge_to {
            Some(n_col_to) if node.merge_cell => usize::max(resolve_col(node), n_col_to),
            _ => resolve_col(node),
        })
        .max()
        .unwrap_or(0);

    [
        calculate_total_span(&table.sub_headers),
        column_index.len(),
        n_cols_body,
        n_cols_footers,
        1,
    ]
    .into_iter()
    .max()
    .unwrap_or(1)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Decoration

fn apply_table_decoration(
    layout: &mut SpecSheetLayout,
    theme: &ThemeContext,
    table: &SpecTable,
    rows: RangeInclusive<usize>,
    row_body_start: usize,
    n_cols_max: usize,
) {
    for row in rows {
        let if_stripe_row =
            table.stripes && row >= row_body_start && (row - row_body_start) % 2 == 1;
        let Some(fmt) = theme.decoration(table.borders, if_stripe_row) else {
            continue;
        };

        for col in 1..=n_cols_max {
            let cell = layout
                .cells
                .entry((row, col))
                .or_insert_with(|| SpecCellAssignment::blank(None, EnumCellRole::Decoration));
            if cell.style.is_none() {
                cell.style = Some(fmt.clone());
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Infer column widths from cell text; explicit widths are kept.
///
/// Cells inside a merge spanning several columns are not measured.
pub fn apply_autofit_column_widths(layout: &mut SpecSheetLayout, policy: &SpecAutofitCellsPolicy) {
    if matches!(policy.rule_columns, EnumAutofitColumnsRule::None) {
        return;
    }

    let mut dict_width_by_col: BTreeMap<usize, usize> = BTreeMap::new();
    for ((row, col), cell) in &layout.cells {
        let if_spans_columns = layout.merges.iter().any(|merge| {
            merge.col_end > merge.col_start && merge.contains(*row, *col)
        });
        if if_spans_columns {
            continue;
        }

        let if_include = match cell.role {
            EnumCellRole::Title | EnumCellRole::Decoration => false,
            EnumCellRole::Header => matches!(
                policy.rule_columns,
                EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::All
            ),
            EnumCellRole::Body | EnumCellRole::Footer => matches!(
                policy.rule_columns,
                EnumAutofitColumnsRule::Body | EnumAutofitColumnsRule::All
            ),
        };
        if !if_include {
            continue;
        }

        let n_width = estimate_unicode_string_width(&cell.derive_display_text());
        let n_width_recorded = dict_width_by_col.entry(*col).or_insert(0);
        *n_width_recorded = usize::max(*n_width_recorded, n_width);
    }

    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    for (col, n_width_recorded) in dict_width_by_col {
        if layout.column_widths.contains_key(&col) {
            continue;
        }
        let n_width_final = usize::min(
            n_max,
            usize::max(n_min, n_width_recorded + policy.width_cell_padding),
        );
        layout.column_widths.insert(col, n_width_final as f64);
    }
}

/// Display width units; non-ASCII characters count as 1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
