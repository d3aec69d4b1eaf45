//! Output boundary: the calls an assembled sheet is replayed into.

use std::convert::Infallible;

use crate::spec::{SpecCellAssignment, SpecCellRange, SpecMergeRegion, SpecSheetLayout};

/// Receiver of sheet instructions. Coordinates are 1-based.
pub trait SheetSink {
    type Error;

    fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        cell: &SpecCellAssignment,
    ) -> Result<(), Self::Error>;

    fn merge_range(&mut self, region: &SpecMergeRegion) -> Result<(), Self::Error>;

    fn set_row_height(&mut self, row: usize, height: f64) -> Result<(), Self::Error>;

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), Self::Error>;

    fn register_filter_range(&mut self, range: &SpecCellRange) -> Result<(), Self::Error>;
}

/// Replay `layout` into `sink`.
///
/// Merges go first so a sink that writes merged ranges with a placeholder can
/// have the anchor value written over it; cells follow in row-major order.
pub fn emit_sheet_layout<S: SheetSink>(
    layout: &SpecSheetLayout,
    sink: &mut S,
) -> Result<(), S::Error> {
    for region in &layout.merges {
        sink.merge_range(region)?;
    }
    for (&(row, col), cell) in &layout.cells {
        sink.set_cell(row, col, cell)?;
    }
    for (&row, &height) in &layout.row_heights {
        sink.set_row_height(row, height)?;
    }
    for (&col, &width) in &layout.column_widths {
        sink.set_column_width(col, width)?;
    }
    for range in &layout.filter_ranges {
        sink.register_filter_range(range)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// #region RecordingSink

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSinkCall {
    SetCell {
        row: usize,
        col: usize,
        text: String,
    },
    MergeRange(SpecMergeRegion),
    SetRowHeight(usize, f64),
    SetColumnWidth(usize, f64),
    RegisterFilterRange(SpecCellRange),
}

/// In-memory sink keeping every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub calls: Vec<EnumSinkCall>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merges(&self) -> Vec<SpecMergeRegion> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EnumSinkCall::MergeRange(region) => Some(*region),
                _ => None,
            })
            .collect()
    }

    pub fn filter_ranges(&self) -> Vec<SpecCellRange> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                EnumSinkCall::RegisterFilterRange(range) => Some(*range),
                _ => None,
            })
            .collect()
    }
}

impl SheetSink for RecordingSink {
    type Error = Infallible;

    fn set_cell(
        &mut self,
        row: usize,
        col: usize,
        cell: &SpecCellAssignment,
    ) -> Result<(), Self::Error> {
        self.calls.push(EnumSinkCall::SetCell {
            row,
            col,
            text: cell.derive_display_text(),
        });
        Ok(())
    }

    fn merge_range(&mut self, region: &SpecMergeRegion) -> Result<(), Self::Error> {
        self.calls.push(EnumSinkCall::MergeRange(*region));
        Ok(())
    }

    fn set_row_height(&mut self, row: usize, height: f64) -> Result<(), Self::Error> {
        self.calls.push(EnumSinkCall::SetRowHeight(row, height));
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<(), Self::Error> {
        self.calls.push(EnumSinkCall::SetColumnWidth(col, width));
        Ok(())
    }

    fn register_filter_range(&mut self, range: &SpecCellRange) -> Result<(), Self::Error> {
        self.calls.push(EnumSinkCall::RegisterFilterRange(*range));
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
