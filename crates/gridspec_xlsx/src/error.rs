//! Error types for gridspec-xlsx

use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use gridspec_layout::{N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while writing laid-out sheets to a workbook
#[derive(Debug, Error)]
pub enum Error {
    /// Layout validation or ingestion failed
    #[error(transparent)]
    Layout(#[from] gridspec_layout::Error),

    /// Underlying xlsx writer failed
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),

    /// DataFrame decoding or access failed
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] PolarsError),

    /// Row outside `1..=N_NROWS_EXCEL_MAX`
    #[error("Row {0} is outside the sheet (1..={max})", max = N_NROWS_EXCEL_MAX)]
    RowOverflow(usize),

    /// Column outside `1..=N_NCOLS_EXCEL_MAX`
    #[error("Column {0} is outside the sheet (1..={max})", max = N_NCOLS_EXCEL_MAX)]
    ColumnOverflow(usize),

    /// Sheet written after `close`
    #[error("Writer is already closed")]
    WriterClosed,

    /// DataFrame has repeated column names
    #[error("Duplicate column names detected: {0}")]
    DuplicateColumns(String),
}
