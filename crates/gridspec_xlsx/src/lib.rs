//! `gridspec_xlsx` v1:
//! XLSX output for `gridspec_layout` sheets.
//!
//! - `spec`   : report and value policy models
//! - `util`   : coordinate, name and format helpers
//! - `frame`  : Polars DataFrame ingestion
//! - `writer` : workbook writer and worksheet sink
pub mod error;
pub mod frame;
pub mod spec;
pub mod util;
pub mod writer;

pub use error::{Error, Result};
pub use frame::{
    derive_dataframe_from_ipc_bytes, derive_sheet_from_dataframe, derive_table_from_dataframe,
};
pub use spec::{SpecXlsxReport, SpecXlsxValuePolicy};
pub use util::{cast_col_num, cast_row_num, sanitize_sheet_name};
pub use writer::{XlsxSheetSink, XlsxWriter};
