//! `gridspec_layout` v1:
//! Hierarchical table layout engine for spreadsheet sheets.
//!
//! Modules:
//! - `conf`         : constants and default presets
//! - `spec`         : node/table models and the sheet grid
//! - `theme`        : named style presets passed to the assembler
//! - `span`         : column span / depth of header trees
//! - `column_index` : per-table alias -> column lookup
//! - `grid`         : nested header block and smart merges
//! - `compose`      : body/footer row placement
//! - `assemble`     : table and sheet assembly
//! - `builder`      : sheet/workbook staging
//! - `ingest`       : JSON declarations
//! - `sink`         : output boundary
pub mod assemble;
pub mod builder;
pub mod column_index;
pub mod compose;
pub mod conf;
pub mod error;
pub mod grid;
pub mod ingest;
pub mod sink;
pub mod span;
pub mod spec;
pub mod theme;

pub use assemble::{assemble_sheet, assemble_table};
pub use builder::{SheetBuilder, WorkbookBuilder};
pub use column_index::ColumnIndex;
pub use compose::{SpecRowComposeContext, compose_data_row, compose_footer_row};
pub use conf::{
    C_STYLE_BORDER, C_STYLE_HEADER, C_STYLE_STRIPE, C_STYLE_TEXT, C_STYLE_TITLE,
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
    derive_default_theme,
};
pub use error::{Error, Result};
pub use grid::{SpecHeaderBlock, build_nested_headers, plan_smart_merges};
pub use ingest::{parse_headers_json, parse_table_json, parse_tables_json};
pub use sink::{EnumSinkCall, RecordingSink, SheetSink, emit_sheet_layout};
pub use span::{calculate_col_span, calculate_max_depth, calculate_total_span};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellRole, EnumCellValue, EnumStyleRef, SpecAutofitCellsPolicy,
    SpecCellAssignment, SpecCellComment, SpecCellFormat, SpecCellLink, SpecCellRange,
    SpecCellValidation, SpecDataNode, SpecFooterNode, SpecHeaderNode, SpecLayoutOptions,
    SpecLayoutReport, SpecMergeRegion, SpecSheetLayout, SpecTable, SpecTableExtent,
};
pub use theme::ThemeContext;
