//! Error types for gridspec-layout

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised around (never inside) the layout computation
#[derive(Debug, Error)]
pub enum Error {
    /// Sheet declares no headers and no body rows
    #[error("Sheet {0:?} has no headers and no body rows")]
    EmptySheet(String),

    /// Finalize found no table to merge the pending area into
    #[error("No table available to finalize")]
    NoTableAvailable,

    /// Sheet name registered twice in one workbook
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Malformed table declaration
    #[error("Invalid table declaration: {0}")]
    Json(#[from] serde_json::Error),
}
