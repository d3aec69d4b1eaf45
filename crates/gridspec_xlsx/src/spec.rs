//! Writer-side models.

use gridspec_layout::{SpecLayoutReport, SpecTableExtent};

/// Text written in place of non-finite numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Text for `NaN`.
    pub nan_str: String,
    /// Text for `+Inf`.
    pub posinf_str: String,
    /// Text for `-Inf`.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Name the caller asked for.
    pub sheet_name_requested: String,
    /// Name actually used in the workbook.
    pub sheet_name: String,
    /// Tables laid out on the sheet.
    pub tables: Vec<SpecTableExtent>,
    /// Non-fatal warnings from layout and writing.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    pub fn new(requested: &str, sheet_name: &str, layout_report: &SpecLayoutReport) -> Self {
        Self {
            sheet_name_requested: requested.to_string(),
            sheet_name: sheet_name.to_string(),
            tables: layout_report.tables.clone(),
            warnings: layout_report.warnings.clone(),
        }
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}
