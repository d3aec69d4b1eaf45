//! Layout constants and default preset factories.

use crate::spec::SpecCellFormat;
use crate::theme::ThemeContext;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// First row of a sheet (1-based grid).
pub const N_ROW_START_DEFAULT: usize = 1;
/// Blank rows inserted between consecutive tables.
pub const N_ROWS_TABLE_SPACING: usize = 2;

/// Theme preset for nested header cells.
pub const C_STYLE_HEADER: &str = "header";
/// Theme preset for table title rows.
pub const C_STYLE_TITLE: &str = "title";
/// Theme preset for plain text.
pub const C_STYLE_TEXT: &str = "text";
/// Overlay preset applied by `borders`.
pub const C_STYLE_BORDER: &str = "border";
/// Overlay preset applied by `stripes`.
pub const C_STYLE_STRIPE: &str = "stripe";

/// Build the default theme used when the caller supplies none.
pub fn derive_default_theme() -> ThemeContext {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(11),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    ThemeContext::new()
        .with_style(C_STYLE_TEXT, cfg_base_fmt_spec.clone())
        .with_style(
            C_STYLE_HEADER,
            cfg_base_fmt_spec.with_(SpecCellFormat {
                bold: Some(true),
                align: Some("center".to_string()),
                border: Some(1),
                text_wrap: Some(true),
                ..Default::default()
            }),
        )
        .with_style(
            C_STYLE_TITLE,
            cfg_base_fmt_spec.with_(SpecCellFormat {
                bold: Some(true),
                font_size: Some(14),
                align: Some("left".to_string()),
                ..Default::default()
            }),
        )
        .with_style(
            C_STYLE_BORDER,
            SpecCellFormat {
                border: Some(1),
                ..Default::default()
            },
        )
        .with_style(
            C_STYLE_STRIPE,
            SpecCellFormat {
                bg_color: Some("#F2F2F2".to_string()),
                ..Default::default()
            },
        )
}
