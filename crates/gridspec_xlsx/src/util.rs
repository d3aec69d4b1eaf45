//! Stateless helpers for the xlsx sink.

use std::collections::{BTreeMap, BTreeSet};

use gridspec_layout::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, SpecCellAssignment,
    SpecCellFormat, TUP_EXCEL_ILLEGAL,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

use crate::error::{Error, Result};
use crate::spec::SpecXlsxValuePolicy;

////////////////////////////////////////////////////////////////////////////////
// #region Coordinates

/// 1-based layout row to 0-based worksheet row.
pub fn cast_row_num(row: usize) -> Result<u32> {
    if row == 0 || row > N_NROWS_EXCEL_MAX {
        return Err(Error::RowOverflow(row));
    }
    u32::try_from(row - 1).map_err(|_| Error::RowOverflow(row))
}

/// 1-based layout column to 0-based worksheet column.
pub fn cast_col_num(col: usize) -> Result<u16> {
    if col == 0 || col > N_NCOLS_EXCEL_MAX {
        return Err(Error::ColumnOverflow(col));
    }
    u16::try_from(col - 1).map_err(|_| Error::ColumnOverflow(col))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Suffixed sheet name (`base__2`, `base__3`, ...), respecting length cap.
pub fn create_sheet_identifier(base_name: &str, n_idx: usize) -> String {
    let c_suffix = format!("__{n_idx}");
    let n_len_base_max = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
    let c_base: String = base_name.chars().take(usize::max(1, n_len_base_max)).collect();
    format!("{c_base}{c_suffix}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy text; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecXlsxValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Effective format of a cell: its style with the node number format on top.
pub fn derive_cell_format_spec(cell: &SpecCellAssignment) -> Option<SpecCellFormat> {
    match (&cell.style, &cell.num_format) {
        (style, None) => style.clone(),
        (style, Some(num_format)) => Some(style.clone().unwrap_or_default().with_(
            SpecCellFormat {
                num_format: Some(num_format.clone()),
                ..Default::default()
            },
        )),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

/// Excel border styles, indexed by the integer used in style declarations.
const TUP_FORMAT_BORDER: [FormatBorder; 14] = [
    FormatBorder::None,
    FormatBorder::Thin,
    FormatBorder::Medium,
    FormatBorder::Dashed,
    FormatBorder::Dotted,
    FormatBorder::Thick,
    FormatBorder::Double,
    FormatBorder::Hair,
    FormatBorder::MediumDashed,
    FormatBorder::DashDot,
    FormatBorder::MediumDashDot,
    FormatBorder::DashDotDot,
    FormatBorder::MediumDashDotDot,
    FormatBorder::SlantDashDot,
];

/// Worksheet format for a resolved cell format.
pub fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let format = apply_format_font(Format::new(), spec);
    let format = apply_format_alignment(format, spec);
    let format = apply_format_borders(format, spec);
    apply_format_fill(format, spec)
}

fn apply_format_font(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(c_font) = &spec.font_name {
        format = format.set_font_name(c_font.as_str());
    }
    if let Some(n_size) = spec.font_size {
        format = format.set_font_size(n_size as f64);
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if spec.italic == Some(true) {
        format = format.set_italic();
    }
    if let Some(c_color) = &spec.font_color {
        format = format.set_font_color(c_color.as_str());
    }
    format
}

fn apply_format_alignment(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(align) = spec.align.as_deref().and_then(derive_format_align_horizontal) {
        format = format.set_align(align);
    }
    if let Some(align) = spec.valign.as_deref().and_then(derive_format_align_vertical) {
        format = format.set_align(align);
    }
    if spec.text_wrap == Some(true) {
        format = format.set_text_wrap();
    }
    format
}

/// All-sides border first; per-side values override it.
fn apply_format_borders(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(n_border) = spec.border {
        format = format.set_border(derive_format_border(n_border));
    }
    let l_sides: [(Option<i64>, fn(Format, FormatBorder) -> Format); 4] = [
        (spec.top, Format::set_border_top),
        (spec.bottom, Format::set_border_bottom),
        (spec.left, Format::set_border_left),
        (spec.right, Format::set_border_right),
    ];
    for (n_border, set_side) in l_sides {
        if let Some(n_border) = n_border {
            format = set_side(format, derive_format_border(n_border));
        }
    }
    format
}

fn apply_format_fill(mut format: Format, spec: &SpecCellFormat) -> Format {
    if let Some(c_num_format) = &spec.num_format {
        format = format.set_num_format(c_num_format.as_str());
    }
    if let Some(c_color) = &spec.bg_color {
        format = format.set_background_color(c_color.as_str());
    }
    format
}

/// Border style by index; unknown indices draw no border.
pub fn derive_format_border(n_border: i64) -> FormatBorder {
    usize::try_from(n_border)
        .ok()
        .and_then(|n_idx| TUP_FORMAT_BORDER.get(n_idx).cloned())
        .unwrap_or(FormatBorder::None)
}

pub fn derive_format_align_horizontal(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "distributed" => Some(FormatAlign::Distributed),
        _ => None,
    }
}

/// Vertical alignment; `center` means vertical centering here.
pub fn derive_format_align_vertical(valign: &str) -> Option<FormatAlign> {
    match valign.trim().to_ascii_lowercase().as_str() {
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "center" | "vcenter" | "middle" => Some(FormatAlign::VerticalCenter),
        "justify" | "vjustify" => Some(FormatAlign::VerticalJustify),
        "distributed" | "vdistributed" => Some(FormatAlign::VerticalDistributed),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DataFrameLikeUtils

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<()> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }

    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {l_pos:?}", l_pos.len()))
        .collect::<Vec<_>>()
        .join("; ");

    Err(Error::DuplicateColumns(c_msg))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use gridspec_layout::{EnumCellRole, EnumCellValue};

    use super::*;

    #[test]
    fn test_cast_converts_one_based_and_rejects_out_of_sheet() {
        assert_eq!(cast_row_num(1).unwrap(), 0);
        assert_eq!(cast_col_num(N_NCOLS_EXCEL_MAX).unwrap(), 16_383);
        assert!(matches!(cast_row_num(0), Err(Error::RowOverflow(0))));
        assert!(matches!(
            cast_row_num(N_NROWS_EXCEL_MAX + 1),
            Err(Error::RowOverflow(_))
        ));
        assert!(matches!(
            cast_col_num(N_NCOLS_EXCEL_MAX + 1),
            Err(Error::ColumnOverflow(_))
        ));
    }

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_and_truncates() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_sheet_identifier_respects_length_cap() {
        assert_eq!(create_sheet_identifier("Data", 2), "Data__2");
        let c_name = create_sheet_identifier(&"y".repeat(31), 12);
        assert_eq!(c_name.chars().count(), 31);
        assert!(c_name.ends_with("__12"));
    }

    #[test]
    fn test_non_finite_numbers_map_to_policy_text() {
        let policy = SpecXlsxValuePolicy::default();
        assert_eq!(
            convert_nan_inf_to_str(f64::NAN, &policy).as_deref(),
            Some("NaN")
        );
        assert_eq!(
            convert_nan_inf_to_str(f64::NEG_INFINITY, &policy).as_deref(),
            Some("-Inf")
        );
        assert_eq!(convert_nan_inf_to_str(1.5, &policy), None);
    }

    #[test]
    fn test_num_format_overlays_cell_style() {
        let mut cell = SpecCellAssignment::new(
            EnumCellValue::Number(1.0),
            Some(SpecCellFormat {
                bold: Some(true),
                ..Default::default()
            }),
            EnumCellRole::Body,
        );
        assert_eq!(
            derive_cell_format_spec(&cell).and_then(|f| f.num_format),
            None
        );

        cell.num_format = Some("0.00%".to_string());
        let spec = derive_cell_format_spec(&cell).unwrap();
        assert_eq!(spec.bold, Some(true));
        assert_eq!(spec.num_format.as_deref(), Some("0.00%"));
    }

    #[test]
    fn test_vertical_center_is_not_horizontal_center() {
        assert_eq!(
            derive_format_align_vertical("Center"),
            Some(FormatAlign::VerticalCenter)
        );
        assert_eq!(
            derive_format_align_horizontal("center"),
            Some(FormatAlign::Center)
        );
        assert_eq!(derive_format_align_horizontal("top"), None);

        let spec = SpecCellFormat {
            align: Some("center".to_string()),
            valign: Some("center".to_string()),
            ..Default::default()
        };
        assert_eq!(
            derive_rust_xlsx_format(&spec),
            Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        );
    }

    #[test]
    fn test_side_borders_override_all_sides() {
        assert_eq!(derive_format_border(6), FormatBorder::Double);
        assert_eq!(derive_format_border(-1), FormatBorder::None);
        assert_eq!(derive_format_border(14), FormatBorder::None);

        let spec = SpecCellFormat {
            border: Some(1),
            top: Some(5),
            bold: Some(true),
            ..Default::default()
        };
        assert_eq!(
            derive_rust_xlsx_format(&spec),
            Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_border_top(FormatBorder::Thick)
        );
    }

    #[test]
    fn test_validate_unique_columns_lists_duplicates() {
        let l_colnames = ["a".to_string(), "b".to_string()];
        assert!(validate_unique_columns(&l_colnames).is_ok());
        let err = validate_unique_columns(&["a".to_string(), "a".to_string()]).unwrap_err();
        assert!(err.to_string().contains("\"a\" x2"));
    }
}
