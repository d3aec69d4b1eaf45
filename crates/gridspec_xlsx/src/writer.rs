//! Workbook writer replaying laid-out sheets through `rust_xlsxwriter`.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use gridspec_layout::{
    EnumCellValue, SheetSink, SpecCellAssignment, SpecCellFormat, SpecCellRange, SpecLayoutOptions,
    SpecLayoutReport, SpecMergeRegion, SpecSheetLayout, ThemeContext, WorkbookBuilder,
    emit_sheet_layout,
};
use polars::prelude::DataFrame;
use rust_xlsxwriter::{DataValidation, Format, Note, Url, Workbook, Worksheet};

use crate::error::{Error, Result};
use crate::frame::{derive_dataframe_from_ipc_bytes, derive_sheet_from_dataframe};
use crate::spec::{SpecXlsxReport, SpecXlsxValuePolicy};
use crate::util::{
    cast_col_num, cast_row_num, convert_nan_inf_to_str, create_sheet_identifier,
    derive_cell_format_spec, derive_rust_xlsx_format, sanitize_sheet_name,
};

////////////////////////////////////////////////////////////////////////////////
// #region XlsxWriter

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    value_policy: SpecXlsxValuePolicy,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(path_file_out: impl Into<PathBuf>) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            value_policy: SpecXlsxValuePolicy::default(),
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    pub fn with_value_policy(mut self, value_policy: SpecXlsxValuePolicy) -> Self {
        self.value_policy = value_policy;
        self
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        log::debug!(
            "Saved {} sheet(s) to {}",
            self.l_reports.len(),
            self.file_out()
        );
        Ok(())
    }

    /// Serialize the workbook in memory without touching the output path.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Write one laid-out sheet; returns the sheet name used in the workbook.
    pub fn write_sheet(&mut self, name: &str, layout: &SpecSheetLayout) -> Result<String> {
        if self.if_closed {
            return Err(Error::WriterClosed);
        }

        let sheet_name = self.derive_unique_sheet_name(&sanitize_sheet_name(name, "_"));
        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name)?;

        let mut sink = XlsxSheetSink::new(worksheet, &self.value_policy);
        emit_sheet_layout(layout, &mut sink)?;

        let mut report = SpecXlsxReport::new(name, &sheet_name, &layout.report);
        for msg in sink.into_warnings() {
            report.warn(msg);
        }
        log::debug!(
            "Wrote sheet {sheet_name:?}: cells={} merges={} warnings={}",
            layout.cells.len(),
            layout.merges.len(),
            report.warnings.len()
        );
        self.l_reports.push(report);
        Ok(sheet_name)
    }

    /// Lay out and write every sheet of `builder`, one sheet at a time.
    pub fn write_workbook(
        &mut self,
        builder: &WorkbookBuilder,
        theme: &ThemeContext,
        options: &SpecLayoutOptions,
    ) -> Result<Vec<SpecLayoutReport>> {
        builder.build_with(theme, options, |name, layout| {
            self.write_sheet(name, layout).map(|_| ())
        })
    }

    /// Write a DataFrame as a single flat table.
    pub fn write_sheet_from_dataframe(
        &mut self,
        name: &str,
        df: &DataFrame,
        theme: &ThemeContext,
        options: &SpecLayoutOptions,
    ) -> Result<String> {
        let layout = derive_sheet_from_dataframe(name, df)?.build(theme, options)?;
        self.write_sheet(name, &layout)
    }

    /// Write a Polars IPC payload as a single flat table.
    pub fn write_sheet_from_ipc_bytes(
        &mut self,
        name: &str,
        v_ipc_df: &[u8],
        theme: &ThemeContext,
        options: &SpecLayoutOptions,
    ) -> Result<String> {
        let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
        self.write_sheet_from_dataframe(name, &df, theme, options)
    }

    fn derive_unique_sheet_name(&mut self, name: &str) -> String {
        let set_names_lower: BTreeSet<String> = self
            .set_sheet_names_existing
            .iter()
            .map(|c_name| c_name.to_lowercase())
            .collect();
        if !set_names_lower.contains(&name.to_lowercase()) {
            self.set_sheet_names_existing.insert(name.to_string());
            return name.to_string();
        }

        let mut n_idx = 2usize;
        loop {
            let candidate = create_sheet_identifier(name, n_idx);
            if !set_names_lower.contains(&candidate.to_lowercase()) {
                self.set_sheet_names_existing.insert(candidate.clone());
                return candidate;
            }
            n_idx += 1;
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region XlsxSheetSink

/// [`SheetSink`] over one worksheet.
pub struct XlsxSheetSink<'a> {
    worksheet: &'a mut Worksheet,
    value_policy: &'a SpecXlsxValuePolicy,
    dict_formats: HashMap<SpecCellFormat, Format>,
    range_filter: Option<SpecCellRange>,
    l_warnings: Vec<String>,
}

impl<'a> XlsxSheetSink<'a> {
    pub fn new(worksheet: &'a mut Worksheet, value_policy: &'a SpecXlsxValuePolicy) -> Self {
        Self {
            worksheet,
            value_policy,
            dict_formats: HashMap::new(),
            range_filter: None,
            l_warnings: Vec::new(),
        }
    }

    /// Warnings raised while writing.
    pub fn into_warnings(self) -> Vec<String> {
        self.l_warnings
    }

    fn derive_format(&mut self, spec: &SpecCellFormat) -> Format {
        self.dict_formats
            .entry(spec.clone())
            .or_insert_with(|| derive_rust_xlsx_format(spec))
            .clone()
    }

    fn write_value(
        &mut self,
        row_idx: u32,
        col_idx: u16,
        value: &EnumCellValue,
        format: &Format,
    ) -> Result<()> {
        match value {
            EnumCellValue::None => {
                self.worksheet.write_blank(row_idx, col_idx, format)?;
            }
            EnumCellValue::String(val) => {
                self.worksheet
                    .write_string_with_format(row_idx, col_idx, val, format)?;
            }
            EnumCellValue::Number(val) => match convert_nan_inf_to_str(*val, self.value_policy) {
                Some(c_text) => {
                    self.worksheet
                        .write_string_with_format(row_idx, col_idx, c_text, format)?;
                }
                None => {
                    self.worksheet
                        .write_number_with_format(row_idx, col_idx, *val, format)?;
                }
            },
            EnumCellValue::Boolean(val) => {
                self.worksheet
                    .write_boolean_with_format(row_idx, col_idx, *val, format)?;
            }
        }
        Ok(())
    }
}

impl SheetSink for XlsxSheetSink<'_> {
    type Error = Error;

    fn set_cell(&mut self, row: usize, col: usize, cell: &SpecCellAssignment) -> Result<()> {
        let row_idx = cast_row_num(row)?;
        let col_idx = cast_col_num(col)?;
        let format = derive_cell_format_spec(cell).map(|spec| self.derive_format(&spec));

        match &cell.link {
            Some(link) => {
                let mut url = Url::new(link.url.as_str()).set_text(cell.derive_display_text());
                if let Some(tip) = &link.tooltip {
                    url = url.set_tip(tip.as_str());
                }
                match &format {
                    Some(format) => {
                        self.worksheet
                            .write_url_with_format(row_idx, col_idx, url, format)?;
                    }
                    None => {
                        self.worksheet.write_url(row_idx, col_idx, url)?;
                    }
                }
            }
            None => {
                let format = format.unwrap_or_else(Format::new);
                self.write_value(row_idx, col_idx, &cell.value, &format)?;
            }
        }

        if let Some(comment) = &cell.comment {
            let mut note = Note::new(comment.text.as_str()).add_author_prefix(false);
            if let Some(author) = &comment.author {
                note = note.set_author(author.as_str());
            }
            self.worksheet.insert_note(row_idx, col_idx, &note)?;
        }

        if let Some(validation) = &cell.validation {
            let mut dv = DataValidation::new()
                .allow_list_strings(validation.values.as_slice())?
                .ignore_blank(validation.allow_blank);
            if let Some(title) = &validation.error_title {
                dv = dv.set_error_title(title)?;
            }
            if let Some(msg) = &validation.error_message {
                dv = dv.set_error_message(msg)?;
            }
            self.worksheet
                .add_data_validation(row_idx, col_idx, row_idx, col_idx, &dv)?;
        }
        Ok(())
    }

    fn merge_range(&mut self, region: &SpecMergeRegion) -> Result<()> {
        self.worksheet.merge_range(
            cast_row_num(region.row_start)?,
            cast_col_num(region.col_start)?,
            cast_row_num(region.row_end)?,
            cast_col_num(region.col_end)?,
            "",
            &Format::new(),
        )?;
        Ok(())
    }

    fn set_row_height(&mut self, row: usize, height: f64) -> Result<()> {
        self.worksheet.set_row_height(cast_row_num(row)?, height)?;
        Ok(())
    }

    fn set_column_width(&mut self, col: usize, width: f64) -> Result<()> {
        self.worksheet.set_column_width(cast_col_num(col)?, width)?;
        Ok(())
    }

    /// A worksheet holds one autofilter; later ranges are reported and skipped.
    fn register_filter_range(&mut self, range: &SpecCellRange) -> Result<()> {
        if let Some(range_existing) = &self.range_filter {
            let msg = format!(
                "Filter range {range:?} skipped; sheet already filters {range_existing:?}."
            );
            log::warn!("{msg}");
            self.l_warnings.push(msg);
            return Ok(());
        }
        self.worksheet.autofilter(
            cast_row_num(range.row_start)?,
            cast_col_num(range.col_start)?,
            cast_row_num(range.row_end)?,
            cast_col_num(range.col_end)?,
        )?;
        self.range_filter = Some(*range);
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use gridspec_layout::{EnumCellRole, RecordingSink, derive_default_theme};

    use super::*;

    #[test]
    fn test_unique_sheet_names_are_case_insensitive_and_suffixed() {
        let mut writer = XlsxWriter::new("unused.xlsx");
        assert_eq!(writer.derive_unique_sheet_name("Data"), "Data");
        assert_eq!(writer.derive_unique_sheet_name("data"), "data__2");
        assert_eq!(writer.derive_unique_sheet_name("Data"), "Data__3");
    }

    #[test]
    fn test_out_of_sheet_cell_is_an_error() {
        let mut worksheet = Worksheet::new();
        let policy = SpecXlsxValuePolicy::default();
        let mut sink = XlsxSheetSink::new(&mut worksheet, &policy);
        let cell = SpecCellAssignment::blank(None, EnumCellRole::Body);
        assert!(matches!(
            sink.set_cell(0, 1, &cell),
            Err(Error::RowOverflow(0))
        ));
    }

    #[test]
    fn test_second_filter_range_is_skipped_with_warning() {
        let mut worksheet = Worksheet::new();
        let policy = SpecXlsxValuePolicy::default();
        let mut sink = XlsxSheetSink::new(&mut worksheet, &policy);
        sink.register_filter_range(&SpecCellRange::new(1, 1, 3, 2)).unwrap();
        sink.register_filter_range(&SpecCellRange::new(6, 1, 8, 2)).unwrap();
        assert_eq!(sink.into_warnings().len(), 1);
    }

    #[test]
    fn test_write_after_close_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = XlsxWriter::new(dir.path().join("closed.xlsx"));
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(matches!(
            writer.write_sheet("S", &SpecSheetLayout::default()),
            Err(Error::WriterClosed)
        ));
    }

    #[test]
    fn test_recording_and_xlsx_sinks_accept_the_same_layout() {
        let mut sheet = gridspec_layout::SheetBuilder::new("S");
        sheet
            .add_sub_header(gridspec_layout::SpecHeaderNode::leaf("A"))
            .add_data_row(gridspec_layout::SpecDataNode::new("A", f64::NAN));
        let layout = sheet
            .build(&derive_default_theme(), &SpecLayoutOptions::default())
            .unwrap();

        let mut recording = RecordingSink::new();
        let Ok(()) = emit_sheet_layout(&layout, &mut recording);
        assert_eq!(
            recording.calls.len(),
            layout.cells.len() + layout.column_widths.len()
        );

        let mut writer = XlsxWriter::new("unused.xlsx");
        writer.write_sheet("S", &layout).unwrap();
        assert!(writer.save_to_buffer().unwrap().starts_with(b"PK"));
        assert_eq!(writer.report()[0].sheet_name, "S");
    }
}
