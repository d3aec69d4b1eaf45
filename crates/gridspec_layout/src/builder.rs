//! Sheet and workbook staging on top of the assembler.

use std::collections::BTreeSet;

use crate::assemble::assemble_sheet;
use crate::error::{Error, Result};
use crate::spec::{
    SpecDataNode, SpecFooterNode, SpecHeaderNode, SpecLayoutOptions, SpecLayoutReport,
    SpecSheetLayout, SpecTable,
};
use crate::theme::ThemeContext;

////////////////////////////////////////////////////////////////////////////////
// #region SheetBuilder

/// Stages header/body/footer declarations for one sheet.
///
/// Declarations land in a pending area that `finalize_table` merges into
/// the open table. A sheet that never creates a table is laid out from the
/// pending area alone.
#[derive(Debug, Clone, Default)]
pub struct SheetBuilder {
    name: String,
    pending: SpecTable,
    l_tables: Vec<SpecTable>,
    if_table_open: bool,
}

impl SheetBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_header(&mut self, node: SpecHeaderNode) -> &mut Self {
        self.pending.headers.push(node);
        self
    }

    pub fn add_sub_header(&mut self, node: SpecHeaderNode) -> &mut Self {
        self.pending.sub_headers.push(node);
        self
    }

    pub fn add_data_row(&mut self, node: SpecDataNode) -> &mut Self {
        self.pending.body.push(node);
        self
    }

    pub fn add_footer_row(&mut self, node: SpecFooterNode) -> &mut Self {
        self.pending.footers.push(node);
        self
    }

    pub fn set_borders(&mut self, if_borders: bool) -> &mut Self {
        self.pending.borders = if_borders;
        self
    }

    pub fn set_stripes(&mut self, if_stripes: bool) -> &mut Self {
        self.pending.stripes = if_stripes;
        self
    }

    pub fn set_auto_filter(&mut self, if_auto_filter: bool) -> &mut Self {
        self.pending.auto_filter = if_auto_filter;
        self
    }

    pub fn set_add_spacing(&mut self, if_add_spacing: bool) -> &mut Self {
        self.pending.add_spacing = Some(if_add_spacing);
        self
    }

    /// Open a new table; the next finalize merges the pending area into it.
    pub fn create_table(&mut self) -> &mut Self {
        self.l_tables.push(SpecTable::default());
        self.if_table_open = true;
        self
    }

    /// Merge the pending area into the open table (creating one if needed).
    pub fn finalize_table(&mut self) -> Result<&mut Self> {
        if !self.if_table_open {
            self.create_table();
        }
        let pending = std::mem::take(&mut self.pending);
        let table = self.l_tables.last_mut().ok_or(Error::NoTableAvailable)?;

        table.headers.extend(pending.headers);
        table.sub_headers.extend(pending.sub_headers);
        table.body.extend(pending.body);
        table.footers.extend(pending.footers);
        table.borders |= pending.borders;
        table.stripes |= pending.stripes;
        table.auto_filter |= pending.auto_filter;
        table.add_spacing = pending.add_spacing.or(table.add_spacing);

        self.if_table_open = false;
        Ok(self)
    }

    /// Tables in layout order.
    ///
    /// Without explicit tables the pending area is the single table; with
    /// explicit tables, unfinalized pending content trails them.
    pub fn tables(&self) -> Vec<&SpecTable> {
        if self.l_tables.is_empty() {
            return vec![&self.pending];
        }
        let mut l_tables: Vec<&SpecTable> = self.l_tables.iter().collect();
        if !self.pending.is_empty() {
            l_tables.push(&self.pending);
        }
        l_tables
    }

    /// Reject a sheet with no headers and no body rows.
    pub fn validate(&self) -> Result<()> {
        let if_has_content = self.tables().iter().any(|table| {
            !table.headers.is_empty() || !table.sub_headers.is_empty() || !table.body.is_empty()
        });
        if if_has_content {
            Ok(())
        } else {
            Err(Error::EmptySheet(self.name.clone()))
        }
    }

    /// Validate, then lay out every table.
    pub fn build(
        &self,
        theme: &ThemeContext,
        options: &SpecLayoutOptions,
    ) -> Result<SpecSheetLayout> {
        self.validate()?;
        let tables = self.tables();
        log::debug!("Building sheet {:?} with {} table(s)", self.name, tables.len());
        Ok(assemble_sheet(tables, theme, options))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookBuilder

/// Ordered collection of sheets laid out one at a time.
#[derive(Debug, Clone, Default)]
pub struct WorkbookBuilder {
    l_sheets: Vec<SheetBuilder>,
    set_sheet_names: BTreeSet<String>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new sheet and return it for staging.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut SheetBuilder> {
        let name = name.into();
        if !self.set_sheet_names.insert(name.clone()) {
            return Err(Error::DuplicateSheetName(name));
        }
        self.l_sheets.push(SheetBuilder::new(name));
        let n_idx_last = self.l_sheets.len() - 1;
        Ok(&mut self.l_sheets[n_idx_last])
    }

    pub fn sheets(&self) -> &[SheetBuilder] {
        &self.l_sheets
    }

    /// Lay out each sheet and hand it to `emit` before the next one starts.
    pub fn build_with<F, E>(
        &self,
        theme: &ThemeContext,
        options: &SpecLayoutOptions,
        mut emit: F,
    ) -> std::result::Result<Vec<SpecLayoutReport>, E>
    where
        F: FnMut(&str, &SpecSheetLayout) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        let mut l_reports = Vec::with_capacity(self.l_sheets.len());
        for sheet in &self.l_sheets {
            let layout = sheet.build(theme, options)?;
            emit(sheet.name(), &layout)?;
            l_reports.push(layout.report);
        }
        Ok(l_reports)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::derive_default_theme;

    fn stage_simple(sheet: &mut SheetBuilder, key: &str) {
        sheet
            .add_sub_header(SpecHeaderNode::leaf(key))
            .add_data_row(SpecDataNode::new(key, 1).with_jump(true));
    }

    #[test]
    fn test_legacy_path_uses_pending_area_as_single_table() {
        let mut sheet = SheetBuilder::new("S");
        stage_simple(&mut sheet, "A");
        assert_eq!(sheet.tables().len(), 1);

        let layout = sheet
            .build(&derive_default_theme(), &SpecLayoutOptions::default())
            .unwrap();
        assert_eq!(layout.derive_row_texts(1, 1), vec!["A"]);
        assert_eq!(layout.derive_row_texts(2, 1), vec!["1"]);
    }

    #[test]
    fn test_finalize_auto_creates_table_and_clears_pending() {
        let mut sheet = SheetBuilder::new("S");
        stage_simple(&mut sheet, "A");
        sheet.set_borders(true);
        sheet.finalize_table().unwrap();
        stage_simple(&mut sheet, "B");
        sheet.finalize_table().unwrap();

        let l_tables = sheet.tables();
        assert_eq!(l_tables.len(), 2);
        assert!(l_tables[0].borders);
        assert!(!l_tables[1].borders);
        assert_eq!(l_tables[1].sub_headers[0].key.as_deref(), Some("B"));
    }

    #[test]
    fn test_finalize_merges_into_explicitly_created_table() {
        let mut sheet = SheetBuilder::new("S");
        sheet.create_table();
        stage_simple(&mut sheet, "A");
        sheet.finalize_table().unwrap();
        assert_eq!(sheet.tables().len(), 1);
        assert_eq!(sheet.tables()[0].body.len(), 1);
    }

    #[test]
    fn test_table_left_empty_by_repeated_create_starts_nothing() {
        let mut sheet = SheetBuilder::new("S");
        sheet.create_table();
        stage_simple(&mut sheet, "A");
        sheet.create_table();
        sheet.finalize_table().unwrap();

        let layout = sheet
            .build(&derive_default_theme(), &SpecLayoutOptions::default())
            .unwrap();
        assert_eq!(layout.report.tables.len(), 1);
        assert_eq!(layout.report.tables[0].row_start, 1);
        assert_eq!(layout.row_next, 3);
    }

    #[test]
    fn test_unfinalized_pending_trails_explicit_tables() {
        let mut sheet = SheetBuilder::new("S");
        stage_simple(&mut sheet, "A");
        sheet.finalize_table().unwrap();
        stage_simple(&mut sheet, "B");
        assert_eq!(sheet.tables().len(), 2);
    }

    #[test]
    fn test_empty_sheet_is_rejected() {
        let mut sheet = SheetBuilder::new("Empty");
        sheet.add_footer_row(SpecDataNode::new("A", "total"));
        assert!(matches!(
            sheet.validate(),
            Err(Error::EmptySheet(name)) if name == "Empty"
        ));
    }

    #[test]
    fn test_workbook_rejects_duplicate_sheet_names_and_builds_in_order() {
        let mut workbook = WorkbookBuilder::new();
        stage_simple(workbook.add_sheet("One").unwrap(), "A");
        stage_simple(workbook.add_sheet("Two").unwrap(), "B");
        assert!(matches!(
            workbook.add_sheet("One"),
            Err(Error::DuplicateSheetName(_))
        ));

        let mut l_names = Vec::new();
        let l_reports = workbook
            .build_with::<_, Error>(
                &derive_default_theme(),
                &SpecLayoutOptions::default(),
                |name, layout| {
                    l_names.push((name.to_string(), layout.row_next));
                    Ok(())
                },
            )
            .unwrap();
        assert_eq!(
            l_names,
            vec![("One".to_string(), 3), ("Two".to_string(), 3)]
        );
        assert_eq!(l_reports.len(), 2);
    }
}
