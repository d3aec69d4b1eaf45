//! Declarative table models and the sparse grid they are laid out into.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Display value carried by header, data and footer nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Stringified form used as a column alias and as link fallback text.
    pub fn to_alias(&self) -> String {
        match self {
            EnumCellValue::None => String::new(),
            EnumCellValue::String(val) => val.clone(),
            EnumCellValue::Number(val) => val.to_string(),
            EnumCellValue::Boolean(val) => val.to_string(),
        }
    }
}

impl fmt::Display for EnumCellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_alias())
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        EnumCellValue::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        EnumCellValue::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        EnumCellValue::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        EnumCellValue::Number(value as f64)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        EnumCellValue::Number(f64::from(value))
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        EnumCellValue::Boolean(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Flat cell format record handed to the output sink untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Style reference declared on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumStyleRef {
    /// Preset looked up in the [`crate::theme::ThemeContext`].
    Named(String),
    /// Format passed through as declared.
    Inline(SpecCellFormat),
}

impl From<&str> for EnumStyleRef {
    fn from(value: &str) -> Self {
        EnumStyleRef::Named(value.to_string())
    }
}

impl From<SpecCellFormat> for EnumStyleRef {
    fn from(value: SpecCellFormat) -> Self {
        EnumStyleRef::Inline(value)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellMetadata

/// Hyperlink attached to a data cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellLink {
    /// Link target.
    pub url: String,
    /// Text shown instead of the value/URL.
    pub mask: Option<String>,
    /// Hover tooltip.
    pub tooltip: Option<String>,
}

impl SpecCellLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_mask(mut self, mask: impl Into<String>) -> Self {
        self.mask = Some(mask.into());
        self
    }

    /// Text displayed in the cell: mask, else non-empty value, else the URL.
    pub fn derive_display_text(&self, value: &EnumCellValue) -> String {
        if let Some(mask) = &self.mask {
            return mask.clone();
        }
        let c_value = value.to_alias();
        if c_value.is_empty() {
            self.url.clone()
        } else {
            c_value
        }
    }
}

/// Note attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCellComment {
    /// Note body.
    pub text: String,
    /// Optional author name.
    pub author: Option<String>,
}

impl SpecCellComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
        }
    }
}

/// List validation attached to a cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecCellValidation {
    /// Allowed values.
    pub values: Vec<String>,
    /// Accept blank input.
    pub allow_blank: bool,
    /// Error dialog title.
    pub error_title: Option<String>,
    /// Error dialog message.
    pub error_message: Option<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region NodeSpecification

/// One node of a declared header tree. Leaf iff `children` is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecHeaderNode {
    /// Identifier used for column resolution.
    pub key: Option<String>,
    /// Display value.
    pub value: EnumCellValue,
    /// Nested headers.
    pub children: Vec<SpecHeaderNode>,
    /// Declared style.
    pub style: Option<EnumStyleRef>,
    /// Title headers only: merge across the full table width.
    pub merge_cell: bool,
    /// Explicit width for the column this header owns (leaves only).
    pub width: Option<f64>,
    /// Height of the row this header is written on.
    pub row_height: Option<f64>,
}

impl SpecHeaderNode {
    pub fn new(value: impl Into<EnumCellValue>) -> Self {
        Self {
            value: value.into(),
            ..Default::default()
        }
    }

    /// Leaf keyed and labelled by the same text.
    pub fn leaf(key: &str) -> Self {
        Self::new(key).with_key(key)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_children(mut self, children: Vec<SpecHeaderNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_style(mut self, style: impl Into<EnumStyleRef>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_merge_cell(mut self, if_merge: bool) -> Self {
        self.merge_cell = if_merge;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Body (or footer) node; `children` are fragments of the same row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDataNode {
    /// Primary column identifier.
    pub key: Option<String>,
    /// Secondary column identifier (header key or display text).
    pub header_ref: Option<String>,
    /// Display value.
    pub value: EnumCellValue,
    /// Hyperlink; replaces the plain value when set.
    pub link: Option<SpecCellLink>,
    /// Same-row sibling fragments.
    pub children: Vec<SpecDataNode>,
    /// Advance the row pointer after this node.
    pub jump: bool,
    /// Declared style.
    pub style: Option<EnumStyleRef>,
    /// Number format applied on top of the style.
    pub num_format: Option<String>,
    /// Cell note.
    pub comment: Option<SpecCellComment>,
    /// Cell list validation.
    pub validation: Option<SpecCellValidation>,
    /// Footers only: merge horizontally up to `merge_to`.
    pub merge_cell: bool,
    /// Footers only: last column (1-based, inclusive) of the merge.
    pub merge_to: Option<usize>,
    /// Height of the row this node is written on.
    pub row_height: Option<f64>,
}

/// Footer rows share the data node record.
pub type SpecFooterNode = SpecDataNode;

impl SpecDataNode {
    pub fn new(key: impl Into<String>, value: impl Into<EnumCellValue>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Node resolved by header reference only.
    pub fn by_header(header_ref: impl Into<String>, value: impl Into<EnumCellValue>) -> Self {
        Self {
            header_ref: Some(header_ref.into()),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_header_ref(mut self, header_ref: impl Into<String>) -> Self {
        self.header_ref = Some(header_ref.into());
        self
    }

    pub fn with_jump(mut self, if_jump: bool) -> Self {
        self.jump = if_jump;
        self
    }

    pub fn with_child(mut self, child: SpecDataNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<SpecDataNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_style(mut self, style: impl Into<EnumStyleRef>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_link(mut self, link: SpecCellLink) -> Self {
        self.link = Some(link);
        self
    }

    pub fn with_num_format(mut self, num_format: impl Into<String>) -> Self {
        self.num_format = Some(num_format.into());
        self
    }

    pub fn with_comment(mut self, comment: SpecCellComment) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn with_validation(mut self, validation: SpecCellValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_merge_to(mut self, col_end: usize) -> Self {
        self.merge_cell = true;
        self.merge_to = Some(col_end);
        self
    }

    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }
}

/// One table on a sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    /// Title rows, one row per entry.
    pub headers: Vec<SpecHeaderNode>,
    /// Nested column header tree.
    pub sub_headers: Vec<SpecHeaderNode>,
    /// Body entries in declaration order.
    pub body: Vec<SpecDataNode>,
    /// Footer entries in declaration order.
    pub footers: Vec<SpecFooterNode>,
    /// Default thin border on unstyled cells.
    pub borders: bool,
    /// Alternate fill on unstyled body/footer rows.
    pub stripes: bool,
    /// Register the occupied rectangle as a filter range.
    pub auto_filter: bool,
    /// Blank rows before the table; `None` means "unless first on the sheet".
    pub add_spacing: Option<bool>,
}

impl SpecTable {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
            && self.sub_headers.is_empty()
            && self.body.is_empty()
            && self.footers.is_empty()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridSpecification

/// Which part of a table produced a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCellRole {
    /// Table title row.
    Title,
    /// Nested sub-header block.
    Header,
    /// Body row.
    Body,
    /// Footer row.
    Footer,
    /// Blank cell created by the border/stripe overlay.
    Decoration,
}

/// One written cell of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCellAssignment {
    /// Value written to the cell.
    pub value: EnumCellValue,
    /// Hyperlink written instead of the plain value.
    pub link: Option<SpecCellLink>,
    /// Explicit style; `None` leaves the cell open for table decoration.
    pub style: Option<SpecCellFormat>,
    /// Number format applied on top of `style`.
    pub num_format: Option<String>,
    /// Cell note.
    pub comment: Option<SpecCellComment>,
    /// Cell list validation.
    pub validation: Option<SpecCellValidation>,
    /// Producing table part.
    pub role: EnumCellRole,
}

impl SpecCellAssignment {
    pub fn new(value: EnumCellValue, style: Option<SpecCellFormat>, role: EnumCellRole) -> Self {
        Self {
            value,
            link: None,
            style,
            num_format: None,
            comment: None,
            validation: None,
            role,
        }
    }

    /// Blank cell, used for merge-covered and alignment cells.
    pub fn blank(style: Option<SpecCellFormat>, role: EnumCellRole) -> Self {
        Self::new(EnumCellValue::None, style, role)
    }

    /// Text the cell shows once written.
    pub fn derive_display_text(&self) -> String {
        match &self.link {
            Some(link) => link.derive_display_text(&self.value),
            None => self.value.to_alias(),
        }
    }
}

/// Inclusive 1-based cell rectangle, used for merges and filter ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellRange {
    pub row_start: usize,
    pub col_start: usize,
    pub row_end: usize,
    pub col_end: usize,
}

/// Merge regions are plain cell rectangles.
pub type SpecMergeRegion = SpecCellRange;

impl SpecCellRange {
    pub fn new(row_start: usize, col_start: usize, row_end: usize, col_end: usize) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_start == self.row_end && self.col_start == self.col_end
    }

    pub fn cell_count(&self) -> usize {
        (self.row_end - self.row_start + 1) * (self.col_end - self.col_start + 1)
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    pub fn overlaps(&self, other: &SpecCellRange) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// Rows and width occupied by one assembled table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTableExtent {
    /// First row of the table (after spacing).
    pub row_start: usize,
    /// Last row written by the table.
    pub row_end: usize,
    /// Columns spanned by the table.
    pub col_count: usize,
}

/// Per-sheet layout report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecLayoutReport {
    /// Tables in assembly order.
    pub tables: Vec<SpecTableExtent>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecLayoutReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

/// Fully assembled sheet: the sparse grid and every sink instruction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetLayout {
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecCellAssignment>,
    /// Merge regions in emission order.
    pub merges: Vec<SpecMergeRegion>,
    /// Explicit row heights.
    pub row_heights: BTreeMap<usize, f64>,
    /// Column widths (explicit or inferred).
    pub column_widths: BTreeMap<usize, f64>,
    /// Filter ranges requested by tables.
    pub filter_ranges: Vec<SpecCellRange>,
    /// First free row after the last table.
    pub row_next: usize,
    /// Assembly diagnostics.
    pub report: SpecLayoutReport,
}

impl SpecSheetLayout {
    pub fn get(&self, row: usize, col: usize) -> Option<&SpecCellAssignment> {
        self.cells.get(&(row, col))
    }

    /// Write a cell, replacing any earlier assignment.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: SpecCellAssignment) {
        self.cells.insert((row, col), cell);
    }

    /// Register a merge. Single cells and overlaps are dropped with a warning.
    pub fn add_merge(&mut self, region: SpecMergeRegion) -> bool {
        if region.is_single_cell() {
            return false;
        }
        if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&region)) {
            let msg = format!("Merge {region:?} overlaps {existing:?}; skipped.");
            log::warn!("{msg}");
            self.report.warn(msg);
            return false;
        }
        self.merges.push(region);
        true
    }

    /// Last row holding any cell.
    pub fn row_last(&self) -> Option<usize> {
        self.cells.keys().next_back().map(|(row, _)| *row)
    }

    /// Values of one row from column 1 to `col_end`, as display text.
    pub fn derive_row_texts(&self, row: usize, col_end: usize) -> Vec<String> {
        (1..=col_end)
            .map(|col| {
                self.get(row, col)
                    .map(SpecCellAssignment::derive_display_text)
                    .unwrap_or_default()
            })
            .collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only (default).
    #[default]
    Header,
    /// Infer width from body and footer cells only.
    Body,
    /// Infer width from every written cell except titles.
    All,
}

/// Column width inference policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Sheet-wide layout options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecLayoutOptions {
    /// Row where the first table starts.
    pub row_start: usize,
    /// Blank rows inserted before a spaced table.
    pub rows_table_spacing: usize,
    /// Column width inference.
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecLayoutOptions {
    fn default() -> Self {
        Self {
            row_start: crate::conf::N_ROW_START_DEFAULT,
            rows_table_spacing: crate::conf::N_ROWS_TABLE_SPACING,
            policy_autofit: SpecAutofitCellsPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
