//! Named style presets handed explicitly to the assembler.

use std::collections::BTreeMap;

use crate::conf::{C_STYLE_BORDER, C_STYLE_STRIPE};
use crate::spec::{EnumStyleRef, SpecCellFormat, SpecLayoutReport};

/// Named style presets resolved during layout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeContext {
    dict_styles: BTreeMap<String, SpecCellFormat>,
}

impl ThemeContext {
    /// Empty theme: every named reference is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, name: impl Into<String>, fmt: SpecCellFormat) -> Self {
        self.insert(name, fmt);
        self
    }

    /// Register or replace a preset.
    pub fn insert(&mut self, name: impl Into<String>, fmt: SpecCellFormat) {
        self.dict_styles.insert(name.into(), fmt);
    }

    pub fn get(&self, name: &str) -> Option<&SpecCellFormat> {
        self.dict_styles.get(name)
    }

    /// Resolve a declared style. Unknown names warn and resolve to nothing.
    pub fn resolve(
        &self,
        style: &EnumStyleRef,
        report: &mut SpecLayoutReport,
    ) -> Option<SpecCellFormat> {
        match style {
            EnumStyleRef::Inline(fmt) => Some(fmt.clone()),
            EnumStyleRef::Named(name) => {
                let fmt = self.get(name).cloned();
                if fmt.is_none() {
                    let msg = format!("Unknown style {name:?}; cell left unstyled.");
                    log::warn!("{msg}");
                    report.warn(msg);
                }
                fmt
            }
        }
    }

    /// Resolve an optional declared style, falling back to preset `default`.
    pub fn resolve_or(
        &self,
        style: Option<&EnumStyleRef>,
        default: &str,
        report: &mut SpecLayoutReport,
    ) -> Option<SpecCellFormat> {
        match style {
            Some(style) => self.resolve(style, report),
            None => self.get(default).cloned(),
        }
    }

    /// Overlay format for the table border/stripe sweep.
    pub fn decoration(&self, if_borders: bool, if_stripe_row: bool) -> Option<SpecCellFormat> {
        let fmt_border = self.get(C_STYLE_BORDER).filter(|_| if_borders);
        let fmt_stripe = self.get(C_STYLE_STRIPE).filter(|_| if_stripe_row);
        match (fmt_border, fmt_stripe) {
            (Some(border), Some(stripe)) => Some(border.merge(stripe)),
            (Some(border), None) => Some(border.clone()),
            (None, Some(stripe)) => Some(stripe.clone()),
            (None, None) => None,
        }
    }
}
