//! Per-table lookup from header identifiers to 1-based column numbers.

use std::collections::BTreeMap;

use crate::spec::SpecHeaderNode;

/// Alias -> column lookup built from a table's sub-header tree.
///
/// Only one level of children is flattened: a header with children owns one
/// column per direct child, deeper descendants get no column of their own.
/// When two nodes share an alias the later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnIndex {
    dict_col_by_alias: BTreeMap<String, usize>,
    n_cols: usize,
}

impl ColumnIndex {
    pub fn build(sub_headers: &[SpecHeaderNode]) -> Self {
        let mut index = Self::default();
        for header in sub_headers {
            if header.is_leaf() {
                index.register(header);
            } else {
                for child in &header.children {
                    index.register(child);
                }
            }
        }
        index
    }

    fn register(&mut self, node: &SpecHeaderNode) {
        self.n_cols += 1;
        if let Some(key) = &node.key {
            self.dict_col_by_alias.insert(key.clone(), self.n_cols);
        }
        let c_alias = node.value.to_alias();
        if !c_alias.is_empty() {
            self.dict_col_by_alias.insert(c_alias, self.n_cols);
        }
    }

    pub fn get(&self, alias: &str) -> Option<usize> {
        self.dict_col_by_alias.get(alias).copied()
    }

    /// Resolve by `key` first, then by `header_ref`.
    pub fn resolve(&self, key: Option<&str>, header_ref: Option<&str>) -> Option<usize> {
        key.and_then(|c_key| self.get(c_key))
            .or_else(|| header_ref.and_then(|c_ref| self.get(c_ref)))
    }

    /// Number of allocated columns.
    pub fn len(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.n_cols == 0
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dict_col_by_alias
            .iter()
            .map(|(c_alias, n_col)| (c_alias.as_str(), *n_col))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn test_childless_headers_get_sequential_columns() {
        let index = ColumnIndex::build(&[SpecHeaderNode::leaf("A"), SpecHeaderNode::leaf("B")]);
        assert_eq!(index.get("A"), Some(1));
        assert_eq!(index.get("B"), Some(2));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_key_and_display_value_alias_the_same_column() {
        let index = ColumnIndex::build(&[
            SpecHeaderNode::new("Customer name").with_key("name"),
            SpecHeaderNode::new(2024),
        ]);
        assert_eq!(index.get("name"), Some(1));
        assert_eq!(index.get("Customer name"), Some(1));
        assert_eq!(index.get("2024"), Some(2));
    }

    #[test]
    fn test_repeated_display_values_last_wins() {
        let index = ColumnIndex::build(&[
            SpecHeaderNode::new("Ventas")
                .with_children(vec![SpecHeaderNode::new("Q1"), SpecHeaderNode::new("Q2")]),
            SpecHeaderNode::new("Gastos")
                .with_children(vec![SpecHeaderNode::new("Q1"), SpecHeaderNode::new("Q2")]),
        ]);
        assert_eq!(index.get("Q1"), Some(3));
        assert_eq!(index.get("Q2"), Some(4));
        assert_eq!(index.get("Ventas"), None);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn test_only_direct_children_are_flattened() {
        let index = ColumnIndex::build(&[SpecHeaderNode::new("Root").with_children(vec![
            SpecHeaderNode::leaf("Mid").with_children(vec![
                SpecHeaderNode::leaf("Deep1"),
                SpecHeaderNode::leaf("Deep2"),
            ]),
            SpecHeaderNode::leaf("Side"),
        ])]);
        assert_eq!(index.get("Mid"), Some(1));
        assert_eq!(index.get("Side"), Some(2));
        assert_eq!(index.get("Deep1"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_columns_are_contiguous_without_gaps() {
        let index = ColumnIndex::build(&[
            SpecHeaderNode::leaf("A"),
            SpecHeaderNode::new("G")
                .with_children(vec![SpecHeaderNode::leaf("B"), SpecHeaderNode::leaf("C")]),
            SpecHeaderNode::leaf("D"),
        ]);
        let set_cols: BTreeSet<usize> = index.aliases().map(|(_, n_col)| n_col).collect();
        assert_eq!(set_cols, (1..=index.len()).collect());
    }

    #[test]
    fn test_resolve_prefers_key_then_header_ref() {
        let index = ColumnIndex::build(&[SpecHeaderNode::leaf("A"), SpecHeaderNode::leaf("B")]);
        assert_eq!(index.resolve(Some("B"), Some("A")), Some(2));
        assert_eq!(index.resolve(Some("missing"), Some("A")), Some(1));
        assert_eq!(index.resolve(None, None), None);
    }
}
