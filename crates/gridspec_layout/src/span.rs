//! Column span and depth of declared header trees.

use crate::spec::SpecHeaderNode;

/// Columns reserved by `node`: 1 for a leaf, else the sum over its children.
pub fn calculate_col_span(node: &SpecHeaderNode) -> usize {
    if node.is_leaf() {
        return 1;
    }
    node.children.iter().map(calculate_col_span).sum()
}

/// Header rows needed to render `nodes`; 1 when no node has children.
pub fn calculate_max_depth(nodes: &[SpecHeaderNode]) -> usize {
    nodes
        .iter()
        .filter(|node| !node.is_leaf())
        .map(|node| 1 + calculate_max_depth(&node.children))
        .max()
        .unwrap_or(1)
}

/// Columns used by a whole header block.
pub fn calculate_total_span(nodes: &[SpecHeaderNode]) -> usize {
    nodes.iter().map(calculate_col_span).sum()
}
