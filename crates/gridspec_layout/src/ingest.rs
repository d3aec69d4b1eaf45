//! JSON ingestion of table declarations.
//!
//! External declarations may carry nested nodes under the legacy `childrens`
//! array, the modern `children` array, or both. They are collapsed here so
//! the layout engine only ever sees `children`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::spec::{
    EnumCellValue, EnumStyleRef, SpecCellComment, SpecCellFormat, SpecCellLink, SpecCellValidation,
    SpecDataNode, SpecHeaderNode, SpecTable,
};

////////////////////////////////////////////////////////////////////////////////
// #region RawModels

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStyleRef {
    Named(String),
    Inline(SpecCellFormat),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawComment {
    Text(String),
    Full { text: String, author: Option<String> },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawLink {
    url: String,
    mask: Option<String>,
    tooltip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHeaderNode {
    key: Option<String>,
    #[serde(alias = "displayValue")]
    value: Value,
    children: Vec<RawHeaderNode>,
    childrens: Vec<RawHeaderNode>,
    style: Option<RawStyleRef>,
    merge_cell: bool,
    width: Option<f64>,
    row_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDataNode {
    key: Option<String>,
    #[serde(alias = "header")]
    header_ref: Option<String>,
    #[serde(alias = "displayValue")]
    value: Value,
    link: Option<RawLink>,
    children: Vec<RawDataNode>,
    childrens: Vec<RawDataNode>,
    jump: bool,
    style: Option<RawStyleRef>,
    #[serde(alias = "numberFormat")]
    num_format: Option<String>,
    comment: Option<RawComment>,
    validation: Option<SpecCellValidation>,
    merge_cell: bool,
    merge_to: Option<usize>,
    row_height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTable {
    headers: Vec<RawHeaderNode>,
    sub_headers: Vec<RawHeaderNode>,
    body: Vec<RawDataNode>,
    #[serde(alias = "footer")]
    footers: Vec<RawDataNode>,
    borders: bool,
    stripes: bool,
    auto_filter: bool,
    add_spacing: Option<bool>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Conversion

impl From<RawStyleRef> for EnumStyleRef {
    fn from(raw: RawStyleRef) -> Self {
        match raw {
            RawStyleRef::Named(name) => EnumStyleRef::Named(name),
            RawStyleRef::Inline(fmt) => EnumStyleRef::Inline(fmt),
        }
    }
}

impl From<RawComment> for SpecCellComment {
    fn from(raw: RawComment) -> Self {
        match raw {
            RawComment::Text(text) => SpecCellComment { text, author: None },
            RawComment::Full { text, author } => SpecCellComment { text, author },
        }
    }
}

impl From<RawLink> for SpecCellLink {
    fn from(raw: RawLink) -> Self {
        SpecCellLink {
            url: raw.url,
            mask: raw.mask,
            tooltip: raw.tooltip,
        }
    }
}

impl From<RawHeaderNode> for SpecHeaderNode {
    fn from(raw: RawHeaderNode) -> Self {
        let children = collapse_children(raw.children, raw.childrens, raw.key.as_deref());
        SpecHeaderNode {
            key: raw.key,
            value: convert_json_value(raw.value),
            children: children.into_iter().map(SpecHeaderNode::from).collect(),
            style: raw.style.map(EnumStyleRef::from),
            merge_cell: raw.merge_cell,
            width: raw.width,
            row_height: raw.row_height,
        }
    }
}

impl From<RawDataNode> for SpecDataNode {
    fn from(raw: RawDataNode) -> Self {
        let children = collapse_children(raw.children, raw.childrens, raw.key.as_deref());
        SpecDataNode {
            key: raw.key,
            header_ref: raw.header_ref,
            value: convert_json_value(raw.value),
            link: raw.link.map(SpecCellLink::from),
            children: children.into_iter().map(SpecDataNode::from).collect(),
            jump: raw.jump,
            style: raw.style.map(EnumStyleRef::from),
            num_format: raw.num_format,
            comment: raw.comment.map(SpecCellComment::from),
            validation: raw.validation,
            merge_cell: raw.merge_cell,
            merge_to: raw.merge_to,
            row_height: raw.row_height,
        }
    }
}

impl From<RawTable> for SpecTable {
    fn from(raw: RawTable) -> Self {
        SpecTable {
            headers: raw.headers.into_iter().map(SpecHeaderNode::from).collect(),
            sub_headers: raw.sub_headers.into_iter().map(SpecHeaderNode::from).collect(),
            body: raw.body.into_iter().map(SpecDataNode::from).collect(),
            footers: raw.footers.into_iter().map(SpecDataNode::from).collect(),
            borders: raw.borders,
            stripes: raw.stripes,
            auto_filter: raw.auto_filter,
            add_spacing: raw.add_spacing,
        }
    }
}

/// Pick one children list: `children` when non-empty, else `childrens`.
fn collapse_children<T>(children: Vec<T>, childrens: Vec<T>, key: Option<&str>) -> Vec<T> {
    match (children.is_empty(), childrens.is_empty()) {
        (true, _) => childrens,
        (false, true) => children,
        (false, false) => {
            log::warn!(
                "Node key={key:?} declares both `children` and `childrens`; keeping `children`."
            );
            children
        }
    }
}

/// Map a JSON scalar to a cell value; arrays/objects are stringified.
pub fn convert_json_value(value: Value) -> EnumCellValue {
    match value {
        Value::Null => EnumCellValue::None,
        Value::Bool(val) => EnumCellValue::Boolean(val),
        Value::Number(val) => match val.as_f64() {
            Some(n_val) => EnumCellValue::Number(n_val),
            None => EnumCellValue::String(val.to_string()),
        },
        Value::String(val) => EnumCellValue::String(val),
        other => EnumCellValue::String(other.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Parsing

/// Parse one table declaration.
pub fn parse_table_json(text: &str) -> Result<SpecTable> {
    let raw: RawTable = serde_json::from_str(text)?;
    Ok(raw.into())
}

/// Parse an array of table declarations.
pub fn parse_tables_json(text: &str) -> Result<Vec<SpecTable>> {
    let l_raw: Vec<RawTable> = serde_json::from_str(text)?;
    Ok(l_raw.into_iter().map(SpecTable::from).collect())
}

/// Parse a header tree (array of header nodes).
pub fn parse_headers_json(text: &str) -> Result<Vec<SpecHeaderNode>> {
    let l_raw: Vec<RawHeaderNode> = serde_json::from_str(text)?;
    Ok(l_raw.into_iter().map(SpecHeaderNode::from).collect())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_legacy_childrens_collapse_into_children() {
        let l_headers = parse_headers_json(
            r#"[{"value": "Ventas", "childrens": [{"value": "Q1"}, {"value": "Q2"}]}]"#,
        )
        .unwrap();
        assert_eq!(l_headers[0].children.len(), 2);
        assert_eq!(l_headers[0].children[1].value, EnumCellValue::from("Q2"));
    }

    #[test]
    fn test_modern_children_win_over_legacy() {
        let l_headers = parse_headers_json(
            r#"[{"value": "G", "children": [{"value": "new"}], "childrens": [{"value": "old"}]}]"#,
        )
        .unwrap();
        assert_eq!(l_headers[0].children.len(), 1);
        assert_eq!(l_headers[0].children[0].value, EnumCellValue::from("new"));
    }

    #[test]
    fn test_table_fields_and_scalars_are_mapped() {
        let table = parse_table_json(
            r##"{
                "subHeaders": [{"key": "a", "displayValue": "A"}, {"key": "b", "value": 2024}],
                "body": [
                    {"key": "a", "value": 1.5, "style": "header"},
                    {"header": "b", "value": true, "jump": true,
                     "link": {"url": "https://example.org", "mask": "site"},
                     "comment": "checked", "numberFormat": "0.0",
                     "style": {"bold": true, "bg_color": "#FFFF00"}}
                ],
                "footer": [{"key": "a", "value": "Total", "mergeCell": true, "mergeTo": 2}],
                "borders": true,
                "autoFilter": true,
                "addSpacing": false
            }"##,
        )
        .unwrap();

        assert_eq!(table.sub_headers[1].value, EnumCellValue::Number(2024.0));
        assert_eq!(table.body[0].style, Some(EnumStyleRef::from("header")));
        assert_eq!(table.body[1].header_ref.as_deref(), Some("b"));
        assert_eq!(table.body[1].value, EnumCellValue::Boolean(true));
        assert_eq!(table.body[1].comment, Some(SpecCellComment::new("checked")));
        assert_eq!(table.body[1].num_format.as_deref(), Some("0.0"));
        assert!(matches!(
            &table.body[1].style,
            Some(EnumStyleRef::Inline(fmt)) if fmt.bold == Some(true)
        ));
        assert_eq!(table.footers[0].merge_to, Some(2));
        assert!(table.borders && table.auto_filter && !table.stripes);
        assert_eq!(table.add_spacing, Some(false));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(parse_table_json("{\"body\": 3}").is_err());
    }

    #[test]
    fn test_json_null_and_nested_values() {
        assert_eq!(convert_json_value(Value::Null), EnumCellValue::None);
        assert_eq!(
            convert_json_value(serde_json::json!([1, 2])),
            EnumCellValue::String("[1,2]".to_string())
        );
    }
}
