//! Polars DataFrame ingestion into sheet declarations.

use std::io::Cursor;

use gridspec_layout::{EnumCellValue, SheetBuilder, SpecDataNode, SpecHeaderNode, SpecTable};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};

use crate::error::Result;
use crate::util::validate_unique_columns;

/// Decode a Polars IPC payload.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    Ok(IpcReader::new(Cursor::new(v_ipc_df)).finish()?)
}

/// One leaf sub-header per column and one body row per DataFrame row.
///
/// Each row is a node for the first column carrying the remaining cells as
/// same-row children, with `jump` set.
pub fn derive_table_from_dataframe(df: &DataFrame) -> Result<SpecTable> {
    let l_colnames_df: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    validate_unique_columns(&l_colnames_df)?;

    let mut table = SpecTable {
        sub_headers: l_colnames_df
            .iter()
            .map(|c_name| SpecHeaderNode::leaf(c_name))
            .collect(),
        ..Default::default()
    };
    if l_colnames_df.is_empty() {
        return Ok(table);
    }

    let l_cols = df.get_columns();
    for n_idx_row in 0..df.height() {
        let mut l_nodes = Vec::with_capacity(l_cols.len());
        for (c_name, col) in l_colnames_df.iter().zip(l_cols) {
            let value = derive_cell_value_from_any_value(col.get(n_idx_row)?);
            l_nodes.push(SpecDataNode::new(c_name.as_str(), value));
        }
        let mut iter_nodes = l_nodes.into_iter();
        if let Some(node_first) = iter_nodes.next() {
            let l_children: Vec<SpecDataNode> = iter_nodes.collect();
            table
                .body
                .push(node_first.with_children(l_children).with_jump(true));
        }
    }

    log::debug!(
        "DataFrame table: columns={} rows={}",
        l_colnames_df.len(),
        table.body.len()
    );
    Ok(table)
}

/// Stage a DataFrame as the single table of a new sheet.
pub fn derive_sheet_from_dataframe(name: &str, df: &DataFrame) -> Result<SheetBuilder> {
    let table = derive_table_from_dataframe(df)?;
    let mut sheet = SheetBuilder::new(name);
    for header in table.sub_headers {
        sheet.add_sub_header(header);
    }
    for node in table.body {
        sheet.add_data_row(node);
    }
    Ok(sheet)
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    use super::*;

    fn derive_sample_df() -> DataFrame {
        df!(
            "name" => ["a", "b"],
            "qty" => [1i64, 2],
            "ok" => [true, false],
        )
        .unwrap()
    }

    #[test]
    fn test_dataframe_rows_become_jumping_nodes_with_children() {
        let table = derive_table_from_dataframe(&derive_sample_df()).unwrap();

        assert_eq!(table.sub_headers.len(), 3);
        assert_eq!(table.sub_headers[1].key.as_deref(), Some("qty"));
        assert_eq!(table.body.len(), 2);

        let row = &table.body[1];
        assert!(row.jump);
        assert_eq!(row.key.as_deref(), Some("name"));
        assert_eq!(row.value, EnumCellValue::from("b"));
        assert_eq!(row.children[0].value, EnumCellValue::Number(2.0));
        assert_eq!(row.children[1].value, EnumCellValue::Boolean(false));
    }

    #[test]
    fn test_ipc_payload_round_trips_into_table() {
        let mut df = derive_sample_df();
        let mut v_ipc_df: Vec<u8> = Vec::new();
        IpcWriter::new(&mut v_ipc_df).finish(&mut df).unwrap();

        let df_read = derive_dataframe_from_ipc_bytes(&v_ipc_df).unwrap();
        assert_eq!(df_read.shape(), (2, 3));
        assert_eq!(derive_table_from_dataframe(&df_read).unwrap().body.len(), 2);
    }

    #[test]
    fn test_sheet_from_dataframe_lays_out_header_then_rows() {
        let sheet = derive_sheet_from_dataframe("Data", &derive_sample_df()).unwrap();
        let layout = sheet
            .build(
                &gridspec_layout::derive_default_theme(),
                &gridspec_layout::SpecLayoutOptions::default(),
            )
            .unwrap();
        assert_eq!(layout.derive_row_texts(1, 3), vec!["name", "qty", "ok"]);
        assert_eq!(layout.derive_row_texts(3, 3), vec!["b", "2", "false"]);
        assert_eq!(layout.row_next, 4);
    }

    #[test]
    fn test_garbage_ipc_bytes_are_rejected() {
        assert!(derive_dataframe_from_ipc_bytes(b"not ipc").is_err());
    }
}
