use gridspec_layout::{
    EnumCellValue, SpecCellComment, SpecCellLink, SpecCellValidation, SpecDataNode, SpecHeaderNode,
    SpecLayoutOptions, WorkbookBuilder, derive_default_theme,
};
use gridspec_xlsx::{Error, XlsxWriter};
use polars::prelude::*;
use pretty_assertions::assert_eq;

fn derive_quarters(name: &str) -> SpecHeaderNode {
    SpecHeaderNode::new(name)
        .with_children(vec![SpecHeaderNode::new("Q1"), SpecHeaderNode::new("Q2")])
}

fn derive_workbook() -> WorkbookBuilder {
    let mut workbook = WorkbookBuilder::new();

    let sheet = workbook.add_sheet("Ventas/2024").unwrap();
    sheet
        .add_header(SpecHeaderNode::new("Resumen anual").with_merge_cell(true))
        .add_sub_header(SpecHeaderNode::leaf("Id"))
        .add_sub_header(derive_quarters("Ventas"))
        .add_sub_header(derive_quarters("Gastos"))
        .add_data_row(
            SpecDataNode::new("Id", 1)
                .with_child(SpecDataNode::by_header("Q1", 10.5))
                .with_child(
                    SpecDataNode::by_header("Q2", f64::INFINITY).with_num_format("0.00"),
                )
                .with_jump(true),
        )
        .add_data_row(
            SpecDataNode::new("Id", EnumCellValue::None)
                .with_link(SpecCellLink::new("https://example.org").with_mask("site"))
                .with_comment(SpecCellComment::new("checked"))
                .with_jump(true),
        )
        .add_footer_row(SpecDataNode::new("Id", "Total").with_merge_to(3).with_jump(true))
        .set_borders(true)
        .set_stripes(true)
        .set_auto_filter(true);

    let sheet = workbook.add_sheet("Estado").unwrap();
    sheet
        .add_sub_header(SpecHeaderNode::leaf("Estado"))
        .add_data_row(
            SpecDataNode::new("Estado", "abierto")
                .with_validation(SpecCellValidation {
                    values: vec!["abierto".to_string(), "cerrado".to_string()],
                    error_title: Some("Estado".to_string()),
                    ..Default::default()
                })
                .with_jump(true),
        )
        .set_auto_filter(true);
    sheet.finalize_table().unwrap();
    sheet
        .add_sub_header(SpecHeaderNode::leaf("Nota"))
        .add_data_row(SpecDataNode::new("Nota", true).with_jump(true))
        .set_auto_filter(true);
    sheet.finalize_table().unwrap();

    workbook
}

#[test]
fn test_workbook_is_written_to_disk_with_reports() {
    let dir = tempfile::tempdir().unwrap();
    let path_file_out = dir.path().join("report.xlsx");

    let mut writer = XlsxWriter::new(&path_file_out);
    let l_layout_reports = writer
        .write_workbook(
            &derive_workbook(),
            &derive_default_theme(),
            &SpecLayoutOptions::default(),
        )
        .unwrap();
    writer.close().unwrap();

    assert!(path_file_out.exists());
    assert_eq!(l_layout_reports.len(), 2);

    let l_reports = writer.report();
    assert_eq!(l_reports[0].sheet_name, "Ventas_2024");
    assert_eq!(l_reports[0].sheet_name_requested, "Ventas/2024");
    assert_eq!(l_reports[1].tables.len(), 2);
    assert!(
        l_reports[1]
            .warnings
            .iter()
            .any(|msg| msg.contains("Filter range"))
    );
}

#[test]
fn test_workbook_buffer_is_a_zip_container() {
    let mut writer = XlsxWriter::new("unused.xlsx");
    writer
        .write_workbook(
            &derive_workbook(),
            &derive_default_theme(),
            &SpecLayoutOptions::default(),
        )
        .unwrap();
    let v_buffer = writer.save_to_buffer().unwrap();
    assert!(v_buffer.starts_with(b"PK"));
}

#[test]
fn test_empty_sheet_surfaces_layout_error() {
    let mut workbook = WorkbookBuilder::new();
    workbook.add_sheet("Empty").unwrap();

    let mut writer = XlsxWriter::new("unused.xlsx");
    let result = writer.write_workbook(
        &workbook,
        &derive_default_theme(),
        &SpecLayoutOptions::default(),
    );
    assert!(matches!(
        result,
        Err(Error::Layout(gridspec_layout::Error::EmptySheet(_)))
    ));
}

#[test]
fn test_dataframe_sheet_round_trips_through_ipc() {
    let mut df = df!(
        "city" => ["Lima", "Quito"],
        "pop" => [9.7f64, 2.8],
    )
    .unwrap();
    let mut v_ipc_df: Vec<u8> = Vec::new();
    IpcWriter::new(&mut v_ipc_df).finish(&mut df).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut writer = XlsxWriter::new(dir.path().join("frame.xlsx"));
    let c_name = writer
        .write_sheet_from_ipc_bytes(
            "Cities",
            &v_ipc_df,
            &derive_default_theme(),
            &SpecLayoutOptions::default(),
        )
        .unwrap();
    writer.close().unwrap();

    assert_eq!(c_name, "Cities");
    assert_eq!(writer.report()[0].tables[0].row_end, 3);
}
