use anyhow::Result;
use serde_json::json;
use sheetdelta::common::{CellValue, ColumnDef, DataKind, FormatSettings, TableSchema};
use sheetdelta::{BaseData, DataProvider, GeneratedData, ProviderError, RowView, SortOrder, VecData};

fn load_schema() -> TableSchema {
    let text = std::fs::read_to_string("tests/fixtures/orders.yaml").expect("fixture");
    TableSchema::load_yaml(&text).expect("fixture schema validates")
}

fn orders(rows: usize) -> DataProvider<VecData> {
    let base = VecData::from_rows((0..rows).map(|i| {
        vec![
            CellValue::from(format!("Customer {i}")),
            CellValue::from(i as f64 * 10.0),
            CellValue::from("open"),
            CellValue::from("5551234567"),
            CellValue::from(i % 2 == 0),
        ]
    }));
    DataProvider::from_schema(base, &load_schema()).expect("provider")
}

#[test]
fn delete_append_edit_scenario() -> Result<()> {
    let amounts = vec![ColumnDef::new("amount", DataKind::Number)];
    let base = GeneratedData::new(10, |_, row| CellValue::from(row as f64));
    let mut p = DataProvider::new(base, amounts)?;

    assert!(p.delete_row(3));
    p.append_row();
    p.set_cell(0, 3, 250.0)?;

    assert_eq!(p.num_rows(), 10);
    assert_eq!(p.original_row_index(3), Some(4));
    assert_eq!(p.cell_by_id("amount", 3).unwrap().value, CellValue::Number(250.0));
    assert_eq!(p.save_state()["edited_rows"], json!({ "4": { "amount": 250 } }));
    Ok(())
}

#[test]
fn incomplete_appended_row_is_not_saved() -> Result<()> {
    let cols = vec![
        ColumnDef::new("name", DataKind::Text).required(),
        ColumnDef::new("amount", DataKind::Number),
    ];
    let mut p = DataProvider::new(VecData::default(), cols)?;
    let v = p.append_row();
    p.set_cell(1, v, 5.0)?;
    assert!(p.cell(0, v).unwrap().missing);

    assert_eq!(p.save_state()["added_rows"], json!([]));

    p.set_cell(0, v, "Ada")?;
    assert_eq!(
        p.save_state()["added_rows"],
        json!([{ "name": "Ada", "amount": 5 }])
    );
    Ok(())
}

#[test]
fn display_follows_current_format() -> Result<()> {
    let cols = vec![ColumnDef::new("rate", DataKind::Number).with_format("percent")];
    let mut p = DataProvider::new(VecData::from_rows([[0.1]]), cols)?;
    p.set_cell(0, 0, 0.5)?;
    assert_eq!(p.cell(0, 0).unwrap().display, "50%");

    p.set_column_format(0, Some("plain"))?;
    assert_eq!(p.cell(0, 0).unwrap().display, "0.5");

    p.set_column_format(0, Some("currency"))?;
    p.set_format_settings(FormatSettings::default().with_locale("de-DE").with_currency("EUR"));
    assert_eq!(p.cell(0, 0).unwrap().display, "0,50 €");
    Ok(())
}

#[test]
fn rejected_edit_leaves_cell_intact() {
    let mut p = orders(3);
    let before = p.cell_by_id("amount", 1).unwrap();

    let err = p.set_cell_by_id("amount", 1, -5.0).unwrap_err();
    assert_eq!(err.rejection(), Some("Amount cannot be negative"));
    assert_eq!(p.cell_by_id("amount", 1).unwrap(), before);

    let err = p.set_cell_by_id("status", 1, "lost").unwrap_err();
    assert!(matches!(err, ProviderError::Rejected { ref column, row: 1, .. } if column == "status"));
    assert!(!p.overlay().has_changes());
}

#[test]
fn auto_correction_is_stored() -> Result<()> {
    let mut p = orders(2);
    assert_eq!(p.set_cell_by_id("name", 0, "ada LOVELACE")?.display, "Ada Lovelace");
    assert_eq!(p.set_cell_by_id("status", 0, "SHIPPED")?.value, CellValue::from("shipped"));
    assert_eq!(p.set_cell_by_id("paid", 0, "yes")?.display, "Yes");
    Ok(())
}

#[test]
fn delete_purges_edits() -> Result<()> {
    let mut p = orders(4);
    p.set_cell_by_id("amount", 1, 7.0)?;
    assert!(p.delete_row(1));
    // visible 1 is now original 2, which shows its base value
    assert_eq!(p.cell_by_id("amount", 1).unwrap().value, CellValue::Number(20.0));
    assert_eq!(p.overlay().edited_cell_count(), 0);
    assert_eq!(p.save_state()["edited_rows"], json!({}));
    Ok(())
}

#[test]
fn appended_rows_take_defaults_and_values() -> Result<()> {
    let mut p = orders(1);
    let v = p.append_row_with([("name", "grace hopper"), ("amount", "$12.50")])?;
    let row = p.row_values(v).unwrap();
    assert_eq!(row[0], CellValue::from("Grace Hopper"));
    assert_eq!(row[1], CellValue::Number(12.5));
    assert_eq!(row[2], CellValue::from("open"));
    assert_eq!(row[4], CellValue::Boolean(false));

    let rows_before = p.num_rows();
    let err = p.append_row_with([("name", "x")]).unwrap_err();
    assert!(err.rejection().is_some());
    assert_eq!(p.num_rows(), rows_before);
    assert!(matches!(
        p.append_row_with([("nope", "x")]),
        Err(ProviderError::UnknownColumnId { .. })
    ));
    Ok(())
}

#[test]
fn save_restore_round_trip() -> Result<()> {
    let mut p = orders(6);
    p.delete_rows(&[0, 4]);
    p.set_cell_by_id("phone", 0, "(555) 000-1111")?;
    p.set_cell_by_id("paid", 2, false)?;
    p.append_row_with([("name", "Ada")])?;
    let saved = p.save_state_string();

    let mut q = orders(6);
    let report = q.restore_state(&saved)?;
    assert!(report.skipped.is_empty());
    assert_eq!(q.num_rows(), p.num_rows());
    for v in 0..p.num_rows() {
        assert_eq!(q.row_values(v), p.row_values(v), "row {v}");
    }
    assert_eq!(q.save_state(), p.save_state());
    Ok(())
}

#[test]
fn restore_fixture_and_reload() -> Result<()> {
    let mut p = orders(5);
    let blob = std::fs::read_to_string("tests/fixtures/orders_state.json")?;
    let report = p.restore_state(&blob)?;

    assert_eq!(report.deleted_rows, 1);
    assert_eq!(report.edited_cells, 2);
    assert_eq!(report.added_rows, 2);
    assert_eq!(report.skipped, vec!["unknown column id `discount`".to_string()]);
    assert_eq!(p.cell_by_id("amount", 1).unwrap().display, "$99.50");
    // original 4 is visible 3 after deleting original 2
    assert_eq!(p.cell_by_id("status", 3).unwrap().value, CellValue::from("shipped"));
    // the incomplete row was restored but is dropped on save
    assert_eq!(p.num_rows(), 6);
    assert_eq!(p.save_state()["added_rows"].as_array().map(Vec::len), Some(1));

    let old = p.reload(VecData::from_rows([[CellValue::from("x")]]));
    assert_eq!(old.row_count(), 5);
    assert_eq!(p.num_rows(), 1);
    assert!(!p.overlay().has_changes());
    Ok(())
}

#[test]
fn malformed_state_resets_to_no_edits() {
    let mut p = orders(3);
    p.delete_row(0);
    assert!(matches!(p.restore_state("[1, 2"), Err(ProviderError::Persist(_))));
    assert_eq!(p.num_rows(), 3);
    assert!(!p.overlay().has_changes());
}

#[test]
fn sorted_view_over_edits() -> Result<()> {
    let mut p = orders(4);
    p.set_cell_by_id("amount", 0, 1000.0)?;
    let view = RowView::sorted(&p, 1, SortOrder::Descending);
    assert_eq!(view.rows(), &[0, 3, 2, 1]);
    let top = view.to_visible(0).unwrap();
    assert_eq!(p.cell(1, top).unwrap().display, "$1,000.00");
    Ok(())
}

#[test]
fn typed_numbers_follow_the_session_locale() -> Result<()> {
    let cols = vec![ColumnDef::new("amount", DataKind::Number)];
    let mut p = DataProvider::new(VecData::from_rows([[1.0]]), cols)?
        .with_settings(FormatSettings::default().with_locale("de-DE"));

    assert_eq!(p.set_cell(0, 0, "1,5")?.value, CellValue::Number(1.5));
    let shown = p.set_cell(0, 0, "1.234,5")?.display;
    assert_eq!(shown, "1.234,5");
    assert_eq!(p.set_cell(0, 0, shown.as_str())?.value, CellValue::Number(1234.5));

    p.set_format_settings(FormatSettings::default());
    let err = p.set_cell(0, 0, "1,5").unwrap_err();
    assert!(err.rejection().is_some());
    assert_eq!(p.cell(0, 0).unwrap().value, CellValue::Number(1234.5));
    Ok(())
}
