use chrono::NaiveDate;
use proptest::prelude::*;
use sheetdelta_common::{CellValue, ColumnDef, DataKind, FormatSettings};
use sheetdelta_types::{ColumnTypes, registry};

fn number_col(format: &str) -> ColumnDef {
    ColumnDef::new("amount", DataKind::Number).with_format(format)
}

#[test]
fn changing_format_rerenders_without_touching_value() {
    let types = ColumnTypes::builtin();
    let ty = types.get(DataKind::Number).expect("number type");
    let settings = FormatSettings::default();

    let cell = ty.create_cell(&CellValue::Number(0.5), &number_col("percent"), &settings);
    assert_eq!(cell.display, "50%");

    let refreshed = ty.refresh_cell(&cell, &number_col("plain"), &settings);
    assert_eq!(refreshed.display, "0.5");
    assert_eq!(refreshed.value, cell.value);
}

#[test]
fn global_registry_serves_builtins() {
    sheetdelta_types::ensure_builtins_loaded();
    for kind in DataKind::ALL {
        let ty = registry::get(kind).expect("builtin registered");
        assert_eq!(ty.kind(), kind);
    }
    assert_eq!(registry::snapshot().iter().count(), DataKind::COUNT);
}

#[test]
fn default_values_are_parsed_by_the_column_type() {
    let types = ColumnTypes::builtin();
    let yaml = r#"
columns:
  - id: due
    kind: date
    default: { value: "2024-02-01" }
  - id: qty
    kind: number
    default: { value: 3 }
"#;
    let schema = sheetdelta_common::TableSchema::load_yaml(yaml).expect("schema");
    let due = &schema.columns[0];
    let qty = &schema.columns[1];
    assert_eq!(
        types.get(DataKind::Date).unwrap().default_value(due),
        CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
    );
    assert_eq!(
        types.get(DataKind::Number).unwrap().default_value(qty),
        CellValue::Number(3.0)
    );
}

fn format_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("localized"),
        Just("plain"),
        Just("integer"),
        Just("percent"),
        Just("currency"),
        Just("scientific"),
        Just("%.3f"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn number_formatting_is_deterministic(n in -1.0e12f64..1.0e12, format in format_strategy()) {
        let types = ColumnTypes::builtin();
        let ty = types.get(DataKind::Number).unwrap();
        let col = number_col(format);
        let settings = FormatSettings::default().with_locale("de-DE");
        let a = ty.format_value(&CellValue::Number(n), &col, &settings);
        let b = ty.format_value(&CellValue::Number(n), &col, &settings);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn plain_numbers_parse_back(n in -1.0e9f64..1.0e9) {
        let types = ColumnTypes::builtin();
        let ty = types.get(DataKind::Number).unwrap();
        let col = number_col("plain");
        let shown = ty.format_value(&CellValue::Number(n), &col, &FormatSettings::default());
        prop_assert_eq!(ty.parse_value(&CellValue::Text(shown), &col), CellValue::Number(n));
    }

    #[test]
    fn iso_dates_parse_back(days in 0i64..60_000) {
        let types = ColumnTypes::builtin();
        let ty = types.get(DataKind::Date).unwrap();
        let col = ColumnDef::new("d", DataKind::Date);
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
        let shown = ty.format_value(&CellValue::Date(date), &col, &FormatSettings::default());
        prop_assert_eq!(ty.parse_value(&CellValue::Text(shown), &col), CellValue::Date(date));
    }
}
