use crate::ColumnType;
use sheetdelta_common::{CellValue, ColumnDef, DataKind, FormatSettings};

#[derive(Debug, Default)]
pub struct BooleanType;

fn parse_bool_text(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" | "t" | "x" | "✓" => Some(true),
        "false" | "no" | "n" | "off" | "0" | "f" | "✗" => Some(false),
        _ => None,
    }
}

impl ColumnType for BooleanType {
    fn kind(&self) -> DataKind {
        DataKind::Boolean
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        let b = match input {
            CellValue::Boolean(b) => Some(*b),
            CellValue::Number(n) if *n == 0.0 => Some(false),
            CellValue::Number(n) if *n == 1.0 => Some(true),
            CellValue::Text(s) => parse_bool_text(s),
            _ => None,
        };
        b.map(CellValue::Boolean).unwrap_or_default()
    }

    fn format_value(&self, value: &CellValue, column: &ColumnDef, _settings: &FormatSettings) -> String {
        let Some(b) = value.as_bool() else {
            return String::new();
        };
        match (column.format.as_deref(), b) {
            (Some("yes_no"), true) => "Yes".to_string(),
            (Some("yes_no"), false) => "No".to_string(),
            (Some("check"), true) => "✓".to_string(),
            (Some("check"), false) => "✗".to_string(),
            (_, b) => b.to_string(),
        }
    }

    fn copy_text(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        value.as_bool().map(|b| b.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats() {
        let c = ColumnDef::new("paid", DataKind::Boolean).with_format("yes_no");
        let s = FormatSettings::default();
        for (input, want) in [("Yes", true), ("off", false), ("1", true), ("N", false)] {
            assert_eq!(BooleanType.parse_value(&input.into(), &c), CellValue::Boolean(want));
        }
        assert_eq!(BooleanType.parse_value(&CellValue::Number(2.0), &c), CellValue::Empty);
        let cell = BooleanType.create_cell(&CellValue::Boolean(true), &c, &s);
        assert_eq!(cell.display, "Yes");
        assert_eq!(cell.copy, "true");
        let check = ColumnDef::new("paid", DataKind::Boolean).with_format("check");
        assert_eq!(BooleanType.format_value(&CellValue::Boolean(false), &check, &s), "✗");
    }

    #[test]
    fn garbage_input_is_refused_on_edit() {
        let c = ColumnDef::new("paid", DataKind::Boolean);
        assert!(BooleanType.coerce_input(&"maybe".into(), &c, &FormatSettings::default()).is_err());
        assert_eq!(
            BooleanType.coerce_input(&"yes".into(), &c, &FormatSettings::default()).unwrap(),
            CellValue::Boolean(true)
        );
    }
}
