use super::utils::check_text_rule;
use crate::ColumnType;
use sheetdelta_common::{CellValue, ColumnDef, DataKind, FormatSettings, Validation, ValidationRule};

/// Free text. Any scalar is accepted and rendered through its `Display`.
#[derive(Debug, Default)]
pub struct TextType;

impl ColumnType for TextType {
    fn kind(&self) -> DataKind {
        DataKind::Text
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        match input {
            CellValue::Empty => CellValue::Empty,
            CellValue::Text(s) if s.is_empty() => CellValue::Empty,
            CellValue::Text(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    fn format_value(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        value.to_string()
    }

    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef) -> Validation {
        match value.as_text() {
            Some(text) => check_text_rule(rule, text, column),
            None => Ok(()),
        }
    }

    fn auto_correct(&self, value: &CellValue, column: &ColumnDef) -> Option<CellValue> {
        let transform = column.transform?;
        let text = value.as_text()?;
        let fixed = transform.apply(text);
        (fixed != text).then_some(CellValue::Text(fixed))
    }
}
