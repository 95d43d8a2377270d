use super::utils::check_text_rule;
use crate::ColumnType;
use sheetdelta_common::{
    CellValue, ColumnDef, DataKind, FormatSettings, Validation, ValidationFailure, ValidationRule,
};

/// Single choice from `ColumnDef::options`.
///
/// Base data may hold values outside the option set; those are kept and
/// flagged, but edits must pick an option.
#[derive(Debug, Default)]
pub struct DropdownType;

impl DropdownType {
    fn matching_option<'a>(column: &'a ColumnDef, text: &str) -> Option<&'a str> {
        let needle = text.trim();
        column
            .options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(needle))
            .map(String::as_str)
    }
}

impl ColumnType for DropdownType {
    fn kind(&self) -> DataKind {
        DataKind::Dropdown
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        match input {
            CellValue::Empty => CellValue::Empty,
            CellValue::Text(s) if s.trim().is_empty() => CellValue::Empty,
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

    /// Membership in the option set is checked ahead of the declared rules.
    fn validate_value(&self, value: &CellValue, column: &ColumnDef) -> Validation {
        if value.is_empty() {
            if column.required {
                return Err(ValidationFailure::new(format!("{} is required", column.title())));
            }
            return Ok(());
        }
        if self.flags_invalid(value, column) {
            return Err(ValidationFailure::new(format!(
                "{} must be one of: {}",
                column.title(),
                column.options.join(", ")
            )));
        }
        for rule in &column.rules {
            self.check_rule(rule, value, column)?;
        }
        Ok(())
    }

    /// Snap case-insensitive matches (and stray whitespace) to the exact option.
    fn auto_correct(&self, value: &CellValue, column: &ColumnDef) -> Option<CellValue> {
        let text = value.as_text()?;
        let option = Self::matching_option(column, text)?;
        (option != text).then(|| CellValue::Text(option.to_string()))
    }

    fn flags_invalid(&self, value: &CellValue, column: &ColumnDef) -> bool {
        match value.as_text() {
            Some(text) => !column.options.iter().any(|o| o == text),
            None => false,
        }
    }
}
