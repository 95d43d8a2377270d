use std::fmt::Debug;

use sheetdelta_common::{
    Cell, CellValue, ColumnDef, DataKind, DefaultValue, FormatSettings, Validation,
    ValidationFailure, ValidationRule,
};

/// Strategy for one [`DataKind`]. Object safe; stored as `Arc<dyn ColumnType>`.
///
/// Required methods describe the kind; the provided ones build the cell
/// contract on top of them and are rarely overridden.
pub trait ColumnType: Debug + Send + Sync {
    fn kind(&self) -> DataKind;

    /// Best-effort coercion into this kind's value shape. Never fails:
    /// anything that cannot be interpreted comes back as `CellValue::Empty`.
    fn parse_value(&self, input: &CellValue, column: &ColumnDef) -> CellValue;

    /// Parse text a user typed while looking at cells rendered with
    /// `settings`. Defaults to [`ColumnType::parse_value`].
    fn parse_input(&self, input: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> CellValue {
        let _ = settings;
        self.parse_value(input, column)
    }

    /// Display string for an already-parsed value. Must depend only on its
    /// arguments.
    fn format_value(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings)
    -> String;

    /// Evaluate one rule against a non-empty parsed value. Rules that do not
    /// apply to this kind pass.
    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef)
    -> Validation {
        let _ = (rule, value, column);
        Ok(())
    }

    /// Value for `DefaultValue::Now`.
    fn now_value(&self) -> CellValue {
        CellValue::Empty
    }

    /// Kind-specific repair applied before validation (case transforms,
    /// snapping to a dropdown option). `None` when nothing changes.
    fn auto_correct(&self, value: &CellValue, column: &ColumnDef) -> Option<CellValue> {
        let _ = (value, column);
        None
    }

    /// Values that are kept but should be visually distinguished.
    fn flags_invalid(&self, value: &CellValue, column: &ColumnDef) -> bool {
        let _ = (value, column);
        false
    }

    /// Clipboard text; defaults to the display string.
    fn copy_text(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> String {
        self.format_value(value, column, settings)
    }

    fn can_edit(&self, column: &ColumnDef) -> bool {
        column.editable
    }

    /// Required-but-empty is checked first, then rules in declaration
    /// order; the first failure wins.
    fn validate_value(&self, value: &CellValue, column: &ColumnDef) -> Validation {
        if value.is_empty() {
            if column.required {
                return Err(ValidationFailure::new(format!(
                    "{} is required",
                    column.title()
                )));
            }
            return Ok(());
        }
        for rule in &column.rules {
            self.check_rule(rule, value, column)?;
        }
        Ok(())
    }

    /// Parse user input and refuse input that was non-empty but could not
    /// be interpreted, instead of silently clearing the cell.
    fn coerce_input(
        &self,
        input: &CellValue,
        column: &ColumnDef,
        settings: &FormatSettings,
    ) -> Result<CellValue, ValidationFailure> {
        let parsed = self.parse_input(input, column, settings);
        if parsed.is_empty() && !input.is_empty() {
            return Err(ValidationFailure::new(format!(
                "`{input}` is not a valid {} for {}",
                self.kind(),
                column.title()
            )));
        }
        Ok(parsed)
    }

    /// Semantic value of a cell, `None` when it holds nothing.
    fn cell_value(&self, cell: &Cell) -> Option<CellValue> {
        if cell.value.is_empty() {
            None
        } else {
            Some(cell.value.clone())
        }
    }

    fn default_value(&self, column: &ColumnDef) -> CellValue {
        match &column.default {
            None => CellValue::Empty,
            Some(DefaultValue::Now) => self.now_value(),
            Some(DefaultValue::Value(json)) => {
                self.parse_value(&CellValue::from_json(json), column)
            }
        }
    }

    /// Build a cell from a raw value. Never fails.
    fn create_cell(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> Cell {
        let parsed = self.parse_value(value, column);
        if parsed.is_empty() && !value.is_empty() {
            return Cell::missing(self.kind()).with_editable(self.can_edit(column));
        }
        self.build_cell(parsed, column, settings)
    }

    /// Re-derive display, copy and flags of a stored cell against the
    /// current column format and settings.
    fn refresh_cell(&self, cell: &Cell, column: &ColumnDef, settings: &FormatSettings) -> Cell {
        if cell.missing && cell.value.is_empty() && !column.required {
            return Cell::missing(self.kind()).with_editable(self.can_edit(column));
        }
        self.build_cell(cell.value.clone(), column, settings)
    }

    /// Assemble a cell around an already-parsed value.
    fn build_cell(&self, value: CellValue, column: &ColumnDef, settings: &FormatSettings) -> Cell {
        let display = self.format_value(&value, column, settings);
        let copy = self.copy_text(&value, column, settings);
        let missing = value.is_empty() && column.required;
        let invalid = !value.is_empty() && self.flags_invalid(&value, column);
        Cell {
            kind: self.kind(),
            value,
            display,
            copy,
            editable: self.can_edit(column),
            missing,
            invalid,
        }
    }
}
