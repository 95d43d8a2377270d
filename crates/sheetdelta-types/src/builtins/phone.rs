use super::utils::check_text_rule;
use crate::ColumnType;
use sheetdelta_common::{CellValue, ColumnDef, DataKind, FormatSettings, Validation, ValidationRule};

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Phone numbers, stored as entered.
///
/// Malformed numbers are accepted and flagged; only declared text rules can
/// reject an edit.
#[derive(Debug, Default)]
pub struct PhoneType;

fn digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// 7 to 15 digits, written with digits, spaces, `-`, `.`, parentheses and
/// an optional leading `+`.
pub fn is_valid_phone(s: &str) -> bool {
    let s = s.trim();
    let body = s.strip_prefix('+').unwrap_or(s);
    let charset_ok = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'));
    let n = digits(body).len();
    charset_ok && (MIN_DIGITS..=MAX_DIGITS).contains(&n)
}

/// North American numbering plan: 10 digits, or 11 with a leading 1.
fn nanp(d: &str) -> Option<&str> {
    match d.len() {
        10 => Some(d),
        11 if d.starts_with('1') => Some(&d[1..]),
        _ => None,
    }
}

fn format_phone(raw: &str, format: Option<&str>) -> String {
    if !is_valid_phone(raw) {
        return raw.to_string();
    }
    let d = digits(raw);
    match format.map(str::trim) {
        Some("national") => match nanp(&d) {
            Some(n) => format!("({}) {}-{}", &n[..3], &n[3..6], &n[6..]),
            None => raw.to_string(),
        },
        Some("international") => match nanp(&d) {
            Some(n) => format!("+1 {}-{}-{}", &n[..3], &n[3..6], &n[6..]),
            None if raw.trim_start().starts_with('+') => format!("+{d}"),
            None => raw.to_string(),
        },
        Some("e164") => match nanp(&d) {
            Some(n) => format!("+1{n}"),
            None => format!("+{d}"),
        },
        _ => raw.to_string(),
    }
}

impl ColumnType for PhoneType {
    fn kind(&self) -> DataKind {
        DataKind::Phone
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        match input {
            CellValue::Text(s) if s.trim().is_empty() => CellValue::Empty,
            CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 => {
                CellValue::Text(format!("{n:.0}"))
            }
            _ => CellValue::Empty,
        }
    }

    fn format_value(&self, value: &CellValue, column: &ColumnDef, _settings: &FormatSettings) -> String {
        match value.as_text() {
            Some(raw) => format_phone(raw, column.format.as_deref()),
            None => String::new(),
        }
    }

    /// Raw entry, so a paste lands exactly what was typed.
    fn copy_text(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        value.as_text().unwrap_or_default().to_string()
    }

    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef) -> Validation {
        match value.as_text() {
            Some(text) => check_text_rule(rule, text, column),
            None => Ok(()),
        }
    }

    fn flags_invalid(&self, value: &CellValue, _column: &ColumnDef) -> bool {
        value.as_text().is_some_and(|s| !is_valid_phone(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(format: &str) -> ColumnDef {
        ColumnDef::new("phone", DataKind::Phone).with_format(format)
    }

    fn show(raw: &str, format: &str) -> String {
        PhoneType.format_value(&raw.into(), &col(format), &FormatSettings::default())
    }

    #[test]
    fn validity() {
        assert!(is_valid_phone("(555) 123-4567"));
        assert!(is_valid_phone("+44 20 7946 0958"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("555-CALL-NOW"));
        assert!(!is_valid_phone("1234567890123456"));
    }

    #[test]
    fn nanp_formats() {
        assert_eq!(show("555.123.4567", "national"), "(555) 123-4567");
        assert_eq!(show("1-555-123-4567", "international"), "+1 555-123-4567");
        assert_eq!(show("555 123 4567", "e164"), "+15551234567");
        assert_eq!(show("+44 20 7946 0958", "e164"), "+442079460958");
        assert_eq!(show("555.123.4567", "raw"), "555.123.4567");
    }

    #[test]
    fn invalid_numbers_are_kept_and_flagged() {
        let c = col("national");
        assert!(PhoneType.validate_value(&"12345".into(), &c).is_ok());
        let cell = PhoneType.create_cell(&"12345".into(), &c, &FormatSettings::default());
        assert!(cell.invalid);
        assert_eq!(cell.display, "12345");
    }

    #[test]
    fn numeric_base_values_become_text() {
        assert_eq!(
            PhoneType.parse_value(&CellValue::Number(5551234567.0), &col("national")),
            CellValue::from("5551234567")
        );
    }
}
