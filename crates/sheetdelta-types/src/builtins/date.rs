use super::utils::{fail, try_format};
use crate::ColumnType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sheetdelta_common::{
    CellValue, ColumnDef, DataKind, FormatSettings, Validation, ValidationRule,
    date_from_epoch_millis, date_to_epoch_millis,
};

const ISO: &str = "%Y-%m-%d";

/// Accepted textual date inputs, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // ISO
    "%m/%d/%Y", // US
    "%d.%m.%Y", // European dotted
    "%Y/%m/%d",
    "%b %d, %Y", // Jan 15, 2024
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Calendar dates. Numeric inputs are epoch milliseconds.
#[derive(Debug, Default)]
pub struct DateType;

impl ColumnType for DateType {
    fn kind(&self) -> DataKind {
        DataKind::Date
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        let date = match input {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(ms) => date_from_epoch_millis(*ms),
            CellValue::Text(s) => parse_date_text(s),
            _ => None,
        };
        date.map(CellValue::Date).unwrap_or_default()
    }

    fn format_value(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> String {
        let CellValue::Date(d) = value else {
            return String::new();
        };
        let pattern = match column.format.as_deref().map(str::trim) {
            None | Some("") | Some("iso") => ISO,
            Some("localized") => settings.date_format.as_str(),
            Some("long") => "%B %-d, %Y",
            Some(custom) => custom,
        };
        try_format(d.format(pattern)).unwrap_or_else(|| d.format(ISO).to_string())
    }

    /// ISO, whatever the display format, so pasted values parse back.
    fn copy_text(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        match value {
            CellValue::Date(d) => d.format(ISO).to_string(),
            _ => String::new(),
        }
    }

    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef) -> Validation {
        let CellValue::Date(d) = value else {
            return Ok(());
        };
        match rule {
            ValidationRule::NotBefore { value: bound, .. } => match parse_date_text(bound) {
                Some(lo) if *d < lo => fail(rule, column, || format!("must be on or after {lo}")),
                Some(_) => Ok(()),
                None => fail(rule, column, || format!("has an invalid date bound `{bound}`")),
            },
            ValidationRule::NotAfter { value: bound, .. } => match parse_date_text(bound) {
                Some(hi) if *d > hi => fail(rule, column, || format!("must be on or before {hi}")),
                Some(_) => Ok(()),
                None => fail(rule, column, || format!("has an invalid date bound `{bound}`")),
            },
            // Numeric bounds compare epoch milliseconds.
            ValidationRule::Min { value: min, .. } if (date_to_epoch_millis(d) as f64) < *min => {
                fail(rule, column, || "is too early".to_string())
            }
            ValidationRule::Max { value: max, .. } if (date_to_epoch_millis(d) as f64) > *max => {
                fail(rule, column, || "is too late".to_string())
            }
            _ => Ok(()),
        }
    }

    fn now_value(&self) -> CellValue {
        #[cfg(feature = "system-clock")]
        {
            CellValue::Date(chrono::Local::now().date_naive())
        }
        #[cfg(not(feature = "system-clock"))]
        {
            CellValue::Empty
        }
    }
}

pub(crate) fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn col() -> ColumnDef {
        ColumnDef::new("due", DataKind::Date)
    }

    #[test]
    fn accepts_common_spellings() {
        let want = CellValue::Date(ymd(2024, 1, 15));
        for input in [
            "2024-01-15",
            "01/15/2024",
            "15.01.2024",
            "2024/01/15",
            "Jan 15, 2024",
            "January 15, 2024",
            "15 Jan 2024",
            "2024-01-15T09:30:00Z",
            "2024-01-15 09:30",
        ] {
            assert_eq!(DateType.parse_value(&input.into(), &col()), want, "{input}");
        }
        assert_eq!(DateType.parse_value(&"someday".into(), &col()), CellValue::Empty);
    }

    #[test]
    fn numbers_are_epoch_millis() {
        let ms = 1_705_276_800_000.0; // 2024-01-15T00:00:00Z
        assert_eq!(
            DateType.parse_value(&CellValue::Number(ms), &col()),
            CellValue::Date(ymd(2024, 1, 15))
        );
        assert_eq!(date_to_epoch_millis(&ymd(2024, 1, 15)) as f64, ms);
    }

    #[test]
    fn formats() {
        let v = CellValue::Date(ymd(2024, 3, 5));
        let s = FormatSettings::default();
        assert_eq!(DateType.format_value(&v, &col(), &s), "2024-03-05");
        assert_eq!(DateType.format_value(&v, &col().with_format("localized"), &s), "03/05/2024");
        assert_eq!(DateType.format_value(&v, &col().with_format("long"), &s), "March 5, 2024");
        assert_eq!(DateType.format_value(&v, &col().with_format("%d.%m.%Y"), &s), "05.03.2024");
        // malformed patterns fall back rather than panic
        assert_eq!(DateType.format_value(&v, &col().with_format("%Q"), &s), "2024-03-05");
        assert_eq!(DateType.copy_text(&v, &col().with_format("long"), &s), "2024-03-05");
    }

    #[test]
    fn bounds() {
        let c = col()
            .with_rule(ValidationRule::NotBefore {
                value: "2024-01-01".into(),
                message: None,
            })
            .with_rule(ValidationRule::NotAfter {
                value: "12/31/2024".into(),
                message: Some("too late".into()),
            });
        assert!(DateType.validate_value(&CellValue::Date(ymd(2024, 6, 1)), &c).is_ok());
        assert_eq!(
            DateType.validate_value(&CellValue::Date(ymd(2023, 12, 31)), &c).unwrap_err().message,
            "due must be on or after 2024-01-01"
        );
        assert_eq!(
            DateType.validate_value(&CellValue::Date(ymd(2025, 1, 1)), &c).unwrap_err().message,
            "too late"
        );
    }

    #[cfg(feature = "system-clock")]
    #[test]
    fn now_default_is_a_date() {
        let c = col().with_default(sheetdelta_common::DefaultValue::Now);
        assert!(matches!(DateType.default_value(&c), CellValue::Date(_)));
    }
}
