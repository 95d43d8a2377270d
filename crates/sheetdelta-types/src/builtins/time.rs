use super::utils::{fail, try_format};
use crate::ColumnType;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use sheetdelta_common::{
    CellValue, ColumnDef, DataKind, FormatSettings, Validation, ValidationRule, time_from_millis,
    time_to_millis,
};

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f",
    "%H:%M",
    "%I:%M %p",
    "%I:%M:%S %p",
    "%I:%M%p",
];

/// Time of day. Numeric inputs are milliseconds since midnight.
#[derive(Debug, Default)]
pub struct TimeType;

impl ColumnType for TimeType {
    fn kind(&self) -> DataKind {
        DataKind::Time
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        let time = match input {
            CellValue::Time(t) => Some(*t),
            CellValue::Number(ms) => time_from_millis(*ms),
            CellValue::Text(s) => parse_time_text(s),
            _ => None,
        };
        time.map(CellValue::Time).unwrap_or_default()
    }

    fn format_value(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> String {
        let CellValue::Time(t) = value else {
            return String::new();
        };
        let pattern = match column.format.as_deref().map(str::trim) {
            None | Some("") => settings.time_format.as_str(),
            Some("iso") => "%H:%M:%S",
            Some("12h") => "%I:%M %p",
            Some("24h") => "%H:%M",
            Some(custom) => custom,
        };
        try_format(t.format(pattern)).unwrap_or_else(|| t.format("%H:%M:%S").to_string())
    }

    fn copy_text(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        match value {
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
            _ => String::new(),
        }
    }

    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef) -> Validation {
        let CellValue::Time(t) = value else {
            return Ok(());
        };
        match rule {
            ValidationRule::NotBefore { value: bound, .. } => match parse_time_text(bound) {
                Some(lo) if *t < lo => {
                    fail(rule, column, || format!("must be at or after {}", lo.format("%H:%M")))
                }
                Some(_) => Ok(()),
                None => fail(rule, column, || format!("has an invalid time bound `{bound}`")),
            },
            ValidationRule::NotAfter { value: bound, .. } => match parse_time_text(bound) {
                Some(hi) if *t > hi => {
                    fail(rule, column, || format!("must be at or before {}", hi.format("%H:%M")))
                }
                Some(_) => Ok(()),
                None => fail(rule, column, || format!("has an invalid time bound `{bound}`")),
            },
            ValidationRule::Min { value: min, .. } if (time_to_millis(t) as f64) < *min => {
                fail(rule, column, || "is too early".to_string())
            }
            ValidationRule::Max { value: max, .. } if (time_to_millis(t) as f64) > *max => {
                fail(rule, column, || "is too late".to_string())
            }
            _ => Ok(()),
        }
    }

    fn now_value(&self) -> CellValue {
        #[cfg(feature = "system-clock")]
        {
            CellValue::Time(chrono::Local::now().time())
        }
        #[cfg(not(feature = "system-clock"))]
        {
            CellValue::Empty
        }
    }
}

fn parse_time_text(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let upper = s.to_ascii_uppercase();
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(&upper, fmt) {
            return Some(t);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.time());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.time());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> CellValue {
        CellValue::Time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    fn col() -> ColumnDef {
        ColumnDef::new("starts", DataKind::Time)
    }

    #[test]
    fn parses_12_and_24_hour_input() {
        for input in ["14:30", "14:30:00", "2:30 PM", "02:30 pm", "2:30PM", "2024-01-15T14:30:00"] {
            assert_eq!(TimeType.parse_value(&input.into(), &col()), hm(14, 30), "{input}");
        }
        assert_eq!(TimeType.parse_value(&"25:00".into(), &col()), CellValue::Empty);
    }

    #[test]
    fn numbers_are_millis_since_midnight() {
        assert_eq!(TimeType.parse_value(&CellValue::Number(52_200_000.0), &col()), hm(14, 30));
    }

    #[test]
    fn formats() {
        let s = FormatSettings::default();
        let v = hm(14, 5);
        assert_eq!(TimeType.format_value(&v, &col(), &s), "14:05");
        assert_eq!(TimeType.format_value(&v, &col().with_format("12h"), &s), "02:05 PM");
        assert_eq!(TimeType.format_value(&v, &col().with_format("iso"), &s), "14:05:00");
        assert_eq!(TimeType.format_value(&v, &col().with_format("%Hh%M"), &s), "14h05");
        assert_eq!(TimeType.copy_text(&v, &col().with_format("12h"), &s), "14:05:00");
    }

    #[test]
    fn business_hours() {
        let c = col()
            .with_rule(ValidationRule::NotBefore {
                value: "9:00".into(),
                message: None,
            })
            .with_rule(ValidationRule::NotAfter {
                value: "5:00 PM".into(),
                message: None,
            });
        assert!(TimeType.validate_value(&hm(12, 0), &c).is_ok());
        assert_eq!(
            TimeType.validate_value(&hm(8, 59), &c).unwrap_err().message,
            "starts must be at or after 09:00"
        );
        assert_eq!(
            TimeType.validate_value(&hm(17, 1), &c).unwrap_err().message,
            "starts must be at or before 17:00"
        );
    }
}
