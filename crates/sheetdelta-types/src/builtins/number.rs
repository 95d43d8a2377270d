use super::utils::fail;
use crate::ColumnType;
use sheetdelta_common::{
    CellValue, ColumnDef, DataKind, FormatSettings, Locale, MAX_FRACTION_DIGITS, Validation,
    ValidationRule, fixed_fraction_digits,
};

/// Display formats understood by number columns (`ColumnDef::format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Shortest round-trip representation, no grouping, `.` decimal.
    Plain,
    /// Locale separators, grouped, up to `max_fraction_digits`.
    Localized,
    Integer,
    /// Exactly N fraction digits (`%.2f`, `0.00`).
    Fixed(usize),
    Percent,
    Currency,
    Scientific,
}

impl NumberFormat {
    pub fn parse(format: Option<&str>) -> Self {
        let Some(raw) = format.map(str::trim) else {
            return NumberFormat::Localized;
        };
        match raw.to_ascii_lowercase().as_str() {
            "" | "localized" => NumberFormat::Localized,
            "plain" => NumberFormat::Plain,
            "integer" => NumberFormat::Integer,
            "percent" => NumberFormat::Percent,
            "currency" | "accounting" => NumberFormat::Currency,
            "scientific" => NumberFormat::Scientific,
            other => fixed_fraction_digits(other)
                .map(|digits| NumberFormat::Fixed(digits.min(MAX_FRACTION_DIGITS)))
                .unwrap_or(NumberFormat::Localized),
        }
    }
}

#[derive(Debug, Default)]
pub struct NumberType;

impl ColumnType for NumberType {
    fn kind(&self) -> DataKind {
        DataKind::Number
    }

    fn parse_value(&self, input: &CellValue, _column: &ColumnDef) -> CellValue {
        let n = match input {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => parse_number_text(s),
            _ => None,
        };
        match n {
            Some(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Empty,
        }
    }

    fn parse_input(&self, input: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> CellValue {
        let CellValue::Text(s) = input else {
            return self.parse_value(input, column);
        };
        let locale = settings.resolved_locale();
        let n = parse_localized(s, locale.decimal, locale.group)
            .or_else(|| (locale.decimal != '.').then(|| parse_number_text(s)).flatten());
        match n {
            Some(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Empty,
        }
    }

    fn format_value(&self, value: &CellValue, column: &ColumnDef, settings: &FormatSettings) -> String {
        match value.as_number() {
            Some(n) => format_number(n, NumberFormat::parse(column.format.as_deref()), settings),
            None => String::new(),
        }
    }

    fn copy_text(&self, value: &CellValue, _column: &ColumnDef, _settings: &FormatSettings) -> String {
        value.as_number().map(|n| n.to_string()).unwrap_or_default()
    }

    fn check_rule(&self, rule: &ValidationRule, value: &CellValue, column: &ColumnDef) -> Validation {
        let Some(n) = value.as_number() else {
            return Ok(());
        };
        match rule {
            ValidationRule::Min { value: min, .. } if n < *min => {
                fail(rule, column, || format!("must be at least {min}"))
            }
            ValidationRule::Max { value: max, .. } if n > *max => {
                fail(rule, column, || format!("must be at most {max}"))
            }
            ValidationRule::Integer { .. } if n.fract() != 0.0 => {
                fail(rule, column, || "must be a whole number".to_string())
            }
            ValidationRule::OneOf { values, .. }
                if !values.iter().any(|v| parse_number_text(v) == Some(n)) =>
            {
                fail(rule, column, || format!("must be one of: {}", values.join(", ")))
            }
            _ => Ok(()),
        }
    }
}

/// Invariant parsing: `.` decimal, `,` grouping.
fn parse_number_text(s: &str) -> Option<f64> {
    parse_localized(s, '.', ',')
}

/// Parse `s` with the given separators. Also accepts `_` and spaces as
/// grouping, a currency symbol and a trailing `%`. Grouped digits must come
/// in threes left of the decimal separator, so `1,5` or `1.234,5` under
/// `.` decimal are refused rather than read as another number.
fn parse_localized(s: &str, decimal: char, group: char) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (body, scale) = match trimmed.strip_suffix('%') {
        Some(rest) => (rest, 0.01),
        None => (trimmed, 1.0),
    };
    let cleaned: String = body
        .chars()
        .filter(|c| !matches!(c, '_' | '$' | '€' | '£' | '¥' | '₹') && !c.is_whitespace())
        .collect();
    let (sign, unsigned) = match cleaned.strip_prefix(['-', '+']) {
        Some(rest) => (&cleaned[..1], rest),
        None => ("", cleaned.as_str()),
    };

    let (int_part, frac_part) = match unsigned.split_once(decimal) {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    if frac_part.is_some_and(|f| f.contains([decimal, group])) {
        return None;
    }
    if !group.is_whitespace() && int_part.contains(group) {
        let mut groups = int_part.split(group);
        let lead = groups.next().unwrap_or_default();
        if lead.is_empty() || lead.len() > 3 || groups.any(|g| g.len() != 3) {
            return None;
        }
    }

    let mut normalized = String::with_capacity(cleaned.len());
    normalized.push_str(sign);
    normalized.extend(int_part.chars().filter(|c| *c != group));
    if let Some(frac) = frac_part {
        normalized.push('.');
        normalized.push_str(frac);
    }
    normalized.parse::<f64>().ok().map(|n| n * scale)
}

pub fn format_number(n: f64, format: NumberFormat, settings: &FormatSettings) -> String {
    let locale = settings.resolved_locale();
    match format {
        NumberFormat::Plain => n.to_string(),
        NumberFormat::Localized => {
            fixed(n, settings.max_fraction_digits, true, true, &locale)
        }
        NumberFormat::Integer => fixed(n, 0, false, true, &locale),
        NumberFormat::Fixed(digits) => fixed(n, digits, false, false, &locale),
        NumberFormat::Percent => format!("{}%", fixed(n * 100.0, 2, true, true, &locale)),
        NumberFormat::Currency => {
            let amount = fixed(n.abs(), 2, false, true, &locale);
            let sign = if n < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
                "-"
            } else {
                ""
            };
            let symbol = settings.currency_symbol();
            if locale.currency_suffix {
                format!("{sign}{amount} {symbol}")
            } else {
                format!("{sign}{symbol}{amount}")
            }
        }
        NumberFormat::Scientific => format!("{n:.2E}"),
    }
}

fn fixed(n: f64, digits: usize, trim: bool, grouped: bool, locale: &Locale) -> String {
    let digits = digits.min(MAX_FRACTION_DIGITS);
    let rendered = format!("{:.*}", digits, n.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac_part = if trim {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };
    let negative = n < 0.0 && rendered.chars().any(|c| c.is_ascii_digit() && c != '0');

    let mut out = String::with_capacity(rendered.len() + 4);
    if negative {
        out.push('-');
    }
    if grouped {
        out.push_str(&group_digits(int_part, locale.group));
    } else {
        out.push_str(int_part);
    }
    if !frac_part.is_empty() {
        out.push(locale.decimal);
        out.push_str(frac_part);
    }
    out
}

fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
