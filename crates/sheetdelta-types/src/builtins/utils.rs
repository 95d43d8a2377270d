use chrono::format::{DelayedFormat, StrftimeItems};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use sheetdelta_common::{ColumnDef, Validation, ValidationFailure, ValidationRule};
use std::fmt::Write;

static PATTERNS: Lazy<DashMap<String, Regex>> = Lazy::new(DashMap::new);

/// Compiled regex for a rule pattern, cached per pattern string.
pub fn pattern(src: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = PATTERNS.get(src) {
        return Ok(re.value().clone());
    }
    let re = Regex::new(src)?;
    PATTERNS.insert(src.to_string(), re.clone());
    Ok(re)
}

/// Failure carrying the rule's own message, or `<title> <fallback>`.
pub fn fail(rule: &ValidationRule, column: &ColumnDef, fallback: impl FnOnce() -> String) -> Validation {
    let message = match rule.message() {
        Some(msg) => msg.to_string(),
        None => format!("{} {}", column.title(), fallback()),
    };
    Err(ValidationFailure::new(message))
}

/// Length, pattern and membership rules shared by text-like kinds.
pub fn check_text_rule(rule: &ValidationRule, text: &str, column: &ColumnDef) -> Validation {
    match rule {
        ValidationRule::MinLength { value, .. } if text.chars().count() < *value => {
            fail(rule, column, || format!("must be at least {value} characters"))
        }
        ValidationRule::MaxLength { value, .. } if text.chars().count() > *value => {
            fail(rule, column, || format!("must be at most {value} characters"))
        }
        ValidationRule::Pattern { regex, .. } => match pattern(regex) {
            Ok(re) if re.is_match(text) => Ok(()),
            Ok(_) => fail(rule, column, || "does not match the required format".to_string()),
            Err(_) => fail(rule, column, || format!("has an invalid pattern `{regex}`")),
        },
        ValidationRule::OneOf { values, .. } if !values.iter().any(|v| v == text) => {
            fail(rule, column, || format!("must be one of: {}", values.join(", ")))
        }
        _ => Ok(()),
    }
}

/// Render a chrono format, `None` if the pattern is malformed or asks for
/// fields the value does not have.
pub fn try_format(formatted: DelayedFormat<StrftimeItems<'_>>) -> Option<String> {
    let mut out = String::new();
    write!(out, "{formatted}").ok()?;
    Some(out)
}
