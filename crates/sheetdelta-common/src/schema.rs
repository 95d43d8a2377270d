use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    ColumnDef, DataKind, FormatSettings, MAX_FRACTION_DIGITS, SchemaError, SchemaIssue,
    ValidationRule, fixed_fraction_digits,
};

/// Column layout of an editable table plus its initial display settings.
///
/// ```yaml
/// settings:
///   locale: de-DE
///   currency: EUR
/// columns:
///   - id: name
///     kind: text
///     required: true
///     rules:
///       - rule: max_length
///         value: 40
///   - id: amount
///     kind: number
///     format: currency
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSchema {
    #[serde(default)]
    pub settings: FormatSettings,
    /// Ordered column definitions; order fixes each column's index.
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            settings: FormatSettings::default(),
            columns,
        }
    }

    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> Result<String, SchemaError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse and validate in one step.
    pub fn load_yaml(yaml: &str) -> Result<Self, SchemaError> {
        let schema = Self::from_yaml_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check every column and report all issues at once.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut issues = Vec::new();

        if self.columns.is_empty() {
            issues.push(SchemaIssue::new(
                "columns",
                "schema must define at least one column",
            ));
        }

        let id_pattern =
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").map_err(|e| {
                SchemaError::Invalid(vec![SchemaIssue::new("columns", e.to_string())])
            })?;
        let mut seen = HashSet::new();

        for (idx, column) in self.columns.iter().enumerate() {
            let path = format!("columns[{idx}]");
            if !id_pattern.is_match(&column.id) {
                issues.push(SchemaIssue::new(
                    format!("{path}.id"),
                    format!(
                        "column id `{}` must start with a letter or underscore and contain only letters, digits, '_', '.', '-'",
                        column.id
                    ),
                ));
            }
            if !seen.insert(column.id.as_str()) {
                issues.push(SchemaIssue::new(
                    format!("{path}.id"),
                    format!("duplicate column id `{}`", column.id),
                ));
            }
            if column.kind == DataKind::Dropdown && column.options.is_empty() {
                issues.push(SchemaIssue::new(
                    format!("{path}.options"),
                    "dropdown columns must list at least one option",
                ));
            }
            if column.transform.is_some() && column.kind != DataKind::Text {
                issues.push(SchemaIssue::new(
                    format!("{path}.transform"),
                    "case transforms only apply to text columns",
                ));
            }
            if column.kind == DataKind::Number {
                let digits = column
                    .format
                    .as_deref()
                    .and_then(|f| fixed_fraction_digits(f.trim()));
                if let Some(digits) = digits.filter(|d| *d > MAX_FRACTION_DIGITS) {
                    issues.push(SchemaIssue::new(
                        format!("{path}.format"),
                        format!(
                            "fixed format asks for {digits} fraction digits; at most {MAX_FRACTION_DIGITS} are supported"
                        ),
                    ));
                }
            }
            check_rules(&path, &column.rules, &mut issues);
        }

        if self.settings.max_fraction_digits > MAX_FRACTION_DIGITS {
            issues.push(SchemaIssue::new(
                "settings.max_fraction_digits",
                format!("must be at most {MAX_FRACTION_DIGITS}"),
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid(issues))
        }
    }
}

fn check_rules(path: &str, rules: &[ValidationRule], issues: &mut Vec<SchemaIssue>) {
    let mut min = None;
    let mut max = None;
    let mut min_len = None;
    let mut max_len = None;

    for (idx, rule) in rules.iter().enumerate() {
        let rule_path = format!("{path}.rules[{idx}]");
        match rule {
            ValidationRule::Pattern { regex, .. } => {
                if let Err(err) = Regex::new(regex) {
                    issues.push(SchemaIssue::new(
                        rule_path,
                        format!("pattern does not compile: {err}"),
                    ));
                }
            }
            ValidationRule::Min { value, .. } => min = Some(*value),
            ValidationRule::Max { value, .. } => max = Some(*value),
            ValidationRule::MinLength { value, .. } => min_len = Some(*value),
            ValidationRule::MaxLength { value, .. } => max_len = Some(*value),
            ValidationRule::OneOf { values, .. } if values.is_empty() => {
                issues.push(SchemaIssue::new(rule_path, "one_of needs at least one value"));
            }
            _ => {}
        }
    }

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            issues.push(SchemaIssue::new(
                format!("{path}.rules"),
                format!("min ({lo}) exceeds max ({hi})"),
            ));
        }
    }
    if let (Some(lo), Some(hi)) = (min_len, max_len) {
        if lo > hi {
            issues.push(SchemaIssue::new(
                format!("{path}.rules"),
                format!("min_length ({lo}) exceeds max_length ({hi})"),
            ));
        }
    }
}
