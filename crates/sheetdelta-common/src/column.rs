use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::DataKind;

/// Column definition as supplied by the host (or loaded from a
/// [`crate::TableSchema`]).
///
/// `id` is the persistence key. The column's position in the owning column
/// list is its transient index; the two are bridged only when the overlay is
/// saved or restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnDef {
    /// Stable, unique identifier.
    pub id: String,
    /// Declared data kind; selects the column type strategy.
    pub kind: DataKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional human-facing label.
    pub label: Option<String>,
    #[serde(default)]
    /// Empty values are rejected on edit and flagged as missing on read.
    pub required: bool,
    #[serde(default = "default_true")]
    /// Whether cells of this column accept edits (defaults to true).
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Kind-specific display format (`percent`, `%d.%m.%Y`, `national`, ...).
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Validation rules, evaluated in declaration order.
    pub rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Allowed values for dropdown columns.
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Case transform applied by text auto-correction.
    pub transform: Option<TextTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Value used when a row is appended.
    pub default: Option<DefaultValue>,
}

fn default_true() -> bool {
    true
}

impl ColumnDef {
    pub fn new(id: impl Into<String>, kind: DataKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            required: false,
            editable: true,
            format: None,
            rules: Vec::new(),
            options: Vec::new(),
            transform: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_transform(mut self, transform: TextTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Label if present, id otherwise.
    pub fn title(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A single validation rule. Each column type evaluates the rules that make
/// sense for its kind and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    MinLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    MaxLength {
        value: usize,
        #[serde(default)]
        message: Option<String>,
    },
    Pattern {
        regex: String,
        #[serde(default)]
        message: Option<String>,
    },
    Min {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    Max {
        value: f64,
        #[serde(default)]
        message: Option<String>,
    },
    Integer {
        #[serde(default)]
        message: Option<String>,
    },
    /// Lower bound for date/time columns, written in the column's input syntax.
    NotBefore {
        value: String,
        #[serde(default)]
        message: Option<String>,
    },
    NotAfter {
        value: String,
        #[serde(default)]
        message: Option<String>,
    },
    OneOf {
        values: Vec<String>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl ValidationRule {
    /// Custom failure message, if the rule declares one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Pattern { message, .. }
            | ValidationRule::Min { message, .. }
            | ValidationRule::Max { message, .. }
            | ValidationRule::Integer { message }
            | ValidationRule::NotBefore { message, .. }
            | ValidationRule::NotAfter { message, .. }
            | ValidationRule::OneOf { message, .. } => message.as_deref(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValidationRule::MinLength { .. } => "min_length",
            ValidationRule::MaxLength { .. } => "max_length",
            ValidationRule::Pattern { .. } => "pattern",
            ValidationRule::Min { .. } => "min",
            ValidationRule::Max { .. } => "max",
            ValidationRule::Integer { .. } => "integer",
            ValidationRule::NotBefore { .. } => "not_before",
            ValidationRule::NotAfter { .. } => "not_after",
            ValidationRule::OneOf { .. } => "one_of",
        }
    }
}

/// Case transform for text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    Uppercase,
    Lowercase,
    Titlecase,
}

impl TextTransform {
    pub fn apply(self, s: &str) -> String {
        match self {
            TextTransform::Uppercase => s.to_uppercase(),
            TextTransform::Lowercase => s.to_lowercase(),
            TextTransform::Titlecase => {
                let mut out = String::with_capacity(s.len());
                let mut at_word_start = true;
                for ch in s.chars() {
                    if ch.is_whitespace() {
                        at_word_start = true;
                        out.push(ch);
                    } else if at_word_start {
                        out.extend(ch.to_uppercase());
                        at_word_start = false;
                    } else {
                        out.extend(ch.to_lowercase());
                    }
                }
                out
            }
        }
    }
}

/// Default for appended rows. `Now` is resolved when the row is appended,
/// never when the column is defined.
///
/// Written as `default: now` or `default: { value: <json> }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DefaultRepr", into = "DefaultRepr")]
pub enum DefaultValue {
    Now,
    Value(JsonValue),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DefaultRepr {
    Keyword(DefaultKeyword),
    Value { value: JsonValue },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DefaultKeyword {
    Now,
}

impl From<DefaultRepr> for DefaultValue {
    fn from(repr: DefaultRepr) -> Self {
        match repr {
            DefaultRepr::Keyword(DefaultKeyword::Now) => DefaultValue::Now,
            DefaultRepr::Value { value } => DefaultValue::Value(value),
        }
    }
}

impl From<DefaultValue> for DefaultRepr {
    fn from(default: DefaultValue) -> Self {
        match default {
            DefaultValue::Now => DefaultRepr::Keyword(DefaultKeyword::Now),
            DefaultValue::Value(value) => DefaultRepr::Value { value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_accept_keyword_and_value_map() {
        let col: ColumnDef = serde_yaml::from_str(
            "id: status\nkind: dropdown\noptions: [open]\ndefault:\n  value: open\n",
        )
        .unwrap();
        assert_eq!(col.default, Some(DefaultValue::Value(JsonValue::from("open"))));

        let col: ColumnDef = serde_yaml::from_str("id: due\nkind: date\ndefault: now\n").unwrap();
        assert_eq!(col.default, Some(DefaultValue::Now));

        let col: ColumnDef =
            serde_json::from_str(r#"{"id":"paid","kind":"boolean","default":{"value":false}}"#)
                .unwrap();
        assert_eq!(col.default, Some(DefaultValue::Value(JsonValue::Bool(false))));
    }

    #[test]
    fn defaults_round_trip_through_yaml() {
        for default in [DefaultValue::Now, DefaultValue::Value(serde_json::json!(3))] {
            let yaml = serde_yaml::to_string(&default).unwrap();
            let back: DefaultValue = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(back, default, "{yaml}");
        }
        assert_eq!(serde_yaml::to_string(&DefaultValue::Now).unwrap().trim(), "now");
    }

    #[test]
    fn titlecase_lowers_the_tail_of_each_word() {
        assert_eq!(TextTransform::Titlecase.apply("hELLO  wORLD"), "Hello  World");
    }

    #[test]
    fn rules_deserialize_from_tagged_yaml() {
        let rules: Vec<ValidationRule> = serde_yaml::from_str(
            r#"
- rule: max_length
  value: 5
- rule: pattern
  regex: "^[A-Z]+$"
  message: uppercase only
"#,
        )
        .unwrap();
        assert_eq!(rules[0].name(), "max_length");
        assert_eq!(rules[1].message(), Some("uppercase only"));
    }

    #[test]
    fn column_defaults_to_editable() {
        let def: ColumnDef = serde_yaml::from_str("id: amount\nkind: number\n").unwrap();
        assert!(def.editable);
        assert!(!def.required);
        assert_eq!(def.title(), "amount");
    }

    #[test]
    fn default_value_now_is_a_bare_string() {
        let d: DefaultValue = serde_yaml::from_str("now").unwrap();
        assert_eq!(d, DefaultValue::Now);
    }
}
