//! Display settings shared by every column type.
//!
//! Column types never read ambient process state when formatting: everything
//! that can influence a display string is either on the [`crate::ColumnDef`]
//! (its `format`) or in [`FormatSettings`]. Formatting the same value with
//! the same pair therefore always yields the same string.

use serde::{Deserialize, Serialize};

/// Largest fraction digit count a fixed number format may request.
pub const MAX_FRACTION_DIGITS: usize = 17;

/// Fraction digits requested by a fixed number format: `%.Nf` (printf) or
/// `0.000` (spreadsheet). Not clamped; `None` for any other format.
pub fn fixed_fraction_digits(pattern: &str) -> Option<usize> {
    if let Some(digits) = pattern.strip_prefix("%.").and_then(|s| s.strip_suffix('f')) {
        return digits.parse().ok();
    }
    if pattern == "0" {
        return Some(0);
    }
    let frac = pattern.strip_prefix("0.")?;
    (!frac.is_empty() && frac.chars().all(|c| c == '0')).then_some(frac.len())
}

/// Separator conventions of a locale.
///
/// Only the handful of properties number formatting needs; anything
/// unrecognised falls back to [`Locale::invariant`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Locale {
    pub decimal: char,
    pub group: char,
    /// Currency symbol goes after the amount (`1.234,50 €`).
    pub currency_suffix: bool,
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl Locale {
    pub const fn invariant() -> Self {
        Locale {
            decimal: '.',
            group: ',',
            currency_suffix: false,
        }
    }

    /// Resolve a BCP-47 style tag (`de-DE`, `fr`, `en_US`).
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().replace('_', "-").to_ascii_lowercase();
        if tag == "de-ch" {
            return Locale {
                decimal: '.',
                group: '\'',
                currency_suffix: false,
            };
        }
        if tag == "pt-br" {
            return Locale {
                decimal: ',',
                group: '.',
                currency_suffix: false,
            };
        }
        match tag.split('-').next().unwrap_or_default() {
            "de" | "es" | "it" | "nl" | "pt" => Locale {
                decimal: ',',
                group: '.',
                currency_suffix: true,
            },
            "fr" => Locale {
                decimal: ',',
                group: '\u{202f}',
                currency_suffix: true,
            },
            _ => Locale::invariant(),
        }
    }
}

/// Session-wide display settings. Changing them never touches stored
/// values; display strings are re-derived on the next read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Locale tag used for separators.
    pub locale: String,
    /// ISO 4217 code used by the `currency` number format.
    pub currency: String,
    /// chrono `strftime` pattern for the `localized` date format.
    pub date_format: String,
    /// chrono `strftime` pattern used when a time column has no format.
    pub time_format: String,
    /// Fraction digits shown by localized number formats.
    pub max_fraction_digits: usize,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            currency: "USD".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            time_format: "%H:%M".to_string(),
            max_fraction_digits: 4,
        }
    }
}

impl FormatSettings {
    pub fn with_locale(mut self, tag: impl Into<String>) -> Self {
        self.locale = tag.into();
        self
    }

    pub fn with_currency(mut self, code: impl Into<String>) -> Self {
        self.currency = code.into();
        self
    }

    pub fn resolved_locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }

    /// Symbol for the configured currency code; unknown codes render as
    /// the code itself.
    pub fn currency_symbol(&self) -> &str {
        match self.currency.to_ascii_uppercase().as_str() {
            "USD" | "CAD" | "AUD" | "MXN" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "INR" => "₹",
            "CHF" => "CHF",
            "BRL" => "R$",
            _ => self.currency.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn german_uses_comma_decimal() {
        let l = Locale::from_tag("de_DE");
        assert_eq!(l.decimal, ',');
        assert_eq!(l.group, '.');
    }

    #[test]
    fn unknown_locale_is_invariant() {
        assert_eq!(Locale::from_tag("xx-YY"), Locale::invariant());
    }

    #[test]
    fn unknown_currency_renders_code() {
        let s = FormatSettings::default().with_currency("SEK");
        assert_eq!(s.currency_symbol(), "SEK");
    }
}
