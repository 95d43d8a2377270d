use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use serde_json::Value as JsonValue;
use std::{
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

/* ───────────────────── Epoch utilities ───────────────────
Numeric date/time inputs coming from columnar sources are interpreted as
  date: milliseconds since 1970-01-01T00:00:00Z (Arrow `timestamp[ms]`)
  time: milliseconds since midnight           (Arrow `time32[ms]`)
Anything outside chrono's representable range maps to `None`.
------------------------------------------------------------------- */

const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn date_from_epoch_millis(ms: f64) -> Option<NaiveDate> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.floor() as i64).map(|dt| dt.date_naive())
}

pub fn date_to_epoch_millis(date: &NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (*date - epoch).num_days() * MILLIS_PER_DAY
}

pub fn time_from_millis(ms: f64) -> Option<NaiveTime> {
    if !ms.is_finite() {
        return None;
    }
    let ms = (ms.floor() as i64).rem_euclid(MILLIS_PER_DAY);
    let secs = (ms / 1000) as u32;
    let nanos = ((ms % 1000) * 1_000_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

pub fn time_to_millis(time: &NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * 1000 + (time.nanosecond() / 1_000_000) as i64
}

/// The semantic value held by a cell, independent of how it is displayed.
///
/// Base datasets hand these out through the accessor, column types coerce
/// them into the shape their kind expects, and the overlay stores them inside
/// [`crate::Cell`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Empty => state.write_u8(0),
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Boolean(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Time(t) => t.hash(state),
        }
    }
}

impl Eq for CellValue {}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveTime> for CellValue {
    fn from(t: NaiveTime) -> Self {
        CellValue::Time(t)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl CellValue {
    /// `Empty` and the empty string both count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Boolean(_) => "boolean",
            CellValue::Date(_) => "date",
            CellValue::Time(_) => "time",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Plain JSON projection used by the persisted state blob.
    ///
    /// Values JSON cannot carry (NaN, infinities) become `null`. Integral
    /// numbers are written without a fractional part.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Empty => JsonValue::Null,
            CellValue::Text(s) => JsonValue::String(s.clone()),
            CellValue::Number(n) => number_to_json(*n),
            CellValue::Boolean(b) => JsonValue::Bool(*b),
            CellValue::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
            CellValue::Time(t) => JsonValue::String(t.format("%H:%M:%S%.f").to_string()),
        }
    }

    /// Untyped lift from JSON. Column types narrow the result further
    /// (e.g. a date column turns `"2024-01-02"` into a `Date`).
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => CellValue::Empty,
            JsonValue::Bool(b) => CellValue::Boolean(*b),
            JsonValue::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
            JsonValue::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Total order used by sorted views: numbers, then booleans, dates,
    /// times, text; `Empty` sorts last.
    pub fn sort_cmp(&self, other: &CellValue) -> Ordering {
        fn rank(v: &CellValue) -> u8 {
            match v {
                CellValue::Number(_) => 0,
                CellValue::Boolean(_) => 1,
                CellValue::Date(_) => 2,
                CellValue::Time(_) => 3,
                CellValue::Text(_) => 4,
                CellValue::Empty => 5,
            }
        }
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Time(a), CellValue::Time(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if !n.is_finite() {
        return JsonValue::Null;
    }
    // 2^53: beyond this an f64 no longer round-trips through i64 exactly
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return JsonValue::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}
