use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CellValue;

/// Declared data kind of a column. Doubles as the registry slot index, so
/// variants must stay dense and `ALL` must list them in discriminant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DataKind {
    Text = 0,
    Number = 1,
    Date = 2,
    Time = 3,
    Dropdown = 4,
    Phone = 5,
    Boolean = 6,
}

impl DataKind {
    pub const COUNT: usize = 7;

    pub const ALL: [DataKind; DataKind::COUNT] = [
        DataKind::Text,
        DataKind::Number,
        DataKind::Date,
        DataKind::Time,
        DataKind::Dropdown,
        DataKind::Phone,
        DataKind::Boolean,
    ];

    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Text => "text",
            DataKind::Number => "number",
            DataKind::Date => "date",
            DataKind::Time => "time",
            DataKind::Dropdown => "dropdown",
            DataKind::Phone => "phone",
            DataKind::Boolean => "boolean",
        }
    }
}

impl Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed value plus its derived display string and edit metadata.
///
/// `display` and `copy` are caches: both can always be recomputed from
/// `value` and the owning column's active format, and readers of overlay
/// cells do exactly that before handing them out.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub kind: DataKind,
    pub value: CellValue,
    pub display: String,
    pub copy: String,
    pub editable: bool,
    /// Unparseable input, or a required column holding no value.
    pub missing: bool,
    /// Kept and editable, but flagged for the renderer (e.g. a malformed
    /// phone number or a dropdown value outside its option set).
    pub invalid: bool,
}

impl Cell {
    pub fn new(kind: DataKind, value: CellValue, display: impl Into<String>) -> Self {
        let display = display.into();
        Self {
            kind,
            value,
            copy: display.clone(),
            display,
            editable: true,
            missing: false,
            invalid: false,
        }
    }

    /// Placeholder for input that could not be interpreted.
    pub fn missing(kind: DataKind) -> Self {
        Self {
            kind,
            value: CellValue::Empty,
            display: String::new(),
            copy: String::new(),
            editable: true,
            missing: true,
            invalid: false,
        }
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn with_copy(mut self, copy: impl Into<String>) -> Self {
        self.copy = copy.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
