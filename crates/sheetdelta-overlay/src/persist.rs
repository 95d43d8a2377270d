//! JSON state blob.
//!
//! ```json
//! {
//!   "edited_rows":  { "4": { "amount": 250 } },
//!   "added_rows":   [ { "name": "Ada", "amount": 10 } ],
//!   "deleted_rows": [ 3 ]
//! }
//! ```
//!
//! Cells are keyed by column id, never by position. Values are each column
//! type's semantic value projected through [`CellValue::to_json`]; anything
//! JSON cannot carry is written as `null`.

use serde_json::{Map, Value as JsonValue};
use sheetdelta_common::{CellValue, ColumnDef, FormatSettings};
use sheetdelta_types::{ColumnType, ColumnTypes};

use crate::{Columns, EditOverlay, PersistError, RowCells};

/// Counts from a restore, plus what was skipped and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub edited_cells: usize,
    pub added_rows: usize,
    pub deleted_rows: usize,
    pub skipped: Vec<String>,
}

impl RestoreReport {
    fn skip(&mut self, reason: String) {
        #[cfg(feature = "tracing")]
        tracing::warn!(%reason, "skipping state entry");
        self.skipped.push(reason);
    }
}

fn column_type<'t>(types: &'t ColumnTypes, column: &ColumnDef) -> Option<&'t dyn ColumnType> {
    types.get(column.kind)
}

fn cell_json(types: &ColumnTypes, column: &ColumnDef, cell: &sheetdelta_common::Cell) -> JsonValue {
    let value = match column_type(types, column) {
        Some(ty) => ty.cell_value(cell),
        None => (!cell.value.is_empty()).then(|| cell.value.clone()),
    };
    value.map(|v| v.to_json()).unwrap_or(JsonValue::Null)
}

fn row_json(row: &RowCells, columns: &Columns, types: &ColumnTypes) -> Map<String, JsonValue> {
    let mut cols: Vec<_> = row.iter().collect();
    cols.sort_unstable_by_key(|(col, _)| **col);
    let mut out = Map::new();
    for (col, cell) in cols {
        if let Some(column) = columns.by_index(*col) {
            out.insert(column.id.clone(), cell_json(types, column, cell));
        }
    }
    out
}

impl EditOverlay {
    /// Appended rows lacking a value for some required, editable column.
    pub fn incomplete_rows(&self, columns: &Columns, types: &ColumnTypes) -> Vec<usize> {
        self.added_rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| !row_is_complete(row, columns, types))
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Serialize to the state blob. Incomplete appended rows are left out.
    pub fn to_json(&self, columns: &Columns, types: &ColumnTypes) -> JsonValue {
        let mut edited = Map::new();
        for (original, row) in self.edited_rows() {
            let cells = row_json(row, columns, types);
            if !cells.is_empty() {
                edited.insert(original.to_string(), JsonValue::Object(cells));
            }
        }

        let mut added = Vec::with_capacity(self.added_rows().len());
        for row in self.added_rows() {
            if !row_is_complete(row, columns, types) {
                #[cfg(feature = "tracing")]
                tracing::debug!("dropping incomplete appended row from state");
                continue;
            }
            added.push(JsonValue::Object(row_json(row, columns, types)));
        }

        let deleted = self
            .deleted_rows()
            .iter()
            .map(|&d| JsonValue::from(d))
            .collect();

        let mut out = Map::new();
        out.insert("edited_rows".into(), JsonValue::Object(edited));
        out.insert("added_rows".into(), JsonValue::Array(added));
        out.insert("deleted_rows".into(), JsonValue::Array(deleted));
        JsonValue::Object(out)
    }

    pub fn to_json_string(&self, columns: &Columns, types: &ColumnTypes) -> String {
        self.to_json(columns, types).to_string()
    }

    /// Replace the overlay's contents with a parsed state blob.
    ///
    /// Unknown column ids, row keys that are not base rows, and values of the
    /// wrong shape are skipped and listed in the report. A blob that is not
    /// JSON, or whose sections have the wrong type, leaves the overlay empty
    /// and returns an error.
    pub fn restore_str(
        &mut self,
        json: &str,
        columns: &Columns,
        types: &ColumnTypes,
        settings: &FormatSettings,
    ) -> Result<RestoreReport, PersistError> {
        self.clear();
        let value: JsonValue = serde_json::from_str(json).inspect_err(|_e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "state blob is malformed; starting empty");
        })?;
        self.restore(&value, columns, types, settings)
    }

    pub fn restore(
        &mut self,
        value: &JsonValue,
        columns: &Columns,
        types: &ColumnTypes,
        settings: &FormatSettings,
    ) -> Result<RestoreReport, PersistError> {
        self.clear();
        let result = self.restore_sections(value, columns, types, settings);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn restore_sections(
        &mut self,
        value: &JsonValue,
        columns: &Columns,
        types: &ColumnTypes,
        settings: &FormatSettings,
    ) -> Result<RestoreReport, PersistError> {
        let root = value.as_object().ok_or(PersistError::Shape {
            field: "<root>",
            expected: "an object",
        })?;
        let mut report = RestoreReport::default();

        // Deletions first so edits of deleted rows are never resurrected.
        if let Some(deleted) = section(root, "deleted_rows", JsonValue::as_array, "an array")? {
            for entry in deleted {
                match entry.as_u64().map(|d| d as usize) {
                    Some(d) if self.delete_original(d) => report.deleted_rows += 1,
                    _ => report.skip(format!("deleted_rows: `{entry}` is not a base row")),
                }
            }
        }

        if let Some(edited) = section(root, "edited_rows", JsonValue::as_object, "an object")? {
            for (key, cells) in edited {
                let Some(original) = key.parse::<usize>().ok().filter(|o| *o < self.baseline())
                else {
                    report.skip(format!("edited_rows: `{key}` is not a base row"));
                    continue;
                };
                if self.is_deleted(original) {
                    report.skip(format!("edited_rows: row {original} is deleted"));
                    continue;
                }
                let Some(cells) = cells.as_object() else {
                    report.skip(format!("edited_rows.{key}: expected an object"));
                    continue;
                };
                for (col, cell) in decode_row(cells, columns, types, settings, &mut report) {
                    if self.set_base_cell(original, col, cell) {
                        report.edited_cells += 1;
                    }
                }
            }
        }

        if let Some(added) = section(root, "added_rows", JsonValue::as_array, "an array")? {
            for (slot, row) in added.iter().enumerate() {
                let Some(cells) = row.as_object() else {
                    report.skip(format!("added_rows[{slot}]: expected an object"));
                    continue;
                };
                let row = decode_row(cells, columns, types, settings, &mut report);
                self.append_row(row.into_iter().collect());
                report.added_rows += 1;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            edited = report.edited_cells,
            added = report.added_rows,
            deleted = report.deleted_rows,
            skipped = report.skipped.len(),
            "restored overlay state"
        );
        Ok(report)
    }
}

fn section<'a, T: ?Sized>(
    root: &'a Map<String, JsonValue>,
    field: &'static str,
    cast: impl FnOnce(&'a JsonValue) -> Option<&'a T>,
    expected: &'static str,
) -> Result<Option<&'a T>, PersistError> {
    match root.get(field) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => cast(v)
            .map(Some)
            .ok_or(PersistError::Shape { field, expected }),
    }
}

fn decode_row(
    cells: &Map<String, JsonValue>,
    columns: &Columns,
    types: &ColumnTypes,
    settings: &FormatSettings,
    report: &mut RestoreReport,
) -> Vec<(usize, sheetdelta_common::Cell)> {
    let mut out = Vec::with_capacity(cells.len());
    for (id, raw) in cells {
        let Some((col, column)) = columns.by_id(id) else {
            report.skip(format!("unknown column id `{id}`"));
            continue;
        };
        let Some(ty) = column_type(types, column) else {
            report.skip(format!("no column type for `{}` ({})", id, column.kind));
            continue;
        };
        out.push((col, ty.create_cell(&CellValue::from_json(raw), column, settings)));
    }
    out
}

fn row_is_complete(row: &RowCells, columns: &Columns, types: &ColumnTypes) -> bool {
    columns.iter().all(|(col, column)| {
        let editable = column_type(types, column).map_or(column.editable, |ty| ty.can_edit(column));
        if !(column.required && editable) {
            return true;
        }
        row.get(&col).is_some_and(|cell| !cell.missing && !cell.value.is_empty())
    })
}
