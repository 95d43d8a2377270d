use serde_json::Value as JsonValue;
use sheetdelta_common::{Cell, CellValue, ColumnDef, FormatSettings, TableSchema};
use sheetdelta_overlay::{Columns, EditOverlay, OverlayError, RestoreReport, RowCells, RowRef};
use sheetdelta_types::{ColumnType, ColumnTypes};

use crate::{BaseData, EditPolicy, ProviderConfig, ProviderError};

/// Base data, column types and an edit overlay merged behind one cell API.
///
/// Rows are addressed in the overlay's visible space: surviving base rows in
/// original order, then appended rows. Sorted or filtered presentations map
/// their own rows onto this space with a [`crate::RowView`].
#[derive(Debug)]
pub struct DataProvider<B> {
    base: B,
    columns: Columns,
    types: ColumnTypes,
    settings: FormatSettings,
    config: ProviderConfig,
    overlay: EditOverlay,
}

impl<B: BaseData> DataProvider<B> {
    /// Uses the process-wide column type registry (builtins are loaded on
    /// first use).
    pub fn new(base: B, columns: Vec<ColumnDef>) -> Result<Self, ProviderError> {
        sheetdelta_types::ensure_builtins_loaded();
        Self::with_types(base, columns, sheetdelta_types::registry::snapshot())
    }

    pub fn from_schema(base: B, schema: &TableSchema) -> Result<Self, ProviderError> {
        let provider = Self::new(base, schema.columns.clone())?;
        Ok(provider.with_settings(schema.settings.clone()))
    }

    /// Every column's kind must have a strategy in `types`.
    pub fn with_types(
        base: B,
        columns: Vec<ColumnDef>,
        types: ColumnTypes,
    ) -> Result<Self, ProviderError> {
        let columns = Columns::new(columns)?;
        if let Some((_, missing)) = columns.iter().find(|(_, c)| !types.contains(c.kind)) {
            return Err(ProviderError::MissingType { kind: missing.kind });
        }
        let overlay = EditOverlay::new(base.row_count());
        Ok(Self {
            base,
            columns,
            types,
            settings: FormatSettings::default(),
            config: ProviderConfig::default(),
            overlay,
        })
    }

    pub fn with_settings(mut self, settings: FormatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn types(&self) -> &ColumnTypes {
        &self.types
    }

    pub fn settings(&self) -> &FormatSettings {
        &self.settings
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn overlay(&self) -> &EditOverlay {
        &self.overlay
    }

    pub fn num_rows(&self) -> usize {
        self.overlay.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn original_row_index(&self, visible: usize) -> Option<usize> {
        self.overlay.original_row_index(visible)
    }

    pub fn is_appended_row(&self, visible: usize) -> bool {
        self.overlay.is_appended_row(visible)
    }

    fn column(&self, col: usize) -> Result<(&ColumnDef, &dyn ColumnType), ProviderError> {
        let def = self
            .columns
            .by_index(col)
            .ok_or(ProviderError::UnknownColumn { col })?;
        let ty = self
            .types
            .get(def.kind)
            .ok_or(ProviderError::MissingType { kind: def.kind })?;
        Ok((def, ty))
    }

    fn index_of(&self, id: &str) -> Result<usize, ProviderError> {
        self.columns
            .index_of(id)
            .ok_or_else(|| ProviderError::UnknownColumnId { id: id.to_string() })
    }

    /// Cell at a visible position; `None` only for unknown columns and
    /// out-of-range rows.
    ///
    /// Overlay cells are re-rendered against the current column format and
    /// settings on every read, so display text never reflects the format that
    /// was active when the edit was made.
    pub fn cell(&self, col: usize, visible: usize) -> Option<Cell> {
        let (def, ty) = self.column(col).ok()?;
        let row = self.overlay.resolve(visible)?;
        if let Some(stored) = self.overlay.get_cell(col, visible) {
            return Some(ty.refresh_cell(stored, def, &self.settings));
        }
        let raw = match row {
            RowRef::Base(original) => self.base.raw_value(col, original),
            RowRef::Appended(_) => CellValue::Empty,
        };
        Some(ty.create_cell(&raw, def, &self.settings))
    }

    pub fn cell_by_id(&self, id: &str, visible: usize) -> Option<Cell> {
        self.cell(self.columns.index_of(id)?, visible)
    }

    /// Typed values of one visible row, in column order.
    pub fn row_values(&self, visible: usize) -> Option<Vec<CellValue>> {
        self.overlay.resolve(visible)?;
        Some(
            (0..self.columns.len())
                .map(|col| self.cell(col, visible).map(|c| c.value).unwrap_or_default())
                .collect(),
        )
    }

    /// Parse, correct (per [`EditPolicy`]) and validate `value`, then store
    /// it. On any error the overlay is untouched.
    pub fn set_cell(
        &mut self,
        col: usize,
        visible: usize,
        value: impl Into<CellValue>,
    ) -> Result<Cell, ProviderError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("set_cell", col, row = visible).entered();

        if self.overlay.resolve(visible).is_none() {
            return Err(OverlayError::RowOutOfRange {
                row: visible,
                num_rows: self.overlay.num_rows(),
            }
            .into());
        }
        let cell = self.prepare_cell(col, visible, &value.into())?;
        self.overlay.set_cell(col, visible, cell.clone())?;
        Ok(cell)
    }

    pub fn set_cell_by_id(
        &mut self,
        id: &str,
        visible: usize,
        value: impl Into<CellValue>,
    ) -> Result<Cell, ProviderError> {
        let col = self.index_of(id)?;
        self.set_cell(col, visible, value)
    }

    fn prepare_cell(&self, col: usize, row: usize, input: &CellValue) -> Result<Cell, ProviderError> {
        let (def, ty) = self.column(col)?;
        if !ty.can_edit(def) {
            return Err(ProviderError::ReadOnly {
                column: def.id.clone(),
            });
        }
        let reject = |failure| {
            #[cfg(feature = "tracing")]
            tracing::warn!(column = %def.id, row, %failure, "edit rejected");
            ProviderError::Rejected {
                column: def.id.clone(),
                row,
                failure,
            }
        };

        let mut value = ty.coerce_input(input, def, &self.settings).map_err(reject)?;
        if self.config.edit_policy == EditPolicy::AutoCorrect {
            if let Some(fixed) = ty.auto_correct(&value, def) {
                value = fixed;
            }
        }
        ty.validate_value(&value, def).map_err(reject)?;
        Ok(ty.build_cell(value, def, &self.settings))
    }

    /// Undo the overlay entry of one cell; the base value shows again.
    pub fn revert_cell(&mut self, col: usize, visible: usize) -> Option<Cell> {
        self.overlay.revert_cell(col, visible)
    }

    fn default_cells(&self) -> RowCells {
        let mut cells = RowCells::default();
        for (col, def) in self.columns.iter() {
            let Some(ty) = self.types.get(def.kind) else {
                continue;
            };
            let value = ty.default_value(def);
            if !value.is_empty() {
                cells.insert(col, ty.build_cell(value, def, &self.settings));
            }
        }
        cells
    }

    /// Append a row filled with column defaults (evaluated now). Returns its
    /// visible index.
    pub fn append_row(&mut self) -> usize {
        let cells = self.default_cells();
        self.overlay.append_row(cells)
    }

    /// Append a row with explicit values by column id, on top of defaults.
    /// Every value goes through the same checks as [`Self::set_cell`]; if any
    /// fails, nothing is appended.
    pub fn append_row_with<'a, I, V>(&mut self, values: I) -> Result<usize, ProviderError>
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Into<CellValue>,
    {
        let row = self.overlay.num_rows();
        let mut cells = self.default_cells();
        for (id, value) in values {
            let col = self.index_of(id)?;
            let cell = self.prepare_cell(col, row, &value.into())?;
            cells.insert(col, cell);
        }
        Ok(self.overlay.append_row(cells))
    }

    pub fn delete_row(&mut self, visible: usize) -> bool {
        self.overlay.delete_row(visible)
    }

    pub fn delete_rows(&mut self, visible: &[usize]) -> usize {
        self.overlay.delete_rows(visible)
    }

    /// Change a column's display format. Stored values are kept; every read
    /// afterwards renders with the new format.
    pub fn set_column_format(
        &mut self,
        col: usize,
        format: Option<&str>,
    ) -> Result<(), ProviderError> {
        if self.columns.set_format(col, format.map(str::to_string)) {
            Ok(())
        } else {
            Err(ProviderError::UnknownColumn { col })
        }
    }

    pub fn set_format_settings(&mut self, settings: FormatSettings) {
        self.settings = settings;
    }

    /// Swap in a new base dataset. The overlay is discarded.
    pub fn reload(&mut self, base: B) -> B {
        #[cfg(feature = "tracing")]
        tracing::info!(
            rows = base.row_count(),
            discarded = self.overlay.has_changes(),
            "reloading base data"
        );
        self.overlay = EditOverlay::new(base.row_count());
        std::mem::replace(&mut self.base, base)
    }

    /// Discard every unsaved change.
    pub fn reset(&mut self) {
        self.overlay.clear();
    }

    pub fn save_state(&self) -> JsonValue {
        self.overlay.to_json(&self.columns, &self.types)
    }

    pub fn save_state_string(&self) -> String {
        self.overlay.to_json_string(&self.columns, &self.types)
    }

    /// Replace the overlay with a saved blob. A malformed blob leaves the
    /// provider with no edits.
    pub fn restore_state(&mut self, json: &str) -> Result<RestoreReport, ProviderError> {
        Ok(self
            .overlay
            .restore_str(json, &self.columns, &self.types, &self.settings)?)
    }

    pub fn restore_state_value(&mut self, json: &JsonValue) -> Result<RestoreReport, ProviderError> {
        Ok(self
            .overlay
            .restore(json, &self.columns, &self.types, &self.settings)?)
    }
}
