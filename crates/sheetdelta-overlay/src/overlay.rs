use rustc_hash::FxHashMap;
use sheetdelta_common::Cell;

use crate::OverlayError;

/// Cells of one row, keyed by column index.
pub type RowCells = FxHashMap<usize, Cell>;

/// Where a visible row lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowRef {
    /// Row of the base dataset, by original index.
    Base(usize),
    /// Slot in the appended-rows list.
    Appended(usize),
}

/// Unsaved changes against an immutable base dataset of `baseline` rows.
///
/// Visible rows are the surviving base rows in original order followed by the
/// appended rows in append order:
///
/// ```text
/// original:  0 1 2 3 4 5        deleted = [1, 4]
/// visible:   0 . 1 2 . 3 | 4 5  (appended slots 0, 1)
/// ```
///
/// Edits of base rows are keyed by original index and therefore survive
/// deletions of other rows. Appended rows are addressed by slot, which shifts
/// when an earlier appended row is deleted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOverlay {
    baseline: usize,
    edited: FxHashMap<usize, RowCells>,
    added: Vec<RowCells>,
    /// Sorted ascending, no duplicates, all `< baseline`.
    deleted: Vec<usize>,
}

impl EditOverlay {
    pub fn new(baseline: usize) -> Self {
        Self {
            baseline,
            ..Self::default()
        }
    }

    /// Row count of the base dataset this overlay was created for.
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    pub fn num_rows(&self) -> usize {
        self.baseline + self.added.len() - self.deleted.len()
    }

    /// Number of base rows still visible.
    #[inline]
    fn visible_base_rows(&self) -> usize {
        self.baseline - self.deleted.len()
    }

    /// True for visible indices past the surviving base rows, including
    /// indices past the end.
    #[inline]
    pub fn is_appended_row(&self, visible: usize) -> bool {
        visible >= self.visible_base_rows()
    }

    /// Forward accumulation: every deleted original at or before the
    /// running candidate pushes it one further.
    fn translate(&self, visible: usize) -> usize {
        let mut idx = visible;
        for &d in &self.deleted {
            if d > idx {
                break;
            }
            idx += 1;
        }
        idx
    }

    /// `None` when `visible` is out of range.
    pub fn resolve(&self, visible: usize) -> Option<RowRef> {
        if visible >= self.num_rows() {
            return None;
        }
        if self.is_appended_row(visible) {
            Some(RowRef::Appended(visible - self.visible_base_rows()))
        } else {
            Some(RowRef::Base(self.translate(visible)))
        }
    }

    /// Original index of a visible base row; `None` for appended rows and
    /// out-of-range indices.
    pub fn original_row_index(&self, visible: usize) -> Option<usize> {
        match self.resolve(visible)? {
            RowRef::Base(original) => Some(original),
            RowRef::Appended(_) => None,
        }
    }

    /// Inverse of [`Self::resolve`].
    pub fn visible_row(&self, row: RowRef) -> Option<usize> {
        match row {
            RowRef::Base(original) => {
                if original >= self.baseline || self.is_deleted(original) {
                    return None;
                }
                Some(original - self.deleted.partition_point(|&d| d < original))
            }
            RowRef::Appended(slot) => {
                (slot < self.added.len()).then(|| self.visible_base_rows() + slot)
            }
        }
    }

    pub fn is_deleted(&self, original: usize) -> bool {
        self.deleted.binary_search(&original).is_ok()
    }

    /// Overlay cell at a visible position. `None` means "defer to base data"
    /// for base rows, and "never set" for appended rows.
    pub fn get_cell(&self, col: usize, visible: usize) -> Option<&Cell> {
        match self.resolve(visible)? {
            RowRef::Base(original) => self.edited.get(&original)?.get(&col),
            RowRef::Appended(slot) => self.added.get(slot)?.get(&col),
        }
    }

    pub fn set_cell(&mut self, col: usize, visible: usize, cell: Cell) -> Result<(), OverlayError> {
        let row = self.resolve(visible).ok_or(OverlayError::RowOutOfRange {
            row: visible,
            num_rows: self.num_rows(),
        })?;
        self.row_cells_mut(row).insert(col, cell);
        Ok(())
    }

    /// Drop the overlay entry for one cell, returning it. Appended rows keep
    /// their slot even when their last cell is reverted.
    pub fn revert_cell(&mut self, col: usize, visible: usize) -> Option<Cell> {
        match self.resolve(visible)? {
            RowRef::Base(original) => {
                let row = self.edited.get_mut(&original)?;
                let removed = row.remove(&col);
                if row.is_empty() {
                    self.edited.remove(&original);
                }
                removed
            }
            RowRef::Appended(slot) => self.added.get_mut(slot)?.remove(&col),
        }
    }

    /// Append a row and return its visible index.
    pub fn append_row(&mut self, cells: RowCells) -> usize {
        self.added.push(cells);
        self.num_rows() - 1
    }

    /// Delete one visible row. `false` when the index was out of range.
    pub fn delete_row(&mut self, visible: usize) -> bool {
        self.delete_rows(&[visible]) == 1
    }

    /// Delete several visible rows, all addressed against the state before
    /// the call. Duplicates and out-of-range indices are ignored. Returns the
    /// number of rows removed.
    pub fn delete_rows(&mut self, visible: &[usize]) -> usize {
        let mut originals = Vec::new();
        let mut slots = Vec::new();
        for &v in visible {
            match self.resolve(v) {
                Some(RowRef::Base(original)) => originals.push(original),
                Some(RowRef::Appended(slot)) => slots.push(slot),
                None => {}
            }
        }
        originals.sort_unstable();
        originals.dedup();
        slots.sort_unstable();
        slots.dedup();

        let removed = originals.len() + slots.len();
        for original in originals {
            self.delete_original(original);
        }
        for slot in slots.into_iter().rev() {
            self.added.remove(slot);
        }
        removed
    }

    pub fn has_changes(&self) -> bool {
        !self.edited.is_empty() || !self.added.is_empty() || !self.deleted.is_empty()
    }

    /// Number of overridden base-row cells.
    pub fn edited_cell_count(&self) -> usize {
        self.edited.values().map(FxHashMap::len).sum()
    }

    /// Discard every change; the baseline stays.
    pub fn clear(&mut self) {
        self.edited.clear();
        self.added.clear();
        self.deleted.clear();
    }

    /// Edited base rows in ascending original order.
    pub fn edited_rows(&self) -> impl Iterator<Item = (usize, &RowCells)> + '_ {
        let mut keys: Vec<usize> = self.edited.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter()
            .filter_map(move |k| self.edited.get(&k).map(|row| (k, row)))
    }

    pub fn added_rows(&self) -> &[RowCells] {
        &self.added
    }

    pub fn deleted_rows(&self) -> &[usize] {
        &self.deleted
    }

    fn row_cells_mut(&mut self, row: RowRef) -> &mut RowCells {
        match row {
            RowRef::Base(original) => self.edited.entry(original).or_default(),
            RowRef::Appended(slot) => &mut self.added[slot],
        }
    }

    /// Delete a base row by original index. `false` if it is already
    /// deleted or not a base row.
    pub fn delete_original(&mut self, original: usize) -> bool {
        if original >= self.baseline {
            return false;
        }
        match self.deleted.binary_search(&original) {
            Ok(_) => false,
            Err(pos) => {
                self.deleted.insert(pos, original);
                self.edited.remove(&original);
                true
            }
        }
    }

    // Restore path: addresses base rows by original index.
    pub(crate) fn set_base_cell(&mut self, original: usize, col: usize, cell: Cell) -> bool {
        if original >= self.baseline || self.is_deleted(original) {
            return false;
        }
        self.edited.entry(original).or_default().insert(col, cell);
        true
    }
}
