use rustc_hash::FxHashMap;
use sheetdelta_common::{ColumnDef, TableSchema};

use crate::OverlayError;

/// Column definitions addressable both by position (the overlay's key) and
/// by persistence id (the state blob's key).
#[derive(Debug, Clone, Default)]
pub struct Columns {
    defs: Vec<ColumnDef>,
    by_id: FxHashMap<String, usize>,
}

impl Columns {
    pub fn new(defs: Vec<ColumnDef>) -> Result<Self, OverlayError> {
        let mut by_id = FxHashMap::default();
        for (idx, def) in defs.iter().enumerate() {
            if by_id.insert(def.id.clone(), idx).is_some() {
                return Err(OverlayError::DuplicateColumn { id: def.id.clone() });
            }
        }
        Ok(Self { defs, by_id })
    }

    pub fn from_schema(schema: &TableSchema) -> Result<Self, OverlayError> {
        Self::new(schema.columns.clone())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    #[inline]
    pub fn by_index(&self, index: usize) -> Option<&ColumnDef> {
        self.defs.get(index)
    }

    pub fn by_id(&self, id: &str) -> Option<(usize, &ColumnDef)> {
        let idx = *self.by_id.get(id)?;
        Some((idx, &self.defs[idx]))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ColumnDef)> + '_ {
        self.defs.iter().enumerate()
    }

    pub fn as_slice(&self) -> &[ColumnDef] {
        &self.defs
    }

    /// Change a column's display format. Ids and positions are unaffected.
    pub fn set_format(&mut self, index: usize, format: Option<String>) -> bool {
        match self.defs.get_mut(index) {
            Some(def) => {
                def.format = format;
                true
            }
            None => false,
        }
    }
}
