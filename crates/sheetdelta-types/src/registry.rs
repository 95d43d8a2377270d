use crate::ColumnType;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sheetdelta_common::DataKind;
use std::sync::Arc;

static REG: Lazy<DashMap<DataKind, Arc<dyn ColumnType>>> = Lazy::new(DashMap::new);

/// Register (or replace) the strategy for `ty.kind()`. Last registration
/// for a kind wins. Call at startup, before any provider snapshots the
/// registry.
pub fn register(ty: Arc<dyn ColumnType>) {
    #[cfg(feature = "tracing")]
    tracing::debug!(kind = %ty.kind(), "registering column type");
    REG.insert(ty.kind(), ty);
}

pub fn get(kind: DataKind) -> Option<Arc<dyn ColumnType>> {
    REG.get(&kind).map(|v| Arc::clone(v.value()))
}

/// All registered strategies in `DataKind` order.
pub fn get_all() -> Vec<Arc<dyn ColumnType>> {
    DataKind::ALL.iter().filter_map(|k| get(*k)).collect()
}

/// Freeze the current registry contents into an enum-indexed table.
pub fn snapshot() -> ColumnTypes {
    let mut types = ColumnTypes::new();
    for ty in get_all() {
        types.insert(ty);
    }
    types
}

/// Enum-indexed, read-only view of column type strategies.
///
/// Lookups are a bounds-checked array index, which keeps the per-cell read
/// path free of hashing and locking.
#[derive(Debug, Clone, Default)]
pub struct ColumnTypes {
    slots: [Option<Arc<dyn ColumnType>>; DataKind::COUNT],
}

impl ColumnTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the builtin strategies, independent of the global registry.
    pub fn builtin() -> Self {
        let mut types = Self::new();
        for ty in crate::builtins::all() {
            types.insert(ty);
        }
        types
    }

    pub fn insert(&mut self, ty: Arc<dyn ColumnType>) {
        let slot = ty.kind().slot();
        self.slots[slot] = Some(ty);
    }

    pub fn with(mut self, ty: Arc<dyn ColumnType>) -> Self {
        self.insert(ty);
        self
    }

    #[inline]
    pub fn get(&self, kind: DataKind) -> Option<&dyn ColumnType> {
        self.slots[kind.slot()].as_deref()
    }

    pub fn contains(&self, kind: DataKind) -> bool {
        self.slots[kind.slot()].is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ColumnType> + '_ {
        self.slots.iter().filter_map(|s| s.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::TextType;

    #[test]
    fn builtin_snapshot_covers_every_kind() {
        let types = ColumnTypes::builtin();
        for kind in DataKind::ALL {
            let ty = types.get(kind).expect("builtin registered");
            assert_eq!(ty.kind(), kind);
        }
        assert_eq!(types.iter().count(), DataKind::COUNT);
    }

    #[test]
    fn empty_snapshot_has_no_slots() {
        let types = ColumnTypes::new();
        assert!(!types.contains(DataKind::Text));
        let types = types.with(Arc::new(TextType));
        assert!(types.contains(DataKind::Text));
        assert!(types.get(DataKind::Number).is_none());
    }

    #[test]
    fn global_registry_returns_registered_type() {
        register(Arc::new(TextType));
        let ty = get(DataKind::Text).expect("text registered");
        assert_eq!(ty.kind(), DataKind::Text);
        assert!(get_all().iter().any(|t| t.kind() == DataKind::Text));
    }
}
