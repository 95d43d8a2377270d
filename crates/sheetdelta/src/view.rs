use std::cmp::Ordering;

use sheetdelta_common::CellValue;

use crate::{BaseData, DataProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Permutation from presented rows to the provider's visible rows.
///
/// Views are snapshots: after appends or deletes the view must be rebuilt
/// (see [`RowView::is_stale`]). Edits that keep the row count do not change
/// which row a view entry points at, but a sorted or filtered view may no
/// longer be ordered or filtered correctly until rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    rows: Vec<usize>,
    source_rows: usize,
}

impl RowView {
    pub fn identity(num_rows: usize) -> Self {
        Self {
            rows: (0..num_rows).collect(),
            source_rows: num_rows,
        }
    }

    /// Every visible row of `provider`, ordered by the typed values of
    /// column `col`. Stable; empty cells go last in either order.
    pub fn sorted<B: BaseData>(provider: &DataProvider<B>, col: usize, order: SortOrder) -> Self {
        Self::identity(provider.num_rows()).sort_by(provider, col, order)
    }

    /// Every visible row whose display text contains `query` in any column.
    pub fn filtered<B: BaseData>(provider: &DataProvider<B>, query: &str) -> Self {
        Self::identity(provider.num_rows()).filter(provider, query)
    }

    /// Re-order this view's rows by column `col`.
    pub fn sort_by<B: BaseData>(self, provider: &DataProvider<B>, col: usize, order: SortOrder) -> Self {
        let mut keyed: Vec<(usize, CellValue)> = self
            .rows
            .into_iter()
            .map(|v| (v, provider.cell(col, v).map(|c| c.value).unwrap_or_default()))
            .collect();
        keyed.sort_by(|(_, a), (_, b)| match order {
            SortOrder::Ascending => a.sort_cmp(b),
            SortOrder::Descending => match (a.is_empty(), b.is_empty()) {
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ => b.sort_cmp(a),
            },
        });
        Self {
            rows: keyed.into_iter().map(|(v, _)| v).collect(),
            source_rows: self.source_rows,
        }
    }

    /// Keep rows whose display text contains `query`, ignoring case. An
    /// empty or blank query keeps everything.
    pub fn filter<B: BaseData>(self, provider: &DataProvider<B>, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self;
        }
        let rows = self
            .rows
            .into_iter()
            .filter(|&v| {
                (0..provider.num_columns()).any(|col| {
                    provider
                        .cell(col, v)
                        .is_some_and(|c| c.display.to_lowercase().contains(&needle))
                })
            })
            .collect();
        Self {
            rows,
            source_rows: self.source_rows,
        }
    }

    /// Visible row for a presented row.
    pub fn to_visible(&self, view_row: usize) -> Option<usize> {
        self.rows.get(view_row).copied()
    }

    /// Presented position of a visible row, if the view contains it.
    pub fn position_of(&self, visible: usize) -> Option<usize> {
        self.rows.iter().position(|&v| v == visible)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// True once the provider's row count no longer matches the one this
    /// view was built from.
    pub fn is_stale(&self, num_rows: usize) -> bool {
        self.source_rows != num_rows
    }
}
