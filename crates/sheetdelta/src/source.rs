use sheetdelta_common::CellValue;
use std::sync::Arc;

/// Read-only access to the base dataset.
///
/// `col` is the column's position in the provider's column list and `row` an
/// original row index in `0..row_count()`. Reads must be side-effect free; the
/// overlay never writes through this trait.
pub trait BaseData {
    fn row_count(&self) -> usize;

    /// Raw value at `(col, row)`. Out-of-range reads return `CellValue::Empty`.
    fn raw_value(&self, col: usize, row: usize) -> CellValue;
}

impl<T: BaseData + ?Sized> BaseData for &T {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }
    fn raw_value(&self, col: usize, row: usize) -> CellValue {
        (**self).raw_value(col, row)
    }
}

impl<T: BaseData + ?Sized> BaseData for Arc<T> {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }
    fn raw_value(&self, col: usize, row: usize) -> CellValue {
        (**self).raw_value(col, row)
    }
}

impl<T: BaseData + ?Sized> BaseData for Box<T> {
    fn row_count(&self) -> usize {
        (**self).row_count()
    }
    fn raw_value(&self, col: usize, row: usize) -> CellValue {
        (**self).raw_value(col, row)
    }
}

/// Row-major in-memory table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VecData {
    rows: Vec<Vec<CellValue>>,
}

impl VecData {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

impl BaseData for VecData {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn raw_value(&self, col: usize, row: usize) -> CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or_default()
    }
}

/// Synthetic dataset computed on read, for very large or demo tables.
pub struct GeneratedData<F> {
    rows: usize,
    generate: F,
}

impl<F> GeneratedData<F>
where
    F: Fn(usize, usize) -> CellValue,
{
    /// `generate(col, row)` produces each raw value.
    pub fn new(rows: usize, generate: F) -> Self {
        Self { rows, generate }
    }
}

impl<F> std::fmt::Debug for GeneratedData<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedData").field("rows", &self.rows).finish()
    }
}

impl<F> BaseData for GeneratedData<F>
where
    F: Fn(usize, usize) -> CellValue,
{
    fn row_count(&self) -> usize {
        self.rows
    }

    fn raw_value(&self, col: usize, row: usize) -> CellValue {
        if row >= self.rows {
            return CellValue::Empty;
        }
        (self.generate)(col, row)
    }
}
