//! Sparse edit overlay for read-only tables.
//!
//! [`EditOverlay`] records edited cells (by original row index), appended
//! rows and deleted rows against a base dataset it never touches, and
//! translates between visible and original row coordinates. [`Columns`]
//! bridges column positions and persistence ids for the JSON state blob.

mod columns;
mod error;
mod overlay;
mod persist;

pub use columns::Columns;
pub use error::{OverlayError, PersistError};
pub use overlay::{EditOverlay, RowCells, RowRef};
pub use persist::RestoreReport;
