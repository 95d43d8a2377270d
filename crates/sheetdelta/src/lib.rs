//! Edit read-only tables without touching them.
//!
//! A [`DataProvider`] combines a [`BaseData`] accessor, the column type
//! strategies of `sheetdelta-types` and an [`EditOverlay`]. Reads merge the
//! overlay over the base data; writes are parsed, validated and recorded in
//! the overlay only. The overlay's state round-trips through a small JSON
//! blob keyed by column id.
//!
//! ```
//! use sheetdelta::{DataProvider, VecData};
//! use sheetdelta::common::{CellValue, ColumnDef, DataKind};
//!
//! let base = VecData::from_rows((0..10).map(|i| vec![CellValue::from(i as f64)]));
//! let mut provider = DataProvider::new(
//!     base,
//!     vec![ColumnDef::new("amount", DataKind::Number)],
//! )?;
//!
//! provider.delete_row(3);
//! provider.append_row();
//! provider.set_cell(0, 3, 250.0)?;
//!
//! assert_eq!(provider.num_rows(), 10);
//! assert_eq!(provider.original_row_index(3), Some(4));
//! assert_eq!(provider.save_state()["edited_rows"]["4"]["amount"], 250);
//! # Ok::<(), sheetdelta::ProviderError>(())
//! ```

mod config;
mod error;
mod provider;
mod source;
mod view;

pub use config::{EditPolicy, ProviderConfig};
pub use error::ProviderError;
pub use provider::DataProvider;
pub use source::{BaseData, GeneratedData, VecData};
pub use view::{RowView, SortOrder};

pub use sheetdelta_overlay::{
    Columns, EditOverlay, OverlayError, PersistError, RestoreReport, RowCells, RowRef,
};
pub use sheetdelta_types::{ColumnType, ColumnTypes, ensure_builtins_loaded};

pub use sheetdelta_common as common;
pub use sheetdelta_types as types;
