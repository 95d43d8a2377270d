//! Column type strategies.
//!
//! A [`ColumnType`] owns everything kind-specific about a column: coercing
//! raw values, validating edits, formatting for display and producing
//! defaults for appended rows. Implementations are registered once at
//! startup in the process-wide [`registry`] and looked up by [`DataKind`];
//! providers take an enum-indexed [`ColumnTypes`] snapshot so the read path
//! never touches the shared map.
//!
//! [`DataKind`]: sheetdelta_common::DataKind

pub mod builtins;
pub mod column_type;
pub mod registry;

pub use builtins::{ensure_builtins_loaded, register_builtins};
pub use column_type::ColumnType;
pub use registry::ColumnTypes;
