use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("row {row} is out of range ({num_rows} visible rows)")]
    RowOutOfRange { row: usize, num_rows: usize },
    #[error("duplicate column id `{id}`")]
    DuplicateColumn { id: String },
}

/// Failure to restore a persisted state blob. The overlay is left empty.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("state blob field `{field}` must be {expected}")]
    Shape {
        field: &'static str,
        expected: &'static str,
    },
}
