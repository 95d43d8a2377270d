use sheetdelta_common::{DataKind, ValidationFailure};
use sheetdelta_overlay::{OverlayError, PersistError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no column at index {col}")]
    UnknownColumn { col: usize },
    #[error("no column with id `{id}`")]
    UnknownColumnId { id: String },
    #[error("no column type registered for kind `{kind}`")]
    MissingType { kind: DataKind },
    #[error("column `{column}` is read-only")]
    ReadOnly { column: String },
    /// The edit was refused; the overlay is unchanged.
    #[error("rejected edit of `{column}` at row {row}: {failure}")]
    Rejected {
        column: String,
        row: usize,
        #[source]
        failure: ValidationFailure,
    },
    #[error(transparent)]
    Overlay(#[from] OverlayError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl ProviderError {
    /// Validation message of a rejected edit.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            ProviderError::Rejected { failure, .. } => Some(&failure.message),
            _ => None,
        }
    }
}
