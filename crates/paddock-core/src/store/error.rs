//! Persistence boundary errors

use thiserror::Error;

/// Errors reported by a [`super::RowStore`] backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Write rejected by backend: {0}")]
    Rejected(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Row is missing column '{0}'")]
    MissingColumn(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
