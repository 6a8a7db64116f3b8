//! Setup core errors

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Errors raised by the setup core
///
/// Nothing here is fatal to the process: every variant is recoverable by the
/// caller, and a missing setup record is not an error at all (see
/// [`crate::setup::SetupStore::load`]).
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Value {value} for '{path}' is outside [{min}, {max}]")]
    OutOfRange {
        path: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Value {value} for '{path}' is not a finite number")]
    NonFinite { path: String, value: f64 },

    #[error("Invalid setup path '{0}'")]
    InvalidPath(String),

    #[error("Invalid range for '{path}': {reason}")]
    InvalidRange { path: String, reason: String },

    #[error("History entry not found: {0}")]
    HistoryNotFound(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
