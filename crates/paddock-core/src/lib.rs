//! # Paddock Core Library
//!
//! Technical setup model for a racing team's cars.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The event-car setup record (structured fields + dotted-path extras)
//! - Range validation for every tunable parameter
//! - Bounded setup history and a narrative change log
//! - A row-store persistence boundary with in-memory and JSON file backends
//! - Debounced autosave and an edit session tying it together
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paddock_core::prelude::*;
//!
//! let store = Arc::new(SetupStore::new(Arc::new(MemoryStore::new())));
//! let validator = Arc::new(RangeValidator::default());
//! let mut editor = SetupEditor::open(store, validator, &PaddockConfig::default(), "ec-42".into())?;
//!
//! editor.set_extra("front.fl.pressure", 1.9)?;
//! editor.save()?;
//! ```

pub mod autosave;
pub mod changelog;
mod clock;
pub mod config;
pub mod editor;
pub mod error;
pub mod history;
pub mod range;
pub mod setup;
pub mod store;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::autosave::{AutosaveEvent, Autosaver};
    pub use crate::changelog::{ChangeLog, LogAction, LogEntry};
    pub use crate::config::PaddockConfig;
    pub use crate::editor::SetupEditor;
    pub use crate::error::SetupError;
    pub use crate::history::{HistoryEntry, HistoryLog};
    pub use crate::range::{RangePolicy, RangeRegistry, RangeSpec, RangeValidator};
    pub use crate::setup::{
        EventCarId, Extras, SetupDiff, SetupField, SetupFields, SetupPatch, SetupPath, SetupRecord,
        SetupStore,
    };
    pub use crate::store::{JsonFileStore, MemoryStore, RowStore, StoreError, Table};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
