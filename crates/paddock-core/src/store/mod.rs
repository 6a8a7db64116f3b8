//! Persistence boundary
//!
//! The setup core talks to its backing store through [`RowStore`], a small
//! row-oriented interface (select / insert / update / upsert / delete with
//! equality filters, one order-by column and a row limit). Rows are JSON
//! objects so any hosted relational backend can sit behind it.
//!
//! Two backends ship with the crate:
//! - [`MemoryStore`] keeps rows in process (tests, offline sessions)
//! - [`JsonFileStore`] persists each table as a JSON file on disk

mod error;
mod file;
mod memory;
mod query;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use query::{Filter, Order, Query};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored row
pub type Row = Map<String, Value>;

/// Column holding the event-car key on every setup table
pub const EVENT_CAR_ID: &str = "event_car_id";
/// Primary key column of append-only tables
pub const ID: &str = "id";
/// Creation timestamp column of append-only tables
pub const CREATED_AT: &str = "created_at";

/// Tables used by the setup core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Current setup record, one row per event-car
    EventCarSetup,
    /// Append-only setup snapshots
    EventCarSetupHistory,
    /// Append-only narrative log
    EventCarLogs,
}

impl Table {
    /// Every table, in a fixed order
    pub const ALL: [Table; 3] = [
        Table::EventCarSetup,
        Table::EventCarSetupHistory,
        Table::EventCarLogs,
    ];

    /// Backend table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::EventCarSetup => "event_car_setup",
            Table::EventCarSetupHistory => "event_car_setup_history",
            Table::EventCarLogs => "event_car_logs",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Row-oriented store consumed by the setup core
///
/// Implementations must give `upsert` insert-if-absent / update-if-present
/// semantics on `conflict_column` and never keep two rows with the same
/// value in that column.
pub trait RowStore: Send + Sync {
    /// Fetch rows matching a query
    fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Append a row, returning it as stored
    fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Merge `changes` into every row matching `filters`, returning the count
    fn update(&self, table: Table, filters: &[Filter], changes: Row) -> Result<usize, StoreError>;

    /// Insert `row`, or update the row whose `conflict_column` matches it
    fn upsert(&self, table: Table, row: Row, conflict_column: &str) -> Result<Row, StoreError>;

    /// Remove every row matching `filters`, returning the count
    fn delete(&self, table: Table, filters: &[Filter]) -> Result<usize, StoreError>;
}

/// Serialize a value into a row
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Corrupt(format!(
            "expected an object, got {}",
            other
        ))),
        Err(e) => Err(StoreError::Corrupt(e.to_string())),
    }
}

/// Deserialize a row into a value
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        event_car_id: String,
        value: f64,
    }

    #[test]
    fn test_row_conversion() {
        let sample = Sample {
            event_car_id: "ec-1".into(),
            value: 1.5,
        };
        let row = to_row(&sample).unwrap();
        assert_eq!(row.get(EVENT_CAR_ID), Some(&json!("ec-1")));

        let back: Sample = from_row(row).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_corrupt_row() {
        let mut row = Row::new();
        row.insert("value".into(), json!("not a number"));
        let result: Result<Sample, _> = from_row(row);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_table_names() {
        let names: Vec<_> = Table::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["event_car_setup", "event_car_setup_history", "event_car_logs"]
        );
    }
}
