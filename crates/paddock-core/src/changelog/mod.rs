//! Change Log
//!
//! Narrative "what changed, when" entries per event-car. Every logical save
//! appends exactly one entry; entries are observational and never read back
//! to rebuild state. There is no retention policy.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::SetupError;
use crate::setup::EventCarId;
use crate::store::{from_row, to_row, Order, Query, RowStore, Table, CREATED_AT, EVENT_CAR_ID};

/// Short label describing a logged action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogAction {
    SetupSaved,
    SetupRestored,
    CheckupSaved,
    FuelSaved,
    Custom(String),
}

impl LogAction {
    pub fn label(&self) -> &str {
        match self {
            LogAction::SetupSaved => "Setup saved",
            LogAction::SetupRestored => "Setup restored",
            LogAction::CheckupSaved => "Checkup saved",
            LogAction::FuelSaved => "Fuel saved",
            LogAction::Custom(label) => label,
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for LogAction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Setup saved" => LogAction::SetupSaved,
            "Setup restored" => LogAction::SetupRestored,
            "Checkup saved" => LogAction::CheckupSaved,
            "Fuel saved" => LogAction::FuelSaved,
            _ => LogAction::Custom(label),
        }
    }
}

impl From<LogAction> for String {
    fn from(action: LogAction) -> Self {
        action.label().to_string()
    }
}

/// A single change-log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub event_car_id: EventCarId,
    pub action: LogAction,
    #[serde(default)]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entries returned by [`ChangeLog::recent`] when no limit is given
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Append-only change log backed by the `event_car_logs` table
#[derive(Clone)]
pub struct ChangeLog {
    backend: Arc<dyn RowStore>,
    default_limit: usize,
}

impl ChangeLog {
    pub fn new(backend: Arc<dyn RowStore>) -> Self {
        Self {
            backend,
            default_limit: DEFAULT_LOG_LIMIT,
        }
    }

    /// Use a different limit when `recent` is called without one
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Append an entry (no dedup, no rate limiting)
    pub fn append(
        &self,
        event_car_id: &EventCarId,
        action: LogAction,
        details: Option<String>,
    ) -> Result<LogEntry, SetupError> {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            event_car_id: event_car_id.clone(),
            action,
            details,
            created_at: clock::now(),
        };
        self.backend.insert(Table::EventCarLogs, to_row(&entry)?)?;
        Ok(entry)
    }

    /// Most recent entries, newest first
    pub fn recent(
        &self,
        event_car_id: &EventCarId,
        limit: Option<usize>,
    ) -> Result<Vec<LogEntry>, SetupError> {
        let query = Query::from(Table::EventCarLogs)
            .eq(EVENT_CAR_ID, event_car_id.as_str())
            .order_by(CREATED_AT, Order::Descending)
            .limit(limit.unwrap_or(self.default_limit));

        let entries = self
            .backend
            .select(&query)?
            .into_iter()
            .map(from_row)
            .collect::<Result<Vec<LogEntry>, _>>()?;
        Ok(entries)
    }
}
