//! Setup History
//!
//! Immutable snapshots of a setup record, one per successful save. Entries
//! are never edited; they are only removed by an explicit [`HistoryLog::delete`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock;
use crate::error::SetupError;
use crate::setup::{EventCarId, SetupDiff, SetupRecord, SetupSnapshot};
use crate::store::{
    from_row, to_row, Filter, Order, Query, RowStore, Table, CREATED_AT, EVENT_CAR_ID, ID,
};

/// A stored snapshot of a setup record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub event_car_id: EventCarId,
    pub snapshot: SetupSnapshot,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Compare this version against a newer one
    pub fn diff(&self, newer: &HistoryEntry) -> SetupDiff {
        SetupDiff::compare(&self.snapshot, &newer.snapshot)
    }
}

/// Versions returned by [`HistoryLog::recent`] when no limit is given
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Append-only history of setup versions
#[derive(Clone)]
pub struct HistoryLog {
    backend: Arc<dyn RowStore>,
    default_limit: usize,
}

impl HistoryLog {
    pub fn new(backend: Arc<dyn RowStore>) -> Self {
        Self {
            backend,
            default_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Use a different limit when `recent` is called without one
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Append a snapshot of `record`
    pub fn record(&self, record: &SetupRecord) -> Result<HistoryEntry, SetupError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            event_car_id: record.event_car_id.clone(),
            snapshot: record.snapshot(),
            created_at: clock::now(),
        };
        self.backend
            .insert(Table::EventCarSetupHistory, to_row(&entry)?)?;
        Ok(entry)
    }

    /// Most recent entries for an event-car, newest first
    pub fn recent(
        &self,
        event_car_id: &EventCarId,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, SetupError> {
        let query = Query::from(Table::EventCarSetupHistory)
            .eq(EVENT_CAR_ID, event_car_id.as_str())
            .order_by(CREATED_AT, Order::Descending)
            .limit(limit.unwrap_or(self.default_limit));

        let rows = self.backend.select(&query)?;
        let entries = rows
            .into_iter()
            .map(from_row)
            .collect::<Result<Vec<HistoryEntry>, _>>()?;
        Ok(entries)
    }

    /// Fetch one entry by id
    pub fn get(&self, entry_id: Uuid) -> Result<Option<HistoryEntry>, SetupError> {
        let query = Query::from(Table::EventCarSetupHistory)
            .eq(ID, entry_id.to_string())
            .limit(1);
        match self.backend.select(&query)?.into_iter().next() {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Delete one entry; returns whether it existed
    pub fn delete(&self, entry_id: Uuid) -> Result<bool, SetupError> {
        let removed = self.backend.delete(
            Table::EventCarSetupHistory,
            &[Filter::eq(ID, entry_id.to_string())],
        )?;
        Ok(removed > 0)
    }
}
