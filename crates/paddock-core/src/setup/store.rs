//! Setup record store
//!
//! Loads, merges and persists the current setup record for an event-car,
//! writing a history snapshot and a change-log entry as side effects of
//! every successful save.
//!
//! Concurrent editors of the same event-car race: whichever save lands last
//! wins and silently overwrites the other's patch. No version token is kept.

use std::sync::Arc;

use uuid::Uuid;

use super::diff::SetupDiff;
use super::patch::SetupPatch;
use super::record::{EventCarId, SetupRecord};
use crate::changelog::{ChangeLog, LogAction};
use crate::clock;
use crate::config::PaddockConfig;
use crate::error::SetupError;
use crate::history::HistoryLog;
use crate::store::{from_row, to_row, Query, RowStore, Table, EVENT_CAR_ID};

/// Owns the current setup record per event-car
pub struct SetupStore {
    backend: Arc<dyn RowStore>,
    history: HistoryLog,
    changelog: ChangeLog,
}

impl SetupStore {
    /// Create a store over an explicitly passed backend
    pub fn new(backend: Arc<dyn RowStore>) -> Self {
        Self {
            history: HistoryLog::new(Arc::clone(&backend)),
            changelog: ChangeLog::new(Arc::clone(&backend)),
            backend,
        }
    }

    /// Create a store whose history and log reads default to the configured limits
    pub fn with_config(backend: Arc<dyn RowStore>, config: &PaddockConfig) -> Self {
        Self {
            history: HistoryLog::new(Arc::clone(&backend)).with_default_limit(config.history_limit),
            changelog: ChangeLog::new(Arc::clone(&backend)).with_default_limit(config.log_limit),
            backend,
        }
    }

    /// History of saved versions
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Narrative change log
    pub fn changelog(&self) -> &ChangeLog {
        &self.changelog
    }

    /// Fetch the current record; `None` means the pairing is unconfigured
    pub fn load(&self, event_car_id: &EventCarId) -> Result<Option<SetupRecord>, SetupError> {
        let query = Query::from(Table::EventCarSetup)
            .eq(EVENT_CAR_ID, event_car_id.as_str())
            .limit(1);
        match self.backend.select(&query)?.into_iter().next() {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Fetch the current record, or an empty one if none exists
    pub fn load_or_default(&self, event_car_id: &EventCarId) -> Result<SetupRecord, SetupError> {
        Ok(self
            .load(event_car_id)?
            .unwrap_or_else(|| SetupRecord::new(event_car_id.clone())))
    }

    /// Merge a patch into the current record and upsert it
    ///
    /// On failure nothing is written and the error is returned; the caller's
    /// view of the last saved record must stay as it was.
    pub fn save(&self, event_car_id: &EventCarId, patch: &SetupPatch) -> Result<SetupRecord, SetupError> {
        self.persist(event_car_id, patch, LogAction::SetupSaved, None)
    }

    /// Make a history version the current record again
    pub fn restore(&self, entry_id: Uuid) -> Result<SetupRecord, SetupError> {
        let entry = self
            .history
            .get(entry_id)?
            .ok_or(SetupError::HistoryNotFound(entry_id))?;
        let note = format!("Restored version from {}", entry.created_at.format("%Y-%m-%d %H:%M:%S"));
        self.persist(
            &entry.event_car_id,
            &SetupPatch::from_snapshot(&entry.snapshot),
            LogAction::SetupRestored,
            Some(note),
        )
    }

    fn persist(
        &self,
        event_car_id: &EventCarId,
        patch: &SetupPatch,
        action: LogAction,
        note: Option<String>,
    ) -> Result<SetupRecord, SetupError> {
        let current = self.load_or_default(event_car_id)?;
        let mut next = current.merged(patch);
        next.check_finite()?;
        next.updated_at = Some(clock::now());

        let stored = self
            .backend
            .upsert(Table::EventCarSetup, to_row(&next)?, EVENT_CAR_ID)?;
        let saved: SetupRecord = from_row(stored)?;

        tracing::debug!(event_car_id = %event_car_id, %action, "Setup persisted");

        // History and log are best effort: the upsert above is authoritative
        if let Err(e) = self.history.record(&saved) {
            tracing::warn!(event_car_id = %event_car_id, "Failed to record setup history: {e}");
        }

        let details = note.or_else(|| SetupDiff::compare(&current.snapshot(), &saved.snapshot()).summary());
        if let Err(e) = self.changelog.append(event_car_id, action, details) {
            tracing::warn!(event_car_id = %event_car_id, "Failed to append change log: {e}");
        }

        Ok(saved)
    }
}
