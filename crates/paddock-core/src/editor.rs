//! Setup edit session
//!
//! Ties the pieces together for one event-car: edits are range-checked,
//! applied to a local draft, and persisted either by the debounced autosave
//! or immediately by [`SetupEditor::save`]. Both paths go through the same
//! idempotent upsert.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::autosave::{AutosaveEvent, Autosaver};
use crate::config::PaddockConfig;
use crate::error::SetupError;
use crate::range::RangeValidator;
use crate::setup::{EventCarId, SetupField, SetupPatch, SetupRecord, SetupStore};

/// An open editing session for one event-car's setup
pub struct SetupEditor {
    store: Arc<SetupStore>,
    validator: Arc<RangeValidator>,
    autosaver: Autosaver,
    events: mpsc::UnboundedReceiver<AutosaveEvent>,
    draft: SetupRecord,
    last_saved: Option<SetupRecord>,
}

impl SetupEditor {
    /// Open a session, starting from the stored record or an empty one
    pub fn open(
        store: Arc<SetupStore>,
        validator: Arc<RangeValidator>,
        config: &PaddockConfig,
        event_car_id: EventCarId,
    ) -> Result<Self, SetupError> {
        let last_saved = store.load(&event_car_id)?;
        let draft = last_saved
            .clone()
            .unwrap_or_else(|| SetupRecord::new(event_car_id));
        let (autosaver, events) = Autosaver::new(Arc::clone(&store), config.autosave_delay());

        Ok(Self {
            store,
            validator,
            autosaver,
            events,
            draft,
            last_saved,
        })
    }

    pub fn event_car_id(&self) -> &EventCarId {
        &self.draft.event_car_id
    }

    /// Current local state, including unsaved edits
    pub fn draft(&self) -> &SetupRecord {
        &self.draft
    }

    /// Last successfully persisted record, if any
    pub fn last_saved(&self) -> Option<&SetupRecord> {
        self.last_saved.as_ref()
    }

    /// Check if the draft differs from the last persisted record
    pub fn is_dirty(&self) -> bool {
        match &self.last_saved {
            Some(saved) => saved.snapshot() != self.draft.snapshot(),
            None => self.draft.snapshot() != Default::default(),
        }
    }

    /// Check if an autosave is waiting to fire
    pub fn autosave_pending(&self) -> bool {
        self.autosaver.is_pending()
    }

    /// Range hint for a path
    pub fn hint(&self, path: &str) -> String {
        self.validator.hint(path)
    }

    /// Set an extras leaf; returns the value actually stored
    pub fn set_extra(&mut self, path: &str, value: f64) -> Result<f64, SetupError> {
        let value = self.validator.apply(path, value)?;
        self.draft = self.draft.with_path(path, value)?;
        self.schedule_autosave();
        Ok(value)
    }

    /// Remove an extras leaf or branch
    pub fn remove_extra(&mut self, path: &str) -> Result<bool, SetupError> {
        let path = path.parse()?;
        let mut next = self.draft.clone();
        let removed = next.extras.remove(&path).is_some();
        if removed {
            self.draft = next;
            self.schedule_autosave();
        }
        Ok(removed)
    }

    /// Set or clear a structured field; returns the value actually stored
    pub fn set_field(&mut self, field: SetupField, value: Option<f64>) -> Result<Option<f64>, SetupError> {
        let value = value
            .map(|v| self.validator.apply(&field.range_path(), v))
            .transpose()?;
        self.draft = self.draft.with_field(field, value);
        self.schedule_autosave();
        Ok(value)
    }

    /// Replace the notes (empty clears them)
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        self.draft.fields.notes = if notes.is_empty() { None } else { Some(notes) };
        self.schedule_autosave();
    }

    /// Persist the draft now, bypassing the debounce
    ///
    /// Errors are returned to the caller; on failure `last_saved` is left
    /// untouched.
    pub fn save(&mut self) -> Result<SetupRecord, SetupError> {
        let patch = SetupPatch::from_record(&self.draft);
        let saved = self.store.save(self.event_car_id(), &patch)?;
        self.draft = saved.clone();
        self.last_saved = Some(saved.clone());
        Ok(saved)
    }

    /// Drain autosave outcomes, advancing `last_saved` on success
    ///
    /// A save older than `last_saved` (an autosave overtaken by a manual
    /// save) is still returned but never moves `last_saved` backwards.
    pub fn poll_autosave(&mut self) -> Vec<AutosaveEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let AutosaveEvent::Saved(record) = &event {
                if self.is_newer_than_saved(record) {
                    self.draft.updated_at = record.updated_at;
                    self.last_saved = Some(record.clone());
                }
            }
            events.push(event);
        }
        events
    }

    fn is_newer_than_saved(&self, record: &SetupRecord) -> bool {
        match &self.last_saved {
            Some(saved) => record.updated_at > saved.updated_at,
            None => true,
        }
    }

    /// End the session, saving unsaved edits immediately
    pub fn close(mut self) -> Result<Option<SetupRecord>, SetupError> {
        self.autosaver.cancel();
        self.poll_autosave();
        if self.is_dirty() {
            return self.save().map(Some);
        }
        Ok(None)
    }

    fn schedule_autosave(&self) {
        self.autosaver
            .schedule(self.event_car_id().clone(), SetupPatch::from_record(&self.draft));
    }
}
