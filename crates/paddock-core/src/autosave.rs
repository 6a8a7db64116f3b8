//! Debounced autosave
//!
//! Bursts of edits coalesce into one persist fired after a quiet period. A
//! newer edit aborts the pending timer, so at most one autosave is waiting at
//! any time. Failed autosaves are never retried; they are reported on the
//! event channel and the next edit or manual save tries again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::setup::{EventCarId, SetupPatch, SetupRecord, SetupStore};

/// Outcome of a fired autosave
#[derive(Debug, Clone)]
pub enum AutosaveEvent {
    /// The patch was persisted
    Saved(SetupRecord),
    /// The backend refused the write; `patch` can be resubmitted as-is
    Failed {
        event_car_id: EventCarId,
        patch: SetupPatch,
        error: String,
        at: DateTime<Utc>,
    },
}

/// Schedules debounced saves through a [`SetupStore`]
pub struct Autosaver {
    store: Arc<SetupStore>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    events: mpsc::UnboundedSender<AutosaveEvent>,
}

impl Autosaver {
    /// Create an autosaver and the receiving end of its event channel
    pub fn new(
        store: Arc<SetupStore>,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<AutosaveEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let autosaver = Self {
            store,
            delay,
            pending: Mutex::new(None),
            events,
        };
        (autosaver, rx)
    }

    /// Quiet period before a scheduled save fires
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a save, replacing any pending one
    ///
    /// Must be called from within a Tokio runtime; outside one the edit is
    /// left for the next manual save.
    pub fn schedule(&self, event_car_id: EventCarId, patch: SetupPatch) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(event_car_id = %event_car_id, "No async runtime, autosave skipped");
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let events = self.events.clone();
        let delay = self.delay;

        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;

            // Backends may block on file I/O. Once started, the write runs to
            // completion and reports its outcome even if this task is aborted.
            let write = tokio::task::spawn_blocking(move || {
                let event = persist(&store, event_car_id, patch);
                // Nobody listening is fine
                let _ = events.send(event);
            });
            if let Err(e) = write.await {
                tracing::error!("Autosave write task failed: {e}");
            }
        });

        if let Some(previous) = self.lock_pending().replace(task) {
            previous.abort();
        }
    }

    /// Abort the pending save; returns whether one was waiting
    pub fn cancel(&self) -> bool {
        match self.lock_pending().take() {
            Some(task) => {
                let was_pending = !task.is_finished();
                task.abort();
                was_pending
            }
            None => false,
        }
    }

    /// Check if a save is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn persist(store: &SetupStore, event_car_id: EventCarId, patch: SetupPatch) -> AutosaveEvent {
    match store.save(&event_car_id, &patch) {
        Ok(record) => {
            tracing::debug!(event_car_id = %event_car_id, "Autosave complete");
            AutosaveEvent::Saved(record)
        }
        Err(e) => {
            tracing::warn!(event_car_id = %event_car_id, "Autosave failed: {e}");
            AutosaveEvent::Failed {
                event_car_id,
                patch,
                error: e.to_string(),
                at: Utc::now(),
            }
        }
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
