//! The setup record for one event-car

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extras::{ensure_finite, Extras, ExtrasNode};
use super::fields::{SetupField, SetupFields};
use super::patch::SetupPatch;
use crate::error::SetupError;

/// Identifier of a car-at-an-event pairing
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCarId(String);

impl EventCarId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventCarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventCarId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EventCarId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The payload of a setup record without its key or timestamp
///
/// This is what history entries capture and what diffs compare.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupSnapshot {
    #[serde(default)]
    pub fields: SetupFields,
    #[serde(default)]
    pub extras: Extras,
}

/// A car's tunable configuration for one event
///
/// `fields` and `extras` may coexist and are never cross-validated: a
/// `front_pressure` field and a `front.fl.pressure` extra can disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupRecord {
    /// Owning event-car; at most one current record exists per id
    pub event_car_id: EventCarId,

    /// Structured scalar values, stored as columns
    #[serde(flatten)]
    pub fields: SetupFields,

    /// Per-point measurements addressed by dotted path
    #[serde(default)]
    pub extras: Extras,

    /// Timestamp of the last persist (None until first saved)
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SetupRecord {
    /// Create an empty, never-saved record
    pub fn new(event_car_id: impl Into<EventCarId>) -> Self {
        Self {
            event_car_id: event_car_id.into(),
            fields: SetupFields::default(),
            extras: Extras::default(),
            updated_at: None,
        }
    }

    /// Resolve a dotted path against `extras`
    pub fn get_path(&self, path: &str) -> Option<&ExtrasNode> {
        self.extras.get_path(path)
    }

    /// Resolve a dotted path to a leaf value
    pub fn get_value(&self, path: &str) -> Option<f64> {
        self.extras.get_value(path)
    }

    /// Copy of this record with one extras leaf set
    pub fn with_path(&self, path: &str, value: f64) -> Result<Self, SetupError> {
        Ok(Self {
            extras: self.extras.with_path(path, value)?,
            ..self.clone()
        })
    }

    /// Copy of this record with one structured field set or cleared
    pub fn with_field(&self, field: SetupField, value: Option<f64>) -> Self {
        let mut next = self.clone();
        next.fields.set(field, value);
        next
    }

    /// Apply a patch, returning the merged record
    ///
    /// Cleared fields are removed first, then supplied values are written.
    /// Extras are deep-merged unless the patch asks for replacement.
    pub fn merged(&self, patch: &SetupPatch) -> Self {
        let mut next = self.clone();

        for field in &patch.clear {
            next.fields.set(*field, None);
        }
        for (field, value) in patch.fields.measured() {
            next.fields.set(field, Some(value));
        }
        if let Some(notes) = &patch.fields.notes {
            next.fields.notes = if notes.is_empty() {
                None
            } else {
                Some(notes.clone())
            };
        }

        if patch.replace_extras {
            next.extras = patch.extras.clone();
        } else {
            next.extras.merge(&patch.extras);
        }

        next
    }

    /// Reject measurements that cannot be stored as JSON numbers
    pub fn check_finite(&self) -> Result<(), SetupError> {
        for (field, value) in self.fields.measured() {
            ensure_finite(&field.range_path(), value)?;
        }
        for (path, value) in self.extras.leaves() {
            ensure_finite(&path, value)?;
        }
        Ok(())
    }

    /// Payload without key or timestamp
    pub fn snapshot(&self) -> SetupSnapshot {
        SetupSnapshot {
            fields: self.fields.clone(),
            extras: self.extras.clone(),
        }
    }
}
