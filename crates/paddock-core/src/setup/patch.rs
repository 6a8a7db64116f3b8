//! Partial updates to a setup record

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::extras::{ensure_finite, Extras};
use super::fields::{SetupField, SetupFields};
use super::record::{SetupRecord, SetupSnapshot};
use crate::error::SetupError;

/// A partial update merged into the current record by
/// [`crate::setup::SetupStore::save`]
///
/// - numeric fields present in `fields` overwrite the stored value
/// - fields listed in `clear` are reset to "not measured"
/// - `fields.notes` overwrites the notes; an empty string clears them
/// - `extras` is deep-merged, or replaces the stored tree when
///   `replace_extras` is set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupPatch {
    pub fields: SetupFields,
    pub clear: BTreeSet<SetupField>,
    pub extras: Extras,
    pub replace_extras: bool,
}

impl SetupPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch that makes the stored record equal to a snapshot
    pub fn from_snapshot(snapshot: &SetupSnapshot) -> Self {
        let clear = SetupField::ALL
            .into_iter()
            .filter(|f| snapshot.fields.get(*f).is_none())
            .collect();
        let mut fields = snapshot.fields.clone();
        if fields.notes.is_none() {
            fields.notes = Some(String::new());
        }
        Self {
            fields,
            clear,
            extras: snapshot.extras.clone(),
            replace_extras: true,
        }
    }

    /// Patch that makes the stored record equal to `record`'s payload
    pub fn from_record(record: &SetupRecord) -> Self {
        Self::from_snapshot(&record.snapshot())
    }

    /// Set a numeric field
    pub fn field(mut self, field: SetupField, value: f64) -> Self {
        self.clear.remove(&field);
        self.fields.set(field, Some(value));
        self
    }

    /// Reset a numeric field to "not measured"
    pub fn clear_field(mut self, field: SetupField) -> Self {
        self.fields.set(field, None);
        self.clear.insert(field);
        self
    }

    /// Overwrite the notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.fields.notes = Some(notes.into());
        self
    }

    /// Set an extras leaf
    pub fn extra(mut self, path: &str, value: f64) -> Result<Self, SetupError> {
        let parsed = path.parse()?;
        ensure_finite(path, value)?;
        self.extras.set(&parsed, value);
        Ok(self)
    }

    /// Check if applying this patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.clear.is_empty() && self.extras.is_empty() && !self.replace_extras
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let patch = SetupPatch::new()
            .clear_field(SetupField::FrontCamber)
            .field(SetupField::FrontCamber, -2.5);
        assert!(patch.clear.is_empty());
        assert_eq!(patch.fields.front_camber, Some(-2.5));
        assert!(!patch.is_empty());
        assert!(SetupPatch::new().is_empty());
    }

    #[test]
    fn test_invalid_extra_path() {
        let result = SetupPatch::new().extra("front.", 1.0);
        assert!(matches!(result, Err(SetupError::InvalidPath(_))));
    }

    #[test]
    fn test_non_finite_extra() {
        let result = SetupPatch::new().extra("front.fl.pressure", f64::NAN);
        assert!(matches!(result, Err(SetupError::NonFinite { .. })));
    }

    #[test]
    fn test_from_snapshot_clears_missing() {
        let record = SetupRecord::new("ec-1")
            .with_field(SetupField::WingAngle, Some(8.0));
        let patch = SetupPatch::from_record(&record);
        assert!(patch.clear.contains(&SetupField::FrontPressure));
        assert!(!patch.clear.contains(&SetupField::WingAngle));
        assert!(patch.replace_extras);
    }
}
