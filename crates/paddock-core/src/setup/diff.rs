//! Setup comparison / diff
//!
//! Compare two setup snapshots (e.g. two history versions) value by value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::fields::SetupField;
use super::record::SetupSnapshot;

/// A compared value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SetupValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for SetupValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupValue::Number(v) => write!(f, "{}", v),
            SetupValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A difference between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupDifference {
    /// `fields.<name>` for structured fields, the dotted path for extras
    pub path: String,
    /// Value in the first snapshot (None if absent)
    pub before: Option<SetupValue>,
    /// Value in the second snapshot (None if absent)
    pub after: Option<SetupValue>,
}

/// Result of comparing two snapshots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupDiff {
    /// Differences, structured fields first, then extras in path order
    pub differences: Vec<SetupDifference>,
}

impl SetupDiff {
    /// Compare two snapshots
    pub fn compare(a: &SetupSnapshot, b: &SetupSnapshot) -> Self {
        let mut differences = Vec::new();

        for field in SetupField::ALL {
            let before = a.fields.get(field);
            let after = b.fields.get(field);
            if !numbers_equal(before, after) {
                differences.push(SetupDifference {
                    path: field.range_path(),
                    before: before.map(SetupValue::Number),
                    after: after.map(SetupValue::Number),
                });
            }
        }

        if a.fields.notes != b.fields.notes {
            differences.push(SetupDifference {
                path: "fields.notes".to_string(),
                before: a.fields.notes.clone().map(SetupValue::Text),
                after: b.fields.notes.clone().map(SetupValue::Text),
            });
        }

        let leaves_a: BTreeMap<String, f64> = a.extras.leaves().into_iter().collect();
        let leaves_b: BTreeMap<String, f64> = b.extras.leaves().into_iter().collect();
        let mut paths: Vec<&String> = leaves_a.keys().chain(leaves_b.keys()).collect();
        paths.sort();
        paths.dedup();

        for path in paths {
            let before = leaves_a.get(path).copied();
            let after = leaves_b.get(path).copied();
            if !numbers_equal(before, after) {
                differences.push(SetupDifference {
                    path: path.clone(),
                    before: before.map(SetupValue::Number),
                    after: after.map(SetupValue::Number),
                });
            }
        }

        Self { differences }
    }

    /// Check if the snapshots are identical
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
    }

    /// Get the number of differences
    pub fn difference_count(&self) -> usize {
        self.differences.len()
    }

    /// One-line summary such as `fields.wing_angle 10 -> 12, front.fl.pressure - -> 1.9`
    pub fn summary(&self) -> Option<String> {
        if self.differences.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .differences
            .iter()
            .map(|d| format!("{} {} -> {}", d.path, display(&d.before), display(&d.after)))
            .collect();
        Some(parts.join(", "))
    }
}

fn display(value: &Option<SetupValue>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string())
}

fn numbers_equal(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => false,
    }
}
