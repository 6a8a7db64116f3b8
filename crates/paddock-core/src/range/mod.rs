//! Parameter Range Validation
//!
//! Every tunable parameter path maps to an inclusive `[min, max]` range, a
//! step and a display unit. Paths missing from the registry fall back to
//! `{min: 0, max: 100, step: 1, unit: ""}`.
//!
//! Ranges are applied when an edit is made, never on load: values persisted
//! out of range by other means stay visible unmodified. The step is a UI
//! affordance only and is not enforced.

mod registry;

pub use registry::CORNERS;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::PaddockConfig;
use crate::error::SetupError;

/// Inclusive numeric range for one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    #[serde(default)]
    pub unit: String,
}

impl RangeSpec {
    /// Create a range, checking `min <= max` and finite bounds
    pub fn new(min: f64, max: f64, step: f64, unit: impl Into<String>) -> Result<Self, SetupError> {
        let spec = Self {
            min,
            max,
            step,
            unit: unit.into(),
        };
        spec.validate("<range>")?;
        Ok(spec)
    }

    fn builtin(min: f64, max: f64, step: f64, unit: &str) -> Self {
        Self {
            min,
            max,
            step,
            unit: unit.to_string(),
        }
    }

    pub(crate) fn validate(&self, path: &str) -> Result<(), SetupError> {
        let reason = if !self.min.is_finite() || !self.max.is_finite() {
            Some("bounds must be finite".to_string())
        } else if self.min > self.max {
            Some(format!("min={} > max={}", self.min, self.max))
        } else if self.step.is_nan() || self.step <= 0.0 {
            Some(format!("step must be positive, got {}", self.step))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(SetupError::InvalidRange {
                path: path.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Check if a value lies within the bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value into `[min, max]`; NaN maps to `min`
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    /// Hint text such as `1.2 to 2.2 bar (step 0.05)`
    pub fn hint(&self) -> String {
        let unit = if self.unit.is_empty() {
            String::new()
        } else {
            format!(" {}", self.unit)
        };
        format!("{} to {}{} (step {})", self.min, self.max, unit, self.step)
    }
}

impl Default for RangeSpec {
    fn default() -> Self {
        Self::builtin(0.0, 100.0, 1.0, "")
    }
}

/// What to do with an out-of-range edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Silently clamp into range
    #[default]
    Clamp,
    /// Refuse the edit with [`SetupError::OutOfRange`]
    Reject,
}

/// Path -> range table
#[derive(Debug, Clone)]
pub struct RangeRegistry {
    specs: HashMap<String, RangeSpec>,
    fallback: RangeSpec,
}

impl RangeRegistry {
    /// Registry with the built-in parameter table
    pub fn builtin() -> Self {
        Self {
            specs: registry::builtin_specs(),
            fallback: RangeSpec::default(),
        }
    }

    /// Registry with no entries; every path gets the default range
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
            fallback: RangeSpec::default(),
        }
    }

    /// Add or replace the range for a path
    pub fn insert(&mut self, path: impl Into<String>, spec: RangeSpec) -> Result<(), SetupError> {
        let path = path.into();
        spec.validate(&path)?;
        self.specs.insert(path, spec);
        Ok(())
    }

    /// Range for a path; never fails
    pub fn range_for(&self, path: &str) -> &RangeSpec {
        self.specs.get(path).unwrap_or(&self.fallback)
    }

    /// Check if a path has its own entry
    pub fn contains(&self, path: &str) -> bool {
        self.specs.contains_key(path)
    }

    /// Registered paths, sorted
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl Default for RangeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Applies the registry to incoming edits
#[derive(Debug, Clone, Default)]
pub struct RangeValidator {
    registry: RangeRegistry,
    policy: RangePolicy,
}

impl RangeValidator {
    pub fn new(registry: RangeRegistry, policy: RangePolicy) -> Self {
        Self { registry, policy }
    }

    /// Built-in registry plus config overrides, with the configured policy
    pub fn from_config(config: &PaddockConfig) -> Result<Self, SetupError> {
        let mut registry = RangeRegistry::builtin();
        for (path, spec) in &config.range_overrides {
            registry.insert(path.clone(), spec.clone())?;
        }
        Ok(Self::new(registry, config.range_policy))
    }

    pub fn registry(&self) -> &RangeRegistry {
        &self.registry
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Range for a path (registry entry or the default)
    pub fn range_for(&self, path: &str) -> &RangeSpec {
        self.registry.range_for(path)
    }

    /// Clamp a value into the path's range
    pub fn clamp(&self, path: &str, value: f64) -> f64 {
        self.range_for(path).clamp(value)
    }

    /// Validate an edit according to the policy, returning the value to store
    pub fn apply(&self, path: &str, value: f64) -> Result<f64, SetupError> {
        let spec = self.range_for(path);
        match self.policy {
            RangePolicy::Clamp => {
                let clamped = spec.clamp(value);
                if clamped != value {
                    tracing::debug!(path, value, clamped, "Clamped out-of-range edit");
                }
                Ok(clamped)
            }
            RangePolicy::Reject if spec.contains(value) => Ok(value),
            RangePolicy::Reject => Err(SetupError::OutOfRange {
                path: path.to_string(),
                value,
                min: spec.min,
                max: spec.max,
            }),
        }
    }

    /// Hint text for a path
    pub fn hint(&self, path: &str) -> String {
        self.range_for(path).hint()
    }
}
