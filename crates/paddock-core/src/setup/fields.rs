//! Structured setup fields

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// A numeric structured field of a setup record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupField {
    FrontPressure,
    RearPressure,
    RideHeight,
    FrontCamber,
    RearCamber,
    WingAngle,
}

impl SetupField {
    /// Every numeric field, in display order
    pub const ALL: [SetupField; 6] = [
        SetupField::FrontPressure,
        SetupField::RearPressure,
        SetupField::RideHeight,
        SetupField::FrontCamber,
        SetupField::RearCamber,
        SetupField::WingAngle,
    ];

    /// Column / serialized name
    pub fn name(&self) -> &'static str {
        match self {
            SetupField::FrontPressure => "front_pressure",
            SetupField::RearPressure => "rear_pressure",
            SetupField::RideHeight => "ride_height",
            SetupField::FrontCamber => "front_camber",
            SetupField::RearCamber => "rear_camber",
            SetupField::WingAngle => "wing_angle",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            SetupField::FrontPressure => "Front tire pressure",
            SetupField::RearPressure => "Rear tire pressure",
            SetupField::RideHeight => "Ride height",
            SetupField::FrontCamber => "Front camber",
            SetupField::RearCamber => "Rear camber",
            SetupField::WingAngle => "Wing angle",
        }
    }

    /// Path of this field in the range registry (`fields.<name>`)
    pub fn range_path(&self) -> String {
        format!("fields.{}", self.name())
    }
}

impl fmt::Display for SetupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SetupField {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("fields.").unwrap_or(s);
        SetupField::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| SetupError::InvalidPath(s.to_string()))
    }
}

/// Fixed-meaning setup values; `None` means "not yet measured"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupFields {
    /// Front tire pressure (bar)
    pub front_pressure: Option<f64>,
    /// Rear tire pressure (bar)
    pub rear_pressure: Option<f64>,
    /// Ride height (mm)
    pub ride_height: Option<f64>,
    /// Front camber (degrees)
    pub front_camber: Option<f64>,
    /// Rear camber (degrees)
    pub rear_camber: Option<f64>,
    /// Wing angle (degrees)
    pub wing_angle: Option<f64>,
    /// Free-text notes
    pub notes: Option<String>,
}

impl SetupFields {
    /// Get a numeric field
    pub fn get(&self, field: SetupField) -> Option<f64> {
        match field {
            SetupField::FrontPressure => self.front_pressure,
            SetupField::RearPressure => self.rear_pressure,
            SetupField::RideHeight => self.ride_height,
            SetupField::FrontCamber => self.front_camber,
            SetupField::RearCamber => self.rear_camber,
            SetupField::WingAngle => self.wing_angle,
        }
    }

    /// Set or clear a numeric field
    pub fn set(&mut self, field: SetupField, value: Option<f64>) {
        let slot = match field {
            SetupField::FrontPressure => &mut self.front_pressure,
            SetupField::RearPressure => &mut self.rear_pressure,
            SetupField::RideHeight => &mut self.ride_height,
            SetupField::FrontCamber => &mut self.front_camber,
            SetupField::RearCamber => &mut self.rear_camber,
            SetupField::WingAngle => &mut self.wing_angle,
        };
        *slot = value;
    }

    /// Fields that have a value
    pub fn measured(&self) -> impl Iterator<Item = (SetupField, f64)> + '_ {
        SetupField::ALL
            .into_iter()
            .filter_map(|f| self.get(f).map(|v| (f, v)))
    }

    /// Check if nothing has been measured and there are no notes
    pub fn is_empty(&self) -> bool {
        self.measured().next().is_none() && self.notes.is_none()
    }
}
