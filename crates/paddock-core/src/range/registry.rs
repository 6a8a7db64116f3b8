//! Built-in parameter ranges
//!
//! Per-corner parameters are expanded for each of the four corners
//! (`front.fl`, `front.fr`, `rear.rl`, `rear.rr`).

use std::collections::HashMap;

use super::RangeSpec;

/// Corner prefixes of the extras tree
pub const CORNERS: [&str; 4] = ["front.fl", "front.fr", "rear.rl", "rear.rr"];

/// (parameter, min, max, step, unit) measured at every corner
const CORNER_PARAMS: &[(&str, f64, f64, f64, &str)] = &[
    ("pressure", 1.2, 2.2, 0.05, "bar"),
    ("camber", -5.0, 0.0, 0.1, "°"),
    ("toe", -3.0, 3.0, 0.05, "mm"),
    ("ride_height", 30.0, 120.0, 1.0, "mm"),
    ("damper", 0.0, 30.0, 1.0, "clicks"),
];

/// (path, min, max, step, unit) for single-instance parameters
const PARAMS: &[(&str, f64, f64, f64, &str)] = &[
    ("fields.front_pressure", 1.2, 2.2, 0.05, "bar"),
    ("fields.rear_pressure", 1.2, 2.2, 0.05, "bar"),
    ("fields.ride_height", 30.0, 120.0, 1.0, "mm"),
    ("fields.front_camber", -5.0, 0.0, 0.1, "°"),
    ("fields.rear_camber", -5.0, 0.0, 0.1, "°"),
    ("fields.wing_angle", 0.0, 30.0, 0.5, "°"),
    ("aero.front_wing", 0.0, 20.0, 0.5, "°"),
    ("aero.rear_wing", 0.0, 30.0, 0.5, "°"),
    ("aero.gurney", 0.0, 20.0, 1.0, "mm"),
    ("brakes.bias", 45.0, 70.0, 0.5, "%"),
    ("diff.preload", 0.0, 150.0, 5.0, "Nm"),
    ("diff.power_ramp", 30.0, 90.0, 5.0, "°"),
    ("diff.coast_ramp", 30.0, 90.0, 5.0, "°"),
];

/// Build the built-in path -> range table
pub(crate) fn builtin_specs() -> HashMap<String, RangeSpec> {
    let mut specs = HashMap::with_capacity(CORNERS.len() * CORNER_PARAMS.len() + PARAMS.len());

    for corner in CORNERS {
        for &(param, min, max, step, unit) in CORNER_PARAMS {
            specs.insert(
                format!("{}.{}", corner, param),
                RangeSpec::builtin(min, max, step, unit),
            );
        }
    }

    for &(path, min, max, step, unit) in PARAMS {
        specs.insert(path.to_string(), RangeSpec::builtin(min, max, step, unit));
    }

    specs
}
