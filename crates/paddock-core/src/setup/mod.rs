//! Event-car Technical Setup
//!
//! The canonical record of a car's tunable configuration for one event:
//! structured fields (tire pressures, ride height, camber, wing angle,
//! notes) next to an open-ended tree of per-point measurements addressed by
//! dotted paths such as `front.fl.pressure`.

mod diff;
mod extras;
mod fields;
mod patch;
mod record;
mod store;

pub use diff::{SetupDiff, SetupDifference, SetupValue};
pub use extras::{Extras, ExtrasNode, SetupPath};
pub use fields::{SetupField, SetupFields};
pub use patch::SetupPatch;
pub use record::{EventCarId, SetupRecord, SetupSnapshot};
pub use store::SetupStore;
