//! Distance fields for steering roguelike agents, and the turn loop that
//! keeps them up to date.

/// How far can entities see by default.
pub const FOV_RADIUS: i32 = 10;

mod combine;
pub use combine::{combine, Steering};

mod data;
pub use data::{Component, LegendEntry, Scenario};

pub mod ecs;

mod entity_map;
pub use entity_map::EntityMap;

mod field;
pub use field::DistanceField;

mod fields;
pub use fields::{Field, FieldVariant, Fields};

mod fov;
pub use crate::fov::FieldOfVision;

mod multi_map;
pub use multi_map::MultiEntityMap;

mod noise;
pub use noise::NoiseMap;

pub mod prelude;

mod runtime;
pub use runtime::Runtime;

mod source;
pub use source::Source;

#[cfg(test)]
mod testing;
