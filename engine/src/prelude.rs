pub use crate::{
    DistanceField, FieldVariant, Fields, Runtime, Scenario, Steering,
};
pub use glam::{ivec2, IVec2};
pub use util::{HashMap, HashSet, IndexMap, DIR_8};
pub use world::{Surface, Terrain, TileMap};
