//! Tile grids that distance fields, vision and noise are computed over.

mod surface;
pub use surface::Surface;

mod tile;
pub use tile::{Terrain, TileFlags};

mod tile_map;
pub use tile_map::TileMap;
