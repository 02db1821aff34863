//! Shared test fixtures.

use glam::{ivec2, IVec2};
use hecs::Entity;
use world::{Surface, Terrain, TileMap};

use crate::DistanceField;

pub fn entity() -> Entity {
    hecs::World::new().spawn(())
}

/// Several distinct entities.
pub fn entities(n: usize) -> Vec<Entity> {
    let mut ecs = hecs::World::new();
    (0..n).map(|_| ecs.spawn(())).collect()
}

/// 8x8 map with walls scattered by a bit pattern and an open start point.
pub fn scatter_map(walls: &[bool], sx: u8, sy: u8) -> (TileMap, IVec2) {
    let mut map = TileMap::new(8, 8).unwrap();
    for (i, &wall) in walls.iter().take(64).enumerate() {
        if wall {
            let p = ivec2(i as i32 % 8, i as i32 / 8);
            map.set(p, Terrain::Wall).unwrap();
        }
    }

    let pos = ivec2(sx as i32 % 8, sy as i32 % 8);
    map.set(pos, Terrain::Floor).unwrap();
    (map, pos)
}

/// Adjacent assigned cells differ by at most one.
pub fn step_property_holds(field: &DistanceField, map: &TileMap) -> bool {
    field.iter().all(|(p, v)| {
        map.neighbors(p)
            .filter_map(|n| field.value_at(n))
            .all(|u| u.abs_diff(v) <= 1)
    }) && field.iter().all(|(p, _)| map.contains(p))
}
