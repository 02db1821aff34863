use std::collections::VecDeque;

use anyhow::bail;
use glam::{ivec2, IVec2};
use hecs::Entity;
use world::Surface;

use crate::{
    field::{check_surface, Flood},
    DistanceField, Source,
};

/// Distance field radiating from a single entity, like the player or a
/// unique item.
///
/// The field only needs to be regenerated when the entity moves, so callers
/// report positions with [`EntityMap::update_source_position`] every turn and
/// then call [`EntityMap::refresh_if_moved`].
#[derive(Clone, Debug)]
pub struct EntityMap {
    kind: String,
    source: Source,
    /// Dimensions of the surface the map was registered on.
    dim: IVec2,
    field: DistanceField,
}

impl EntityMap {
    /// Register a source on the given surface.
    ///
    /// The field is not generated yet, it stays empty until the first
    /// [`EntityMap::regenerate`].
    pub fn new(
        kind: impl Into<String>,
        entity: Entity,
        pos: IVec2,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<Self> {
        check_surface(surface)?;
        let kind = kind.into();
        if !surface.contains(pos) {
            bail!("EntityMap {kind:?}: Source position {pos} out of bounds");
        }

        Ok(EntityMap {
            kind,
            source: Source::new(entity, pos),
            dim: ivec2(surface.width(), surface.height()),
            field: Default::default(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn field(&self) -> &DistanceField {
        &self.field
    }

    pub fn value_at(&self, p: IVec2) -> Option<usize> {
        self.field.value_at(p)
    }

    /// Record the source's current position.
    ///
    /// Bookkeeping only, the field is not touched.
    pub fn update_source_position(&mut self, pos: IVec2) -> anyhow::Result<()> {
        if !(pos.cmpge(IVec2::ZERO).all() && pos.cmplt(self.dim).all()) {
            bail!(
                "EntityMap {:?}: Source position {pos} out of bounds",
                self.kind
            );
        }
        self.source.move_to(pos);
        Ok(())
    }

    /// Regenerate the field if the source moved since the previous
    /// position update. Returns whether the field was regenerated.
    pub fn refresh_if_moved(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<bool> {
        if self.source.has_moved() {
            self.regenerate(surface)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Rebuild the whole field from the source's current position.
    pub fn regenerate(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<()> {
        check_surface(surface)?;
        let pos = self.source.pos();
        if !surface.contains(pos) {
            bail!(
                "EntityMap {:?}: Source position {pos} out of bounds",
                self.kind
            );
        }

        let mut flood = Flood::new(surface);
        let mut frontier = VecDeque::new();
        if flood.seed(pos) {
            frontier.push_back(pos);
        } else {
            log::warn!(
                "EntityMap {:?}: Source at {pos} is inside a wall",
                self.kind
            );
        }

        while let Some(p) = frontier.pop_front() {
            flood.expand(p, &mut frontier);
        }

        // Swap in the finished field as a whole.
        self.field = flood.finish();
        log::debug!(
            "EntityMap {:?}: Regenerated from {pos}, {} cells",
            self.kind,
            self.field.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;
    use world::TileMap;

    use super::*;
    use crate::testing::{entity, scatter_map, step_property_holds};

    fn generated(map: &TileMap, pos: IVec2) -> EntityMap {
        let mut m = EntityMap::new("player", entity(), pos, map).unwrap();
        m.regenerate(map).unwrap();
        m
    }

    #[test]
    fn open_square() {
        let map = TileMap::new(5, 5).unwrap();
        let m = generated(&map, ivec2(2, 2));

        assert_eq!(m.value_at(ivec2(2, 2)), Some(0));
        for p in util::s8(ivec2(2, 2)) {
            assert_eq!(m.value_at(p), Some(1));
        }
        for p in [ivec2(0, 0), ivec2(4, 0), ivec2(0, 4), ivec2(4, 4)] {
            assert_eq!(m.value_at(p), Some(2));
        }
        assert_eq!(m.field().len(), 25);
    }

    #[test]
    fn walls_block() {
        let map: TileMap = "
            .....
            #####
            ....."
            .parse()
            .unwrap();
        let m = generated(&map, ivec2(0, 0));

        assert_eq!(m.field().render(&map), "01234\n#####\n?????");
        for x in 0..5 {
            assert_eq!(m.value_at(ivec2(x, 1)), None);
            assert_eq!(m.value_at(ivec2(x, 2)), None);
        }
    }

    #[test]
    fn winding_corridor() {
        let map: TileMap = "
            .#...
            .#.#.
            ...#."
            .parse()
            .unwrap();
        let m = generated(&map, ivec2(0, 0));

        // Diagonal steps cut the corners.
        assert_eq!(m.field().render(&map), "0#445\n1#3#5\n223#6");
    }

    #[test]
    fn water_is_not_wall() {
        // Deep water blocks movement but not sight, so it isn't a wall and
        // the field floods across it.
        let map: TileMap = "..~..".parse().unwrap();
        let m = generated(&map, ivec2(0, 0));
        assert_eq!(m.value_at(ivec2(2, 0)), Some(2));
        assert_eq!(m.value_at(ivec2(4, 0)), Some(4));
    }

    #[test]
    fn out_of_bounds_source() {
        let map = TileMap::new(4, 4).unwrap();
        assert!(EntityMap::new("x", entity(), ivec2(4, 0), &map).is_err());
        assert!(EntityMap::new("x", entity(), ivec2(0, -1), &map).is_err());

        let mut m = EntityMap::new("x", entity(), ivec2(3, 3), &map).unwrap();
        assert!(m.update_source_position(ivec2(0, 4)).is_err());
        // Rejected update leaves the source alone.
        assert_eq!(m.source().pos(), ivec2(3, 3));
        assert!(!m.source().has_moved());
    }

    #[test]
    fn not_computed_until_generated() {
        let map = TileMap::new(3, 3).unwrap();
        let mut m = EntityMap::new("x", entity(), ivec2(1, 1), &map).unwrap();
        assert!(!m.refresh_if_moved(&map).unwrap());
        assert!(!m.field().is_computed());
        assert_eq!(m.value_at(ivec2(1, 1)), None);
    }

    #[test]
    fn refresh_only_on_move() {
        let map = TileMap::new(6, 6).unwrap();
        let mut m = generated(&map, ivec2(0, 0));
        let before = m.field().clone();

        m.update_source_position(ivec2(0, 0)).unwrap();
        assert!(!m.refresh_if_moved(&map).unwrap());
        assert!(!m.refresh_if_moved(&map).unwrap());
        assert_eq!(m.field(), &before);

        m.update_source_position(ivec2(5, 5)).unwrap();
        assert!(m.refresh_if_moved(&map).unwrap());
        assert_eq!(m.value_at(ivec2(5, 5)), Some(0));
        assert_eq!(m.value_at(ivec2(0, 0)), Some(5));

        // Standing still for a turn clears the moved state.
        m.update_source_position(ivec2(5, 5)).unwrap();
        assert!(!m.refresh_if_moved(&map).unwrap());
    }

    #[test]
    fn source_in_wall() {
        let map: TileMap = "#..".parse().unwrap();
        let m = generated(&map, ivec2(0, 0));
        assert!(m.field().is_computed());
        assert!(m.field().is_empty());
    }

    #[quickcheck]
    fn distances_are_consistent(walls: Vec<bool>, sx: u8, sy: u8) -> bool {
        let (map, pos) = scatter_map(&walls, sx, sy);
        let m = generated(&map, pos);

        m.value_at(pos) == Some(0)
            && step_property_holds(m.field(), &map)
            && m.field().iter().all(|(p, _)| !map.is_wall(p))
            // Every cell except the source is one step further than its
            // nearest neighbor, which makes the values true distances.
            && m.field().iter().all(|(p, v)| {
                p == pos
                    || map
                        .neighbors(p)
                        .filter_map(|n| m.value_at(n))
                        .min()
                        == Some(v - 1)
            })
    }
}
