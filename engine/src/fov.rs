//! Ray-cast field of view.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::{ray, Angle, HashSet};
use world::Surface;

use crate::FOV_RADIUS;

/// Field of view cast as one ray per degree from the viewer.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct FieldOfVision {
    torch_radius: i32,
}

impl Default for FieldOfVision {
    fn default() -> Self {
        FieldOfVision {
            torch_radius: FOV_RADIUS,
        }
    }
}

impl FieldOfVision {
    pub fn new(torch_radius: i32) -> Self {
        let mut ret = FieldOfVision::default();
        ret.set_torch_radius(torch_radius);
        ret
    }

    pub fn torch_radius(&self) -> i32 {
        self.torch_radius
    }

    /// Set how far the viewer can see. Radii below 2 are ignored.
    pub fn set_torch_radius(&mut self, radius: i32) {
        if radius > 1 {
            self.torch_radius = radius;
        }
    }

    /// Cells visible from `origin`.
    ///
    /// Rays stop at the map edge and right after the first sight-blocking
    /// cell, which is itself visible.
    pub fn visible_from(
        &self,
        surface: &(impl Surface + ?Sized),
        origin: IVec2,
    ) -> HashSet<IVec2> {
        let mut ret = HashSet::default();
        if !surface.contains(origin) {
            return ret;
        }
        ret.insert(origin);

        for angle in Angle::full_circle() {
            for p in ray(origin, angle).take(self.torch_radius as usize) {
                if !surface.contains(p) {
                    break;
                }
                ret.insert(p);
                if surface.blocks_sight(p) {
                    break;
                }
            }
        }

        ret
    }
}

#[cfg(test)]
mod test {
    use glam::ivec2;
    use world::TileMap;

    use super::*;

    #[test]
    fn torch_radius() {
        let mut fov = FieldOfVision::new(1);
        assert_eq!(fov.torch_radius(), FOV_RADIUS);
        fov.set_torch_radius(3);
        assert_eq!(fov.torch_radius(), 3);
        fov.set_torch_radius(0);
        assert_eq!(fov.torch_radius(), 3);
    }

    #[test]
    fn open_room() {
        let map = TileMap::new(9, 9).unwrap();
        let seen = FieldOfVision::new(3).visible_from(&map, ivec2(4, 4));
        assert!(seen.contains(&ivec2(4, 4)));
        assert!(seen.contains(&ivec2(4, 1)));
        assert!(seen.contains(&ivec2(7, 4)));
        assert!(!seen.contains(&ivec2(4, 0)));
        assert!(!seen.contains(&ivec2(0, 4)));
    }

    #[test]
    fn walls_cast_shadows() {
        let map: TileMap = "
            .......
            ...#...
            ......."
            .parse()
            .unwrap();
        let seen = FieldOfVision::new(6).visible_from(&map, ivec2(0, 1));

        // The wall itself is seen, what's right behind it isn't.
        assert!(seen.contains(&ivec2(3, 1)));
        assert!(!seen.contains(&ivec2(4, 1)));
        assert!(!seen.contains(&ivec2(5, 1)));
        assert!(seen.contains(&ivec2(5, 0)));
    }

    #[test]
    fn glass_is_see_through() {
        let map: TileMap = "..\"..".parse().unwrap();
        let seen = FieldOfVision::new(5).visible_from(&map, ivec2(0, 0));
        assert!(seen.contains(&ivec2(4, 0)));

        let map: TileMap = "..%..".parse().unwrap();
        let seen = FieldOfVision::new(5).visible_from(&map, ivec2(0, 0));
        assert!(seen.contains(&ivec2(2, 0)));
        assert!(!seen.contains(&ivec2(3, 0)));
    }
}
