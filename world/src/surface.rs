use glam::IVec2;

use crate::TileFlags;

/// Read-only view of a rectangular tile grid.
///
/// Valid coordinates run from `(0, 0)` to `(width - 1, height - 1)`.
/// Implementors only need to report dimensions and per-cell flags, the
/// blocking predicates are derived from those.
pub trait Surface {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Flags of the tile at `p`.
    ///
    /// Only called with in-bounds points.
    fn tile_flags(&self, p: IVec2) -> TileFlags;

    fn contains(&self, p: IVec2) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width() && p.y < self.height()
    }

    /// Flags at `p`, cells outside the grid block everything.
    fn flags_at(&self, p: IVec2) -> TileFlags {
        if self.contains(p) {
            self.tile_flags(p)
        } else {
            TileFlags::all()
        }
    }

    fn blocks_movement(&self, p: IVec2) -> bool {
        self.flags_at(p).contains(TileFlags::BLOCKS_MOVEMENT)
    }

    fn blocks_sight(&self, p: IVec2) -> bool {
        self.flags_at(p).contains(TileFlags::BLOCKS_SIGHT)
    }

    fn blocks_sound(&self, p: IVec2) -> bool {
        self.flags_at(p).contains(TileFlags::BLOCKS_SOUND)
    }

    /// Whether the cell is a wall for distance field purposes.
    ///
    /// Only cells that block both movement and sight count. Something like
    /// deep water stops movement but still gets distance values.
    fn is_wall(&self, p: IVec2) -> bool {
        self.flags_at(p).is_wall()
    }
}
