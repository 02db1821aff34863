use std::{fmt, str::FromStr};

use anyhow::{bail, Context};
use glam::{ivec2, IVec2};
use util::{s8, AsciiMap};

use crate::{Surface, Terrain, TileFlags};

/// Dense rectangular terrain grid.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TileMap {
    width: i32,
    height: i32,
    tiles: Vec<Terrain>,
}

impl TileMap {
    /// Create an open map of floor tiles.
    pub fn new(width: i32, height: i32) -> anyhow::Result<Self> {
        TileMap::filled(width, height, Terrain::Floor)
    }

    pub fn filled(
        width: i32,
        height: i32,
        terrain: Terrain,
    ) -> anyhow::Result<Self> {
        if width <= 0 || height <= 0 {
            bail!("TileMap: Bad dimensions {width}x{height}");
        }

        Ok(TileMap {
            width,
            height,
            tiles: vec![terrain; (width * height) as usize],
        })
    }

    /// Build a map from the terrain glyphs of an ASCII map.
    ///
    /// Legend entries map a glyph to terrain. Glyphs not in the legend are
    /// read as terrain glyphs directly and whitespace becomes wall.
    pub fn from_ascii_map<T>(
        map: &AsciiMap<T>,
        terrain_of: impl Fn(&T) -> Terrain,
    ) -> anyhow::Result<Self> {
        let dim = map.dim();
        let mut ret = TileMap::filled(dim.x, dim.y, Terrain::Wall)
            .context("TileMap: Empty ascii map")?;

        for (p, c, entry) in map.iter() {
            let terrain = match entry {
                Some(e) => terrain_of(e),
                None => Terrain::try_from(c)
                    .with_context(|| format!("TileMap: Unknown glyph at {p}"))?,
            };
            ret.set(p, terrain)?;
        }

        Ok(ret)
    }

    fn idx(&self, p: IVec2) -> Option<usize> {
        self.contains(p)
            .then(|| (p.x + p.y * self.width) as usize)
    }

    pub fn get(&self, p: IVec2) -> Option<Terrain> {
        self.idx(p).map(|i| self.tiles[i])
    }

    pub fn set(&mut self, p: IVec2, terrain: Terrain) -> anyhow::Result<()> {
        let Some(i) = self.idx(p) else {
            bail!("TileMap: Point {p} out of bounds");
        };
        self.tiles[i] = terrain;
        Ok(())
    }

    /// Iterate all points of the map in row order.
    pub fn points(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| ivec2(x, y)))
    }

    /// In-bounds neighbors of a point, clock face order starting from
    /// north.
    pub fn neighbors(&self, p: IVec2) -> impl Iterator<Item = IVec2> + '_ {
        s8(p).filter(|&p| self.contains(p))
    }

    /// Cells that are not walls.
    pub fn floor_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.points().filter(|&p| !self.is_wall(p))
    }
}

impl Surface for TileMap {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn tile_flags(&self, p: IVec2) -> TileFlags {
        self.get(p).map_or(TileFlags::all(), Terrain::flags)
    }
}

impl FromStr for TileMap {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let map: AsciiMap<Terrain> = AsciiMap::new(s, Default::default());
        TileMap::from_ascii_map(&map, |&t| t)
    }
}

impl fmt::Display for TileMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let t = self.tiles[(x + y * self.width) as usize];
                write!(f, "{}", char::from(t))?;
            }
            if y < self.height - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_map() {
        let map: TileMap = "
            #####
            #.~.#
            #####"
            .parse()
            .unwrap();

        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 3);
        assert_eq!(map.get(ivec2(2, 1)), Some(Terrain::Water));
        assert!(map.is_wall(ivec2(0, 0)));
        assert!(!map.is_wall(ivec2(2, 1)));
        assert!(map.blocks_movement(ivec2(2, 1)));
        assert_eq!(map.floor_cells().count(), 3);
        assert_eq!(map.to_string(), "#####\n#.~.#\n#####");
    }

    #[test]
    fn bad_maps() {
        assert!(TileMap::new(0, 5).is_err());
        assert!(TileMap::new(5, -1).is_err());
        assert!("".parse::<TileMap>().is_err());
        assert!("#.x#".parse::<TileMap>().is_err());
    }

    #[test]
    fn out_of_bounds() {
        let mut map = TileMap::new(3, 3).unwrap();
        assert!(map.contains(ivec2(2, 2)));
        assert!(!map.contains(ivec2(3, 2)));
        assert!(!map.contains(ivec2(-1, 0)));
        assert!(map.is_wall(ivec2(-1, 0)));
        assert!(map.set(ivec2(3, 0), Terrain::Wall).is_err());
        assert_eq!(map.get(ivec2(0, 3)), None);
    }

    #[test]
    fn corner_neighbors() {
        let map = TileMap::new(3, 3).unwrap();
        assert_eq!(
            map.neighbors(ivec2(0, 0)).collect::<Vec<_>>(),
            vec![ivec2(1, 0), ivec2(1, 1), ivec2(0, 1)]
        );
        assert_eq!(map.neighbors(ivec2(1, 1)).count(), 8);
    }

    #[test]
    fn ragged_map() {
        // Short lines and whitespace are padded with wall.
        let map: TileMap = "...\n.\n . ".parse().unwrap();
        assert_eq!(map.width(), 3);
        assert!(map.is_wall(ivec2(2, 1)));
        assert!(map.is_wall(ivec2(0, 2)));
        assert!(!map.is_wall(ivec2(1, 2)));
    }
}
