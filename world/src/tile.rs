use anyhow::bail;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

bitflags! {
    /// What a tile stops from passing through it.
    #[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Debug)]
    pub struct TileFlags: u8 {
        const BLOCKS_MOVEMENT = 1 << 0;
        const BLOCKS_SIGHT = 1 << 1;
        const BLOCKS_SOUND = 1 << 2;
    }
}

impl TileFlags {
    /// A wall blocks both movement and sight.
    pub fn is_wall(self) -> bool {
        self.contains(TileFlags::BLOCKS_MOVEMENT | TileFlags::BLOCKS_SIGHT)
    }
}

/// Possible contents for a map cell.
#[derive(
    Copy,
    Clone,
    Default,
    Eq,
    PartialEq,
    Hash,
    Debug,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    Door,
    /// See-through pane, stops bodies and sound.
    Glass,
    /// Can't be walked through but can be seen and heard across.
    Water,
    /// Blocks sight only.
    Grass,
}

use Terrain::*;

impl Terrain {
    pub fn flags(self) -> TileFlags {
        let (m, s, n) = (
            TileFlags::BLOCKS_MOVEMENT,
            TileFlags::BLOCKS_SIGHT,
            TileFlags::BLOCKS_SOUND,
        );
        match self {
            Floor => TileFlags::empty(),
            Wall | Door => m | s | n,
            Glass => m | n,
            Water => m,
            Grass => s,
        }
    }
}

impl TryFrom<char> for Terrain {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '.' => Ok(Floor),
            '#' => Ok(Wall),
            '+' => Ok(Door),
            '"' => Ok(Glass),
            '~' => Ok(Water),
            '%' => Ok(Grass),
            _ => bail!("Bad terrain {value:?}"),
        }
    }
}

impl From<Terrain> for char {
    fn from(value: Terrain) -> Self {
        // This must match the mapping in Terrain::try_from.
        match value {
            Floor => '.',
            Wall => '#',
            Door => '+',
            Glass => '"',
            Water => '~',
            Grass => '%',
        }
    }
}
