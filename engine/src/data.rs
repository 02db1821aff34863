use std::path::Path;

use anyhow::Context;
use hecs::EntityBuilder;
use serde::{Deserialize, Serialize};
use util::{AsciiMap, IndexMap};
use world::{Terrain, TileMap};

use crate::{ecs, FieldOfVision, FieldVariant};

/// Data-side entity component.
///
/// Unknown component names are rejected when the data is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Name(String),
    Icon(char),
    Emitter(String),
    Desires(IndexMap<String, i32>),
    Noisy(f32),
    Sight(i32),
}

impl Component {
    pub fn apply(&self, builder: &mut EntityBuilder) {
        use Component::*;
        match self {
            Name(a) => builder.add(ecs::Name(a.clone())),
            Icon(a) => builder.add(ecs::Icon(*a)),
            Emitter(a) => builder.add(ecs::Emitter(a.clone())),
            Desires(a) => builder.add(ecs::Desires(a.clone())),
            Noisy(a) => builder.add(ecs::Noisy(*a)),
            Sight(a) => builder.add(ecs::Sight(FieldOfVision::new(*a))),
        };
    }
}

/// What a map glyph stands for.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LegendEntry {
    /// Terrain under the entity.
    pub terrain: Terrain,
    /// Components of an entity spawned on the cell, nothing is spawned if
    /// empty.
    pub spawn: Vec<Component>,
}

impl LegendEntry {
    pub fn builder(&self) -> Option<EntityBuilder> {
        if self.spawn.is_empty() {
            return None;
        }

        let mut ret = EntityBuilder::new();
        for c in &self.spawn {
            c.apply(&mut ret);
        }
        Some(ret)
    }
}

/// A starting setup: the field kinds in play and a map with the entities.
#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Scenario {
    pub fields: IndexMap<String, FieldVariant>,
    pub map: AsciiMap<LegendEntry>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Scenario: Can't read {path:?}"))?;
        let ret = idm::from_str(&text)
            .with_context(|| format!("Scenario: Bad data in {path:?}"))?;
        Ok(ret)
    }

    pub fn terrain(&self) -> anyhow::Result<TileMap> {
        TileMap::from_ascii_map(&self.map, |e| e.terrain)
    }
}
