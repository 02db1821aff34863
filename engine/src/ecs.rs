//! Components for the runtime entity store.

use derive_more::{Deref, DerefMut, From};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use util::IndexMap;

use crate::FieldOfVision;

#[derive(Clone, Debug, Eq, PartialEq, Default, Deref, Serialize, Deserialize)]
pub struct Name(pub String);

/// Map glyph of the entity.
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Default, Serialize, Deserialize,
)]
pub struct Icon(pub char);

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Default,
    Deref,
    From,
    Serialize,
    Deserialize,
)]
pub struct Position(pub IVec2);

/// The entity is a source of the named distance field.
#[derive(Clone, Debug, Eq, PartialEq, Default, Deref, Serialize, Deserialize)]
pub struct Emitter(pub String);

/// Field kinds the entity cares about and how much.
///
/// Negative weights attract, positive weights repel. Entities with desires
/// are the agents that move each turn.
#[derive(
    Clone,
    Debug,
    Eq,
    PartialEq,
    Default,
    Deref,
    DerefMut,
    Serialize,
    Deserialize,
)]
pub struct Desires(pub IndexMap<String, i32>);

impl Desires {
    pub fn weights(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.0.iter().map(|(k, &w)| (k.as_str(), w))
    }
}

/// The entity makes noise of this intensity every turn.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Noisy(pub f32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default, Deref, DerefMut)]
pub struct Sight(pub FieldOfVision);
