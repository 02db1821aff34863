//! Registry of all the distance fields in play, one per field kind.

use anyhow::bail;
use glam::IVec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use util::IndexMap;
use world::Surface;

use crate::{DistanceField, EntityMap, MultiEntityMap, Source, Steering};

/// How many sources a field kind has.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldVariant {
    /// At most one source, eg. the player.
    Single,
    /// Any number of sources of the same kind, eg. gold piles.
    Multi,
}

#[derive(Clone, Debug)]
pub enum Field {
    Single(EntityMap),
    Multi(MultiEntityMap),
}

impl Field {
    pub fn field(&self) -> &DistanceField {
        match self {
            Field::Single(m) => m.field(),
            Field::Multi(m) => m.field(),
        }
    }

    pub fn refresh_if_moved(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<bool> {
        match self {
            Field::Single(m) => m.refresh_if_moved(surface),
            Field::Multi(m) => m.refresh_if_moved(surface),
        }
    }
}

#[derive(Clone, Default, Debug)]
pub struct Fields {
    declared: IndexMap<String, FieldVariant>,
    fields: IndexMap<String, Field>,
}

impl Fields {
    /// Declare a field kind. Declaring a kind again with the same variant
    /// does nothing.
    pub fn declare(
        &mut self,
        kind: impl Into<String>,
        variant: FieldVariant,
    ) -> anyhow::Result<()> {
        let kind = kind.into();
        match self.declared.get(&kind) {
            Some(&v) if v != variant => {
                bail!("Field {kind:?} already declared as {v:?}")
            }
            _ => {
                self.declared.insert(kind, variant);
                Ok(())
            }
        }
    }

    pub fn is_declared(&self, kind: &str) -> bool {
        self.declared.contains_key(kind)
    }

    pub fn variant(&self, kind: &str) -> Option<FieldVariant> {
        self.declared.get(kind).copied()
    }

    /// Declared field kinds in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = (&str, FieldVariant)> + '_ {
        self.declared.iter().map(|(k, &v)| (k.as_str(), v))
    }

    pub fn get(&self, kind: &str) -> Option<&Field> {
        self.fields.get(kind)
    }

    /// The distance field of a kind, if it has ever had a source.
    pub fn field(&self, kind: &str) -> Option<&DistanceField> {
        self.get(kind).map(Field::field)
    }

    /// Report the position of an entity emitting a field kind.
    ///
    /// Registers the entity as a source the first time. A new single-source
    /// field is generated right away, everything else waits for the next
    /// [`Fields::refresh`].
    pub fn track(
        &mut self,
        kind: &str,
        entity: Entity,
        pos: IVec2,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<()> {
        let Some(&variant) = self.declared.get(kind) else {
            bail!("Unknown field kind {kind:?}");
        };

        if !self.fields.contains_key(kind) {
            let field = match variant {
                FieldVariant::Single => {
                    let mut m = EntityMap::new(kind, entity, pos, surface)?;
                    m.regenerate(surface)?;
                    Field::Single(m)
                }
                FieldVariant::Multi => {
                    let mut m = MultiEntityMap::new(kind, surface)?;
                    m.add_source(Source::new(entity, pos))?;
                    Field::Multi(m)
                }
            };
            self.fields.insert(kind.to_owned(), field);
            return Ok(());
        }

        match self.fields.get_mut(kind) {
            Some(Field::Single(m)) => {
                if m.source().entity() != entity {
                    bail!(
                        "Field {kind:?} already has source {:?}",
                        m.source().entity()
                    );
                }
                m.update_source_position(pos)
            }
            Some(Field::Multi(m)) => {
                if m.contains(entity) {
                    m.update_source(entity, pos)
                } else {
                    m.add_source(Source::new(entity, pos))
                }
            }
            None => Ok(()),
        }
    }

    /// Stop tracking an entity in every field.
    ///
    /// A single-source field is dropped along with its source. Multi-source
    /// fields keep their last values until regenerated.
    pub fn forget(&mut self, entity: Entity) {
        self.fields.retain(|_, f| match f {
            Field::Single(m) => m.source().entity() != entity,
            Field::Multi(m) => {
                m.remove_source(entity);
                true
            }
        });
    }

    /// Regenerate every field whose sources changed. Returns the number of
    /// regenerated fields.
    pub fn refresh(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<usize> {
        let mut ret = 0;
        for f in self.fields.values_mut() {
            if f.refresh_if_moved(surface)? {
                ret += 1;
            }
        }
        Ok(ret)
    }

    /// Combine the fields named in a set of desires.
    ///
    /// Kinds that have no field yet are skipped.
    pub fn steering<'a>(
        &'a self,
        weights: impl IntoIterator<Item = (&'a str, i32)>,
    ) -> Steering<'a> {
        Steering::new(
            weights
                .into_iter()
                .filter_map(|(kind, w)| self.field(kind).map(|f| (f, w))),
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::ivec2;
    use world::TileMap;

    use super::*;
    use crate::testing::entities;

    fn fields() -> Fields {
        let mut ret = Fields::default();
        ret.declare("player", FieldVariant::Single).unwrap();
        ret.declare("gold", FieldVariant::Multi).unwrap();
        ret
    }

    #[test]
    fn declarations() {
        let mut f = fields();
        assert!(f.declare("gold", FieldVariant::Multi).is_ok());
        assert!(f.declare("gold", FieldVariant::Single).is_err());
        assert_eq!(
            f.kinds().collect::<Vec<_>>(),
            vec![
                ("player", FieldVariant::Single),
                ("gold", FieldVariant::Multi),
            ]
        );
        assert_eq!(f.variant("player"), Some(FieldVariant::Single));
        assert_eq!(f.variant("unicorn"), None);

        let map = TileMap::new(3, 3).unwrap();
        let e = entities(1)[0];
        assert!(f.track("unicorn", e, ivec2(0, 0), &map).is_err());
    }

    #[test]
    fn single_field_lifecycle() {
        let map = TileMap::new(5, 5).unwrap();
        let es = entities(2);
        let mut f = fields();

        assert!(f.field("player").is_none());
        f.track("player", es[0], ivec2(0, 0), &map).unwrap();
        // Generated on registration.
        assert_eq!(f.field("player").unwrap().value_at(ivec2(4, 4)), Some(4));

        // Only one source allowed.
        assert!(f.track("player", es[1], ivec2(1, 1), &map).is_err());

        f.track("player", es[0], ivec2(4, 4), &map).unwrap();
        assert_eq!(f.refresh(&map).unwrap(), 1);
        assert_eq!(f.field("player").unwrap().value_at(ivec2(4, 4)), Some(0));

        f.track("player", es[0], ivec2(4, 4), &map).unwrap();
        assert_eq!(f.refresh(&map).unwrap(), 0);

        f.forget(es[0]);
        assert!(f.field("player").is_none());
        f.track("player", es[1], ivec2(2, 2), &map).unwrap();
        assert_eq!(f.field("player").unwrap().value_at(ivec2(2, 2)), Some(0));
    }

    #[test]
    fn multi_field_lifecycle() {
        let map = TileMap::new(7, 1).unwrap();
        let es = entities(2);
        let mut f = fields();

        f.track("gold", es[0], ivec2(0, 0), &map).unwrap();
        f.track("gold", es[1], ivec2(6, 0), &map).unwrap();
        assert!(!f.field("gold").unwrap().is_computed());
        assert_eq!(f.refresh(&map).unwrap(), 1);
        assert_eq!(f.field("gold").unwrap().value_at(ivec2(3, 0)), Some(3));

        f.forget(es[1]);
        assert_eq!(f.refresh(&map).unwrap(), 1);
        assert_eq!(f.field("gold").unwrap().value_at(ivec2(6, 0)), Some(6));

        // Out of bounds positions are rejected.
        assert!(f.track("gold", es[0], ivec2(7, 0), &map).is_err());
    }

    #[test]
    fn steering_skips_missing_fields() {
        let map = TileMap::new(5, 1).unwrap();
        let es = entities(1);
        let mut f = fields();
        f.track("player", es[0], ivec2(4, 0), &map).unwrap();

        let steering = f.steering([("player", -1), ("gold", -5)]);
        assert_eq!(steering.score_at(ivec2(0, 0)), Some(-4));
        assert_eq!(
            steering.uphill_step(&map, ivec2(0, 0), |_| true),
            Some(ivec2(1, 0))
        );
    }
}
