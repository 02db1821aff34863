use anyhow::{bail, Context};
use glam::IVec2;
use hecs::Entity;
use util::{HashMap, HashSet};
use world::{Surface, TileMap};

use crate::{
    ecs::*, DistanceField, FieldVariant, Fields, NoiseMap, Scenario,
};

/// How much noises fade every turn.
const NOISE_FADE: f32 = 1.0;

/// Main data container for the engine runtime.
pub struct Runtime {
    turn: u64,
    map: TileMap,
    ecs: hecs::World,
    fields: Fields,
    noises: NoiseMap,
}

impl Runtime {
    pub fn new(map: TileMap) -> Self {
        Runtime {
            turn: 0,
            map,
            ecs: Default::default(),
            fields: Default::default(),
            noises: Default::default(),
        }
    }

    pub fn from_scenario(scenario: &Scenario) -> anyhow::Result<Self> {
        let mut ret = Runtime::new(scenario.terrain()?);

        for (kind, &variant) in &scenario.fields {
            ret.declare(kind, variant)?;
        }

        for (p, c, entry) in scenario.map.iter() {
            let Some(mut builder) = entry.and_then(|e| e.builder()) else {
                continue;
            };
            ret.spawn(p, builder.build())
                .with_context(|| format!("Scenario: Bad entity {c:?} at {p}"))?;
        }

        Ok(ret)
    }

    pub fn declare(
        &mut self,
        kind: &str,
        variant: FieldVariant,
    ) -> anyhow::Result<()> {
        self.fields.declare(kind, variant)
    }

    /// Place a new entity on the map.
    ///
    /// Fails if the position is out of bounds or inside a wall or if the
    /// entity refers to field kinds that haven't been declared.
    pub fn spawn(
        &mut self,
        pos: IVec2,
        loadout: impl hecs::DynamicBundle,
    ) -> anyhow::Result<Entity> {
        if !self.map.contains(pos) {
            bail!("Runtime: Spawn position {pos} out of bounds");
        }
        if self.map.is_wall(pos) {
            bail!("Runtime: Can't spawn into wall at {pos}");
        }

        let e = self.ecs.spawn(loadout);
        self.ecs.insert_one(e, Position(pos))?;

        if let Err(err) = self.check_kinds(e) {
            self.ecs.despawn(e)?;
            return Err(err);
        }

        Ok(e)
    }

    fn check_kinds(&self, e: Entity) -> anyhow::Result<()> {
        if let Ok(emitter) = self.ecs.get::<&Emitter>(e) {
            match self.fields.variant(&emitter) {
                None => {
                    bail!("Runtime: Emitter of unknown field {:?}", emitter.0)
                }
                Some(FieldVariant::Single) => {
                    if let Some((other, _)) = self
                        .ecs
                        .query::<&Emitter>()
                        .iter()
                        .find(|&(o, k)| o != e && k.0 == emitter.0)
                    {
                        bail!(
                            "Runtime: Field {:?} already emitted by {other:?}",
                            emitter.0
                        );
                    }
                }
                Some(FieldVariant::Multi) => {}
            }
        }
        if let Ok(noisy) = self.ecs.get::<&Noisy>(e) {
            if !noisy.0.is_finite() || noisy.0 < 0.0 {
                bail!("Runtime: Bad noise intensity {}", noisy.0);
            }
        }
        if let Ok(desires) = self.ecs.get::<&Desires>(e) {
            if let Some(kind) =
                desires.keys().find(|k| !self.fields.is_declared(k))
            {
                bail!("Runtime: Desire for unknown field {kind:?}");
            }
        }
        Ok(())
    }

    pub fn despawn(&mut self, e: Entity) -> anyhow::Result<()> {
        self.ecs.despawn(e)?;
        self.fields.forget(e);
        Ok(())
    }

    /// Advance the runtime by one turn.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        // Emitters report where they are and changed fields get rebuilt.
        let emitters: Vec<(Entity, String, IVec2)> = self
            .ecs
            .query::<(&Emitter, &Position)>()
            .iter()
            .map(|(e, (kind, pos))| (e, kind.0.clone(), pos.0))
            .collect();
        for (e, kind, pos) in emitters {
            self.fields.track(&kind, e, pos, &self.map)?;
        }
        let n = self.fields.refresh(&self.map)?;
        if n > 0 {
            log::debug!("turn {}: regenerated {n} field(s)", self.turn);
        }

        self.noises.degrade(NOISE_FADE);
        let noisemakers: Vec<(Entity, f32, IVec2)> = self
            .ecs
            .query::<(&Noisy, &Position)>()
            .iter()
            .map(|(e, (noisy, pos))| (e, noisy.0, pos.0))
            .collect();
        for (e, intensity, pos) in noisemakers {
            self.noises.emit(&self.map, e, pos, intensity)?;
        }

        self.move_agents()?;

        self.turn += 1;
        Ok(())
    }

    /// Step every agent uphill on its combined field.
    fn move_agents(&mut self) -> anyhow::Result<()> {
        let agents: Vec<(Entity, IVec2, Desires)> = self
            .ecs
            .query::<(&Position, &Desires)>()
            .iter()
            .map(|(e, (pos, desires))| (e, pos.0, desires.clone()))
            .collect();

        // Agents don't walk into each other.
        let mut occupied: HashSet<IVec2> =
            agents.iter().map(|&(_, pos, _)| pos).collect();

        for (e, pos, desires) in agents {
            let steering = self.fields.steering(desires.weights());
            let Some(dir) = steering.uphill_step(&self.map, pos, |p| {
                !occupied.contains(&p)
            }) else {
                continue;
            };

            let dest = pos + dir;
            log::trace!("turn {}: {e:?} steps to {dest}", self.turn);
            occupied.remove(&pos);
            occupied.insert(dest);
            self.ecs.insert_one(e, Position(dest))?;
        }

        Ok(())
    }

    /// Number of turns run.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn ecs(&self) -> &hecs::World {
        &self.ecs
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, kind: &str) -> Option<&DistanceField> {
        self.fields.field(kind)
    }

    pub fn noises(&self) -> &NoiseMap {
        &self.noises
    }

    pub fn pos(&self, e: Entity) -> Option<IVec2> {
        self.ecs.get::<&Position>(e).ok().map(|p| p.0)
    }

    /// Find an entity by name.
    pub fn named(&self, name: &str) -> Option<Entity> {
        self.ecs
            .query::<&Name>()
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(e, _)| e)
    }

    /// Cells the entity can see, if it has sight.
    pub fn visible_cells(&self, e: Entity) -> Option<HashSet<IVec2>> {
        let sight = self.ecs.get::<&Sight>(e).ok()?;
        Some(sight.visible_from(&self.map, self.pos(e)?))
    }

    /// Draw the map with entity icons on top. Agents are drawn over other
    /// entities.
    pub fn render(&self) -> String {
        let mut drawn: Vec<(bool, IVec2, char)> = self
            .ecs
            .query::<(&Position, &Icon, Option<&Desires>)>()
            .iter()
            .map(|(_, (pos, icon, desires))| (desires.is_some(), pos.0, icon.0))
            .collect();
        drawn.sort_by_key(|&(is_agent, _, _)| is_agent);
        let icons: HashMap<IVec2, char> =
            drawn.into_iter().map(|(_, p, c)| (p, c)).collect();

        let mut ret = String::new();
        for y in 0..self.map.height() {
            if y > 0 {
                ret.push('\n');
            }
            for x in 0..self.map.width() {
                let p = IVec2::new(x, y);
                ret.push(match icons.get(&p) {
                    Some(&c) => c,
                    None => self.map.get(p).map_or(' ', char::from),
                });
            }
        }
        ret
    }
}
