use std::collections::VecDeque;

use anyhow::{bail, Context};
use glam::{ivec2, IVec2};
use hecs::Entity;
use util::IndexMap;
use world::Surface;

use crate::{
    field::{check_surface, Flood},
    DistanceField, Source,
};

/// Distance field shared by any number of sources of the same kind, like
/// all the gold piles on the level.
///
/// Each cell gets the distance to whichever source's wavefront reached it
/// first. The sources expand in lockstep, one frontier cell per source per
/// round, and a claimed cell is never overwritten by another source's
/// wavefront. Tied cells go to the source that was registered first.
///
/// This is not an exact multi-source shortest path. A source with a wide
/// frontier advances fewer steps per round than one in a narrow corridor, so
/// the values along a boundary between two sources can jump by more than
/// one.
#[derive(Clone, Debug)]
pub struct MultiEntityMap {
    kind: String,
    /// Dimensions of the surface the map was registered on.
    dim: IVec2,
    /// Sources in registration order, which is also the expansion order.
    sources: IndexMap<Entity, Source>,
    /// Sources were added or removed since the last regeneration.
    membership_changed: bool,
    field: DistanceField,
}

impl MultiEntityMap {
    pub fn new(
        kind: impl Into<String>,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<Self> {
        check_surface(surface)?;
        Ok(MultiEntityMap {
            kind: kind.into(),
            dim: ivec2(surface.width(), surface.height()),
            sources: Default::default(),
            membership_changed: false,
            field: Default::default(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn field(&self) -> &DistanceField {
        &self.field
    }

    pub fn value_at(&self, p: IVec2) -> Option<usize> {
        self.field.value_at(p)
    }

    pub fn sources(&self) -> impl Iterator<Item = &Source> + '_ {
        self.sources.values()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.sources.contains_key(&entity)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn check_bounds(&self, pos: IVec2) -> anyhow::Result<()> {
        if !(pos.cmpge(IVec2::ZERO).all() && pos.cmplt(self.dim).all()) {
            bail!(
                "MultiEntityMap {:?}: Source position {pos} out of bounds",
                self.kind
            );
        }
        Ok(())
    }

    /// Register a new source. Re-adding an entity replaces its old source.
    pub fn add_source(&mut self, source: Source) -> anyhow::Result<()> {
        self.check_bounds(source.pos())?;
        self.check_bounds(source.prev_pos())?;
        self.sources.insert(source.entity(), source);
        self.membership_changed = true;
        Ok(())
    }

    pub fn remove_source(&mut self, entity: Entity) -> Option<Source> {
        // Keep the expansion order of the remaining sources.
        let ret = self.sources.shift_remove(&entity);
        if ret.is_some() {
            self.membership_changed = true;
        }
        ret
    }

    /// Record a source's current position.
    pub fn update_source(
        &mut self,
        entity: Entity,
        pos: IVec2,
    ) -> anyhow::Result<()> {
        self.check_bounds(pos)?;
        let kind = &self.kind;
        self.sources
            .get_mut(&entity)
            .with_context(|| {
                format!("MultiEntityMap {kind:?}: Unknown source {entity:?}")
            })?
            .move_to(pos);
        Ok(())
    }

    /// Whether any source moved or the source set changed since the field
    /// was last generated.
    pub fn is_dirty(&self) -> bool {
        self.membership_changed || self.sources.values().any(Source::has_moved)
    }

    /// Regenerate the field if it is dirty. Returns whether the field was
    /// regenerated.
    pub fn refresh_if_moved(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<bool> {
        if self.is_dirty() && !self.sources.is_empty() {
            self.regenerate(surface)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Rebuild the whole field from the current source positions.
    ///
    /// With no sources this does nothing and the previous values, if any,
    /// stay in place. Check [`MultiEntityMap::is_empty`] before relying on
    /// the field being fresh.
    pub fn regenerate(
        &mut self,
        surface: &(impl Surface + ?Sized),
    ) -> anyhow::Result<()> {
        check_surface(surface)?;
        if self.sources.is_empty() {
            log::debug!(
                "MultiEntityMap {:?}: No sources, field left as is",
                self.kind
            );
            return Ok(());
        }

        for s in self.sources.values() {
            if !surface.contains(s.pos()) {
                bail!(
                    "MultiEntityMap {:?}: Source position {} out of bounds",
                    self.kind,
                    s.pos()
                );
            }
        }

        let mut flood = Flood::new(surface);

        // Seed every source before any expansion so that no wavefront can
        // run over another source's starting cell.
        let mut frontiers: Vec<VecDeque<IVec2>> = Vec::new();
        for s in self.sources.values() {
            let mut frontier = VecDeque::new();
            if flood.seed(s.pos()) {
                frontier.push_back(s.pos());
            } else if surface.is_wall(s.pos()) {
                log::warn!(
                    "MultiEntityMap {:?}: Source at {} is inside a wall",
                    self.kind,
                    s.pos()
                );
            }
            frontiers.push(frontier);
        }

        // Round-robin, each unfinished source expands one frontier cell per
        // round until every frontier is exhausted.
        loop {
            let mut any_active = false;
            for frontier in frontiers.iter_mut() {
                if let Some(p) = frontier.pop_front() {
                    flood.expand(p, frontier);
                    any_active = true;
                }
            }
            if !any_active {
                break;
            }
        }

        self.field = flood.finish();
        self.membership_changed = false;
        log::debug!(
            "MultiEntityMap {:?}: Regenerated from {} sources, {} cells",
            self.kind,
            self.sources.len(),
            self.field.len()
        );
        Ok(())
    }
}
