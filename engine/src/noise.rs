//! Sounds that spread over the map and fade over time.

use glam::IVec2;
use hecs::Entity;
use util::{ray, s8, Angle, HashMap};
use world::Surface;

/// Noise intensities per cell, per noisemaker.
#[derive(Clone, Default, Debug)]
pub struct NoiseMap {
    noises: HashMap<IVec2, HashMap<Entity, f32>>,
}

impl NoiseMap {
    /// Make a noise from `origin`.
    ///
    /// The origin gets the full intensity, every step along a ray away from
    /// it loses one unit. Rays stop at the map edge and right after entering
    /// a cell that blocks sound. A cell remembers the loudest noise each
    /// entity has made in it.
    pub fn emit(
        &mut self,
        surface: &(impl Surface + ?Sized),
        entity: Entity,
        origin: IVec2,
        intensity: f32,
    ) -> anyhow::Result<()> {
        if !surface.contains(origin) {
            anyhow::bail!("Noise origin {origin} outside map");
        }
        if intensity.is_nan() || intensity <= 0.0 {
            return Ok(());
        }
        if !intensity.is_finite() {
            anyhow::bail!("Noise intensity {intensity} out of range");
        }

        self.mark(origin, entity, intensity);

        // Number of steps before the noise dies out.
        let reach = intensity.ceil() as usize - 1;
        for angle in Angle::full_circle() {
            for (i, p) in ray(origin, angle).take(reach).enumerate() {
                if !surface.contains(p) {
                    break;
                }
                self.mark(p, entity, intensity - (i + 1) as f32);
                if surface.blocks_sound(p) {
                    break;
                }
            }
        }

        Ok(())
    }

    fn mark(&mut self, p: IVec2, entity: Entity, intensity: f32) {
        let n = self.noises.entry(p).or_default().entry(entity).or_default();
        *n = n.max(intensity);
    }

    /// Fade every noise by `rate`, dropping the ones that go silent.
    pub fn degrade(&mut self, rate: f32) {
        self.noises.retain(|_, cell| {
            cell.retain(|_, n| {
                *n -= rate;
                *n > 0.0
            });
            !cell.is_empty()
        });
    }

    pub fn noise_at(&self, p: IVec2, entity: Entity) -> Option<f32> {
        self.noises.get(&p)?.get(&entity).copied()
    }

    pub fn has_noises(&self, p: IVec2) -> bool {
        self.noises.contains_key(&p)
    }

    /// Noises by an entity in the in-bounds cells around `p`.
    pub fn adjacent_noises_for<'a>(
        &'a self,
        surface: &'a (impl Surface + ?Sized),
        entity: Entity,
        p: IVec2,
    ) -> impl Iterator<Item = (IVec2, f32)> + 'a {
        s8(p)
            .filter(|&q| surface.contains(q))
            .filter_map(move |q| Some((q, self.noise_at(q, entity)?)))
    }

    /// The cell next to `p` where the entity's noise is loudest.
    pub fn loudest_adjacent(
        &self,
        surface: &(impl Surface + ?Sized),
        entity: Entity,
        p: IVec2,
    ) -> Option<IVec2> {
        self.adjacent_noises_for(surface, entity, p)
            .fold(None, |acc: Option<(IVec2, f32)>, (q, n)| match acc {
                Some((_, best)) if best >= n => acc,
                _ => Some((q, n)),
            })
            .map(|(q, _)| q)
    }
}
