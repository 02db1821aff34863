//! Weighted combination of distance fields into a single steering score.

use std::cmp::Reverse;

use glam::IVec2;
use util::{s8, HashMap};
use world::Surface;

use crate::DistanceField;

/// Sum `weight * value` over the fields for every cell at least one field
/// has a value for.
///
/// Fields without a value at a cell contribute nothing there. Unreachable
/// cells are left out of the sum, they don't count as infinitely far.
pub fn combine<'a>(
    fields: impl IntoIterator<Item = (&'a DistanceField, i32)>,
) -> HashMap<IVec2, i64> {
    let mut ret: HashMap<IVec2, i64> = HashMap::default();
    for (field, weight) in fields {
        for (p, v) in field.iter() {
            *ret.entry(p).or_default() += weight as i64 * v as i64;
        }
    }
    ret
}

/// A set of weighted fields an agent steers by.
///
/// Agents climb the score: a positive weight rewards distance from that
/// field's sources and pushes the agent away, a negative weight pulls the
/// agent towards them, zero means indifference.
#[derive(Clone, Default)]
pub struct Steering<'a> {
    fields: Vec<(&'a DistanceField, i32)>,
}

impl<'a> Steering<'a> {
    pub fn new(
        fields: impl IntoIterator<Item = (&'a DistanceField, i32)>,
    ) -> Self {
        Steering {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Combined score at a single cell, `None` if no field reaches it.
    pub fn score_at(&self, p: IVec2) -> Option<i64> {
        let mut ret = None;
        for &(field, weight) in &self.fields {
            if let Some(v) = field.value_at(p) {
                *ret.get_or_insert(0) += weight as i64 * v as i64;
            }
        }
        ret
    }

    /// Materialize the whole combined field.
    pub fn combined(&self) -> HashMap<IVec2, i64> {
        combine(self.fields.iter().copied())
    }

    /// Direction of the best step from `pos`, if any step improves on
    /// standing still.
    ///
    /// Only cells that don't block movement and pass `can_enter` are
    /// considered. A position with no score of its own is worse than any
    /// scored neighbor. Ties go to the first direction in clock face order.
    pub fn uphill_step(
        &self,
        surface: &(impl Surface + ?Sized),
        pos: IVec2,
        can_enter: impl Fn(IVec2) -> bool,
    ) -> Option<IVec2> {
        let here = self.score_at(pos).unwrap_or(i64::MIN);

        let (step, score) = s8(pos)
            .filter(|&p| !surface.blocks_movement(p) && can_enter(p))
            .filter_map(|p| self.score_at(p).map(|s| (p, s)))
            // min_by_key keeps the first of equal elements.
            .min_by_key(|&(_, s)| Reverse(s))?;

        (score > here).then(|| step - pos)
    }
}
