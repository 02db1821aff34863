//! Distance field storage and the flood fill that builds it.

use std::collections::VecDeque;

use anyhow::bail;
use glam::{ivec2, IVec2};
use util::{s8, HashMap};
use world::Surface;

/// Integer step distances from a set of source cells.
///
/// A field that has never been generated is distinct from a generated field
/// where a cell is unreachable, see [`DistanceField::is_computed`].
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct DistanceField {
    values: HashMap<IVec2, usize>,
    is_computed: bool,
}

impl DistanceField {
    /// Distance to the nearest source, `None` for walls, unreached cells
    /// and fields that haven't been generated yet.
    pub fn value_at(&self, p: IVec2) -> Option<usize> {
        self.values.get(&p).copied()
    }

    /// Whether the field has been generated at least once.
    ///
    /// An empty field that isn't computed means "don't know yet", not "can't
    /// get there".
    pub fn is_computed(&self) -> bool {
        self.is_computed
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate all assigned cells, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, usize)> + '_ {
        self.values.iter().map(|(&p, &v)| (p, v))
    }

    /// Debug view of the field.
    ///
    /// Walls are `#`, unreached cells `?`, values are shown in base 36 and
    /// values that don't fit in one digit as `+`.
    pub fn render(&self, s: &(impl Surface + ?Sized)) -> String {
        let mut ret = String::new();
        for y in 0..s.height() {
            for x in 0..s.width() {
                let p = ivec2(x, y);
                let c = match self.value_at(p) {
                    Some(v) => {
                        std::char::from_digit(v as u32, 36).unwrap_or('+')
                    }
                    None if s.is_wall(p) => '#',
                    None => '?',
                };
                ret.push(c);
            }
            ret.push('\n');
        }
        ret.truncate(ret.trim_end().len());
        ret
    }
}

/// Reject surfaces the flood fill can't run on.
pub(crate) fn check_surface(s: &(impl Surface + ?Sized)) -> anyhow::Result<()> {
    if s.width() <= 0 || s.height() <= 0 {
        bail!("Zero-sized surface {}x{}", s.width(), s.height());
    }
    Ok(())
}

/// In-progress breadth-first flood fill over a surface.
///
/// Cells are claimed at most once. Walls are marked visited before anything
/// else happens, so they are never claimed.
pub(crate) struct Flood<'a, S: ?Sized> {
    surface: &'a S,
    visited: Vec<bool>,
    values: HashMap<IVec2, usize>,
}

impl<'a, S: Surface + ?Sized> Flood<'a, S> {
    pub fn new(surface: &'a S) -> Self {
        let (w, h) = (surface.width(), surface.height());
        let mut visited = Vec::with_capacity((w * h) as usize);
        for y in 0..h {
            for x in 0..w {
                visited.push(surface.is_wall(ivec2(x, y)));
            }
        }

        Flood {
            surface,
            visited,
            values: Default::default(),
        }
    }

    fn idx(&self, p: IVec2) -> Option<usize> {
        self.surface
            .contains(p)
            .then(|| (p.x + p.y * self.surface.width()) as usize)
    }

    /// Assign `value` to `p` if it's in bounds, not a wall and not visited
    /// yet. Returns whether the cell was claimed.
    fn claim(&mut self, p: IVec2, value: usize) -> bool {
        let Some(i) = self.idx(p) else {
            return false;
        };
        if self.visited[i] {
            return false;
        }

        self.visited[i] = true;
        debug_assert!(!self.values.contains_key(&p));
        self.values.insert(p, value);
        true
    }

    /// Set a source cell to zero. Returns false if the cell was already
    /// claimed or can't be claimed.
    pub fn seed(&mut self, p: IVec2) -> bool {
        self.claim(p, 0)
    }

    /// Claim the unvisited neighbors of an already claimed cell with the
    /// next distance value and push them to the back of `frontier`.
    pub fn expand(&mut self, p: IVec2, frontier: &mut VecDeque<IVec2>) {
        let Some(&value) = self.values.get(&p) else {
            return;
        };

        for n in s8(p) {
            if self.claim(n, value + 1) {
                frontier.push_back(n);
            }
        }
    }

    pub fn finish(self) -> DistanceField {
        DistanceField {
            values: self.values,
            is_computed: true,
        }
    }
}
