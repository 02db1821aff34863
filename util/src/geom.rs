use std::f32::consts::TAU;

use glam::{vec2, IVec2, Vec2};

/// 8 directions, clock face order.
pub const DIR_8: [IVec2; 8] = [
    IVec2::from_array([0, -1]),
    IVec2::from_array([1, -1]),
    IVec2::from_array([1, 0]),
    IVec2::from_array([1, 1]),
    IVec2::from_array([0, 1]),
    IVec2::from_array([-1, 1]),
    IVec2::from_array([-1, 0]),
    IVec2::from_array([-1, -1]),
];

/// The 8-neighborhood of a point in clock face order, starting from north.
///
/// No bounds checking, points may have negative coordinates.
pub fn s8(p: IVec2) -> impl Iterator<Item = IVec2> {
    DIR_8.into_iter().map(move |d| p + d)
}

/// Walk a ray from `origin` towards `angle`, one unit per step.
///
/// The origin itself is not included. Points are rounded to the nearest
/// cell, so the ray may visit the same cell more than once at shallow
/// angles. The iterator is infinite, bound it with `take`.
pub fn ray(origin: IVec2, angle: Angle) -> impl Iterator<Item = IVec2> {
    let delta = Vec2::from(angle);
    let mut pos = origin.as_vec2();

    std::iter::from_fn(move || {
        pos += delta;
        // Round half up, not away from zero, so that rays going in opposite
        // directions stay symmetric around cell centers.
        Some((pos + vec2(0.5, 0.5)).floor().as_ivec2())
    })
}

/// Ray direction. Zero points north and angles grow clockwise.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct Angle(f32);

impl Angle {
    pub fn new(deg: f32) -> Self {
        Angle(deg * TAU / 360.0)
    }

    /// Whole-degree angles around the full circle.
    pub fn full_circle() -> impl Iterator<Item = Angle> {
        (0..360).map(|deg| Angle::new(deg as f32))
    }
}

impl From<Angle> for Vec2 {
    fn from(value: Angle) -> Self {
        vec2(value.0.sin(), -value.0.cos())
    }
}
