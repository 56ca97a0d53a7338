//! View-space depth ranges of drawables and of the whole visible scene.

use glam::{Mat4, Vec3};
use crate::scene::{AABB, LARGE_VALUE};

/// Depth range along the camera forward axis.
///
/// The default range is empty (`min > max`) and is the identity of `merge`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZRange {
    pub min: f32,
    pub max: f32,
}

impl ZRange {
    pub const EMPTY: ZRange = ZRange { min: f32::INFINITY, max: f32::NEG_INFINITY };

    /// Range assigned to infinite drawables; never accumulated.
    pub const INFINITE: ZRange = ZRange { min: LARGE_VALUE, max: LARGE_VALUE };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Smallest range containing both. Commutative and associative.
    pub fn merge(&self, other: &ZRange) -> ZRange {
        ZRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Expand to include `other` in place.
    pub fn accumulate(&mut self, other: &ZRange) {
        *self = self.merge(other);
    }

    /// Whether two valid ranges overlap.
    pub fn intersects(&self, other: &ZRange) -> bool {
        self.is_valid() && other.is_valid() && self.min <= other.max && other.min <= self.max
    }
}

impl Default for ZRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Evaluates the view depth range of world-space boxes for one camera.
#[derive(Debug, Clone, Copy)]
pub struct ZRangeEvaluator {
    /// Camera forward axis in world space, as read from the view matrix
    view_z: Vec3,
    abs_view_z: Vec3,
    view_z_offset: f32,
}

impl ZRangeEvaluator {
    pub fn new(view_matrix: &Mat4) -> Self {
        let row = view_matrix.row(2);
        // Right-handed view space looks down -Z; depth grows with -z.
        let view_z = -row.truncate();
        Self {
            view_z,
            abs_view_z: view_z.abs(),
            view_z_offset: -row.w,
        }
    }

    /// Depth range of a box. Infinite boxes give an empty range.
    pub fn evaluate(&self, aabb: &AABB) -> ZRange {
        if aabb.is_infinite() {
            return ZRange::EMPTY;
        }

        let center = self.view_z.dot(aabb.center()) + self.view_z_offset;
        let edge = self.abs_view_z.dot(aabb.half_size());
        ZRange::new(center - edge, center + edge)
    }
}

/// Reduce chunk-local ranges into the scene range.
pub fn reduce_z_ranges<'a>(ranges: impl IntoIterator<Item = &'a ZRange>) -> ZRange {
    ranges.into_iter().fold(ZRange::EMPTY, |acc, r| acc.merge(r))
}

#[cfg(test)]
#[path = "z_range_tests.rs"]
mod tests;
