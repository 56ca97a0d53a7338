//! Transient per-drawable data, addressed by dense drawable index.
//!
//! Recreated each frame by `SceneBatchCollector::begin_frame` and filled
//! by drawable processing. Storage is reused across frames.

use bitflags::bitflags;
use crate::lighting::ZRange;
use crate::scene::{DrawableIndex, ViewDistance};

bitflags! {
    /// What drawable processing found out about a drawable this frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DrawableTraits: u8 {
        /// Visible geometry processed this frame
        const VISIBLE_GEOMETRY = 1 << 0;
        /// Has lit batches in at least one scene pass
        const FORWARD_LIT = 1 << 1;
        /// Infinite bounds, excluded from the scene depth range
        const INFINITE = 1 << 2;
        /// Rendered into at least one shadowed split
        const SHADOW_CASTER = 1 << 3;
    }
}

/// Per-drawable table of traits, view depth ranges and camera distances.
#[derive(Debug, Clone, Default)]
pub struct DrawableData {
    traits: Vec<DrawableTraits>,
    z_ranges: Vec<ZRange>,
    distances: Vec<ViewDistance>,
}

impl DrawableData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every entry and size the table for `index_bound` drawables.
    pub fn reset(&mut self, index_bound: usize) {
        self.traits.clear();
        self.traits.resize(index_bound, DrawableTraits::empty());
        self.z_ranges.clear();
        self.z_ranges.resize(index_bound, ZRange::EMPTY);
        self.distances.clear();
        self.distances.resize(index_bound, ViewDistance::default());
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Store the data of one drawable. Indices beyond the table are ignored.
    pub fn set(&mut self, index: DrawableIndex, traits: DrawableTraits, z_range: ZRange, distance: ViewDistance) {
        let slot = index as usize;
        if slot < self.traits.len() {
            self.traits[slot] = traits;
            self.z_ranges[slot] = z_range;
            self.distances[slot] = distance;
        }
    }

    /// Flag a shadow caster. Returns `true` the first time a drawable that
    /// is not a visible geometry is flagged, its distances are then stored.
    pub fn set_shadow_caster(&mut self, index: DrawableIndex, distance: ViewDistance) -> bool {
        let Some(traits) = self.traits.get_mut(index as usize) else { return false };
        let updated = !traits.intersects(DrawableTraits::VISIBLE_GEOMETRY | DrawableTraits::SHADOW_CASTER);
        if updated {
            self.distances[index as usize] = distance;
        }
        *traits |= DrawableTraits::SHADOW_CASTER;
        updated
    }

    pub fn traits(&self, index: DrawableIndex) -> DrawableTraits {
        self.traits.get(index as usize).copied().unwrap_or_default()
    }

    pub fn z_range(&self, index: DrawableIndex) -> ZRange {
        self.z_ranges.get(index as usize).copied().unwrap_or_default()
    }

    /// Camera distance of the drawable (0 when not processed this frame).
    pub fn distance(&self, index: DrawableIndex) -> f32 {
        self.view_distance(index).distance
    }

    pub fn view_distance(&self, index: DrawableIndex) -> ViewDistance {
        self.distances.get(index as usize).copied().unwrap_or_default()
    }

    pub fn is_visible_geometry(&self, index: DrawableIndex) -> bool {
        self.traits(index).contains(DrawableTraits::VISIBLE_GEOMETRY)
    }
}

#[cfg(test)]
#[path = "drawable_data_tests.rs"]
mod tests;
