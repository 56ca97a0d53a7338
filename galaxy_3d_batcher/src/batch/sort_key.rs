/// Sort keys for resolved scene batches.
///
/// Every key ends with the batch index, so two keys never compare equal
/// and the unstable radix sort gives the same sequence every time.
///
/// `RadixKey` levels go from least (level 0) to most significant byte and
/// agree with the `Ord` implementations, which tests use as reference.

use std::cmp::Ordering;
use rdst::{RadixKey, RadixSort};
use crate::utils::{fold32, hash64};
use super::scene_batch::SceneBatch;

// ===== KEY BUILDING =====

/// Map a float onto a u32 whose unsigned order matches `f32::total_cmp`.
fn ordered_bits(value: f32) -> u32 {
    let bits = value.to_bits();
    if bits & 0x8000_0000 != 0 {
        !bits
    } else {
        bits | 0x8000_0000
    }
}

/// Byte `level` of a little-endian sequence of fields.
fn byte_of(value: u64, level: usize) -> u8 {
    (value >> (level * 8)) as u8
}

/// Render order (8) | shader variation (32) | pipeline state folded to 24 bits.
fn pipeline_key(batch: &SceneBatch) -> u64 {
    let (shader_hash, state_hash) = batch
        .pipeline_state
        .as_ref()
        .map_or((0, 0), |state| (state.shader_hash(), fold32(state.state_hash())));

    let render_order = batch.material.render_order() as u64;
    let folded_state = ((state_hash & 0x00ff_ffff) ^ (state_hash >> 24)) as u64;
    (render_order << 56) | ((shader_hash as u64) << 24) | folded_state
}

/// Material hash XOR lightmap (32) | geometry hash (32).
fn material_geometry_key(batch: &SceneBatch) -> u64 {
    let material_hash = (batch.material.id() ^ batch.lightmap_index) as u64;
    let geometry_hash = fold32(hash64(&(batch.geometry, batch.geometry_type))) as u64;
    (material_hash << 32) | geometry_hash
}

// ===== STATE KEY =====

/// Orders batches by pipeline state, then material and geometry, then back to front.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateSortKey {
    pub pipeline_key: u64,
    pub material_geometry_key: u64,
    pub distance: f32,
    /// Index of the batch in its source list
    pub batch_index: u32,
}

impl StateSortKey {
    pub fn new(batch: &SceneBatch, batch_index: u32) -> Self {
        Self {
            pipeline_key: pipeline_key(batch),
            material_geometry_key: material_geometry_key(batch),
            distance: batch.distance,
            batch_index,
        }
    }

    /// Descending distance as an ascending integer.
    fn distance_bits(&self) -> u32 {
        !ordered_bits(self.distance)
    }
}

impl Eq for StateSortKey {}

impl Ord for StateSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.pipeline_key.cmp(&other.pipeline_key)
            .then(self.material_geometry_key.cmp(&other.material_geometry_key))
            .then(other.distance.total_cmp(&self.distance))
            .then(self.batch_index.cmp(&other.batch_index))
    }
}

impl PartialOrd for StateSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RadixKey for StateSortKey {
    const LEVELS: usize = 24;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        match level {
            0..=3 => byte_of(self.batch_index as u64, level),
            4..=7 => byte_of(self.distance_bits() as u64, level - 4),
            8..=15 => byte_of(self.material_geometry_key, level - 8),
            _ => byte_of(self.pipeline_key, level - 16),
        }
    }
}

// ===== LIGHT STATE KEY =====

/// Orders light batches by light first, then like `StateSortKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LightStateSortKey {
    pub light_index: u32,
    pub state: StateSortKey,
}

impl LightStateSortKey {
    pub fn new(batch: &SceneBatch, batch_index: u32) -> Self {
        Self {
            light_index: batch.light_index,
            state: StateSortKey::new(batch, batch_index),
        }
    }

    pub fn batch_index(&self) -> u32 {
        self.state.batch_index
    }
}

impl RadixKey for LightStateSortKey {
    const LEVELS: usize = StateSortKey::LEVELS + 4;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        if level < StateSortKey::LEVELS {
            self.state.get_level(level)
        } else {
            byte_of(self.light_index as u64, level - StateSortKey::LEVELS)
        }
    }
}

// ===== BACK TO FRONT KEY =====

/// Orders batches by render order, then by ascending distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackToFrontSortKey {
    pub render_order: u8,
    pub distance: f32,
    pub batch_index: u32,
}

impl BackToFrontSortKey {
    pub fn new(batch: &SceneBatch, batch_index: u32) -> Self {
        Self {
            render_order: batch.material.render_order(),
            distance: batch.distance,
            batch_index,
        }
    }
}

impl Eq for BackToFrontSortKey {}

impl Ord for BackToFrontSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.render_order.cmp(&other.render_order)
            .then(self.distance.total_cmp(&other.distance))
            .then(self.batch_index.cmp(&other.batch_index))
    }
}

impl PartialOrd for BackToFrontSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RadixKey for BackToFrontSortKey {
    const LEVELS: usize = 9;

    #[inline]
    fn get_level(&self, level: usize) -> u8 {
        match level {
            0..=3 => byte_of(self.batch_index as u64, level),
            4..=7 => byte_of(ordered_bits(self.distance) as u64, level - 4),
            _ => self.render_order,
        }
    }
}

// ===== SORTING =====

/// Build and sort state keys for a batch list.
pub fn sort_batches_by_state(batches: &[SceneBatch]) -> Vec<StateSortKey> {
    let mut keys: Vec<StateSortKey> = batches
        .iter()
        .enumerate()
        .map(|(i, batch)| StateSortKey::new(batch, i as u32))
        .collect();
    keys.radix_sort_unstable();
    keys
}

/// Build and sort light state keys for a light batch list.
pub fn sort_light_batches_by_state(batches: &[SceneBatch]) -> Vec<LightStateSortKey> {
    let mut keys: Vec<LightStateSortKey> = batches
        .iter()
        .enumerate()
        .map(|(i, batch)| LightStateSortKey::new(batch, i as u32))
        .collect();
    keys.radix_sort_unstable();
    keys
}

/// Build and sort back-to-front keys for a batch list.
pub fn sort_batches_back_to_front(batches: &[SceneBatch]) -> Vec<BackToFrontSortKey> {
    let mut keys: Vec<BackToFrontSortKey> = batches
        .iter()
        .enumerate()
        .map(|(i, batch)| BackToFrontSortKey::new(batch, i as u32))
        .collect();
    keys.radix_sort_unstable();
    keys
}

#[cfg(test)]
#[path = "sort_key_tests.rs"]
mod tests;
