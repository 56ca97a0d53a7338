//! Per-drawable light ranking.
//!
//! A `LightAccumulator` keeps the best lights affecting one drawable and
//! splits them into a pixel tier (per-pixel, shadow capable) and a vertex
//! tier. Storage is bounded: candidates that can no longer reach either
//! tier are dropped on insertion.
//!
//! Ranking key, best first: forced lights, then higher score, then lower
//! light index. Lights are accumulated in light index order, so the index
//! tie-break is also "first inserted wins". Because the key is total, the
//! final tiers depend only on the set of candidates, never on the order
//! they were inserted in.

use std::cmp::Ordering;
use crate::config::{MAX_PIXEL_LIGHTS, MAX_VERTEX_LIGHTS, NO_LIGHT};
use crate::scene::LightImportance;

/// Pixel-capable candidates that may still reach a tier.
const PIXEL_CANDIDATES: usize = MAX_PIXEL_LIGHTS + MAX_VERTEX_LIGHTS;

/// Light indices of the vertex tier, padded with `NO_LIGHT`.
pub type VertexLightIndices = [u32; MAX_VERTEX_LIGHTS];

/// Light indices of the pixel tier, padded with `NO_LIGHT`.
pub type PixelLightIndices = [u32; MAX_PIXEL_LIGHTS];

/// Parameters shared by all insertions of one light.
#[derive(Debug, Clone, Copy)]
pub struct LightAccumulatorContext {
    /// Index of the light in the visible light list
    pub light_index: u32,
    pub importance: LightImportance,
    /// Forced into the pixel tier regardless of score (directional lights)
    pub force_pixel: bool,
    /// Pixel light limit for non-forced lights
    pub max_pixel_lights: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    light_index: u32,
    score: f32,
    forced: bool,
}

impl Candidate {
    const EMPTY: Candidate = Candidate { light_index: NO_LIGHT, score: 0.0, forced: false };

    /// `Less` when `self` ranks before `other`.
    fn rank(&self, other: &Candidate) -> Ordering {
        other.forced.cmp(&self.forced)
            .then_with(|| other.score.total_cmp(&self.score))
            .then_with(|| self.light_index.cmp(&other.light_index))
    }
}

/// Insertion-sorted array with a fixed capacity; the worst entry falls off.
#[derive(Debug, Clone, Copy)]
struct RankedList<const N: usize> {
    entries: [Candidate; N],
    len: usize,
}

impl<const N: usize> RankedList<N> {
    const fn new() -> Self {
        Self { entries: [Candidate::EMPTY; N], len: 0 }
    }

    fn insert(&mut self, candidate: Candidate) {
        let pos = self.entries[..self.len]
            .iter()
            .position(|e| candidate.rank(e) == Ordering::Less)
            .unwrap_or(self.len);
        if pos >= N {
            return;
        }

        let end = self.len.min(N - 1);
        self.entries.copy_within(pos..end, pos + 1);
        self.entries[pos] = candidate;
        self.len = (self.len + 1).min(N);
    }

    fn as_slice(&self) -> &[Candidate] {
        &self.entries[..self.len]
    }
}

/// Bounded two-tier light ranking of one drawable.
#[derive(Debug, Clone, Copy)]
pub struct LightAccumulator {
    /// Candidates allowed in the pixel tier
    pixel_candidates: RankedList<PIXEL_CANDIDATES>,
    /// `NotImportant` candidates, vertex tier only
    vertex_candidates: RankedList<MAX_VERTEX_LIGHTS>,
    /// Forced candidates seen, including dropped ones
    num_forced: usize,
    max_pixel_lights: usize,
}

impl LightAccumulator {
    pub const fn new() -> Self {
        Self {
            pixel_candidates: RankedList::new(),
            vertex_candidates: RankedList::new(),
            num_forced: 0,
            max_pixel_lights: 0,
        }
    }

    /// Remove all candidates.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Offer a light with its importance score (higher is better).
    pub fn accumulate(&mut self, ctx: &LightAccumulatorContext, score: f32) {
        self.max_pixel_lights = self.max_pixel_lights.max(ctx.max_pixel_lights);

        let light_index = ctx.light_index;
        match ctx.importance {
            LightImportance::NotImportant => {
                self.vertex_candidates.insert(Candidate { light_index, score, forced: false });
            }
            LightImportance::Important | LightImportance::Auto => {
                let forced = ctx.force_pixel || ctx.importance == LightImportance::Important;
                if forced {
                    self.num_forced += 1;
                }
                self.pixel_candidates.insert(Candidate { light_index, score, forced });
            }
        }
    }

    /// Number of lights offered to this drawable that were kept.
    pub fn num_candidates(&self) -> usize {
        self.pixel_candidates.len + self.vertex_candidates.len
    }

    /// Pixel tier size: the configured limit, raised by forced lights, capped by capacity.
    pub fn num_pixel_lights(&self) -> usize {
        self.max_pixel_lights
            .max(self.num_forced)
            .min(MAX_PIXEL_LIGHTS)
            .min(self.pixel_candidates.len)
    }

    /// Pixel lights in descending importance, padded with `NO_LIGHT`.
    pub fn pixel_lights(&self) -> PixelLightIndices {
        let mut result = [NO_LIGHT; MAX_PIXEL_LIGHTS];
        let count = self.num_pixel_lights();
        for (slot, candidate) in result.iter_mut().zip(&self.pixel_candidates.as_slice()[..count]) {
            *slot = candidate.light_index;
        }
        result
    }

    /// Vertex lights in descending importance, padded with `NO_LIGHT`.
    ///
    /// Merges pixel-tier overflow with the vertex-only candidates.
    pub fn vertex_lights(&self) -> VertexLightIndices {
        let overflow = &self.pixel_candidates.as_slice()[self.num_pixel_lights()..];
        let vertex_only = self.vertex_candidates.as_slice();

        let mut merged = RankedList::<MAX_VERTEX_LIGHTS>::new();
        for candidate in overflow.iter().chain(vertex_only) {
            merged.insert(*candidate);
        }

        let mut result = [NO_LIGHT; MAX_VERTEX_LIGHTS];
        for (slot, candidate) in result.iter_mut().zip(merged.as_slice()) {
            *slot = candidate.light_index;
        }
        result
    }
}

impl Default for LightAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "light_accumulator_tests.rs"]
mod tests;
