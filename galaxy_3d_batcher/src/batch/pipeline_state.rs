/// Pipeline states and their per-pass cache.
///
/// Pipeline states are opaque objects created by the external device
/// layer. The collector only holds shared references for the frame and
/// caches them by `PipelineStateKey` across frames.

use std::fmt;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::camera::Camera;
use crate::error::Result;
use crate::scene::{DrawableKey, GeometryId, GeometryType, Light};

/// Opaque bundle of GPU draw configuration.
pub trait PipelineState: Send + Sync + fmt::Debug {
    /// Hash of the shader variation (32 bits used by the sort keys)
    fn shader_hash(&self) -> u32;

    /// Hash of the whole state
    fn state_hash(&self) -> u64;
}

/// Inputs a pipeline state is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineStateKey {
    pub geometry: GeometryId,
    pub geometry_type: GeometryType,
    pub material_id: u32,
    pub pass_hash: u64,
    /// Light variation, 0 for unlit batches
    pub light_hash: u64,
}

/// Extra information handed to the resolver on a cache miss.
#[derive(Debug, Clone, Copy)]
pub struct PipelineStateContext<'a> {
    /// Pass tag, always ends with a space
    pub shader_defines: &'a str,
    pub shadow_pass: bool,
    pub camera: &'a Camera,
    pub drawable: DrawableKey,
    pub light: Option<&'a Light>,
    pub light_has_shadow: bool,
}

/// Cache of pipeline states for one sub-pass.
///
/// Lookups (`get`) are read-only and safe to run from worker threads;
/// misses are resolved on the calling thread with `get_or_create`.
#[derive(Debug, Default)]
pub struct PipelineStateCache {
    states: FxHashMap<PipelineStateKey, Arc<dyn PipelineState>>,
}

impl PipelineStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PipelineStateKey) -> Option<Arc<dyn PipelineState>> {
        self.states.get(key).cloned()
    }

    /// Return the cached state or create it with `create`.
    ///
    /// Failures are not cached, the next frame retries.
    pub fn get_or_create<F>(&mut self, key: &PipelineStateKey, create: F) -> Result<Arc<dyn PipelineState>>
    where
        F: FnOnce() -> Result<Arc<dyn PipelineState>>,
    {
        if let Some(state) = self.states.get(key) {
            return Ok(state.clone());
        }

        let state = create()?;
        self.states.insert(*key, state.clone());
        Ok(state)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Drop every cached state (e.g. after a device reset).
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
