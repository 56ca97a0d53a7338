/// Mock collector callback for tests (no device required)
///
/// Serves shadow maps from a `ShadowMapAllocator`, creates hash-only
/// pipeline states and records every call. Failures can be scripted per
/// shadow request or per shader define tag.

use std::sync::Arc;
use glam::UVec2;
use crate::batch::{PipelineState, PipelineStateContext, PipelineStateKey};
use crate::error::{Error, Result};
use crate::lighting::{default_has_shadow, ShadowMap, ShadowMapAllocator};
use crate::scene::Light;
use crate::utils::{fold32, hash64};
use super::callback::SceneBatchCollectorCallback;

// ============================================================================
// Mock Pipeline State
// ============================================================================

#[derive(Debug)]
pub struct MockPipelineState {
    pub key: PipelineStateKey,
    pub shader_defines: String,
    shader_hash: u32,
    state_hash: u64,
}

impl MockPipelineState {
    pub fn new(key: PipelineStateKey, shader_defines: &str) -> Self {
        Self {
            key,
            shader_defines: shader_defines.to_string(),
            shader_hash: fold32(hash64(&(key.material_id, key.pass_hash, shader_defines))),
            state_hash: hash64(&key),
        }
    }
}

impl PipelineState for MockPipelineState {
    fn shader_hash(&self) -> u32 {
        self.shader_hash
    }

    fn state_hash(&self) -> u64 {
        self.state_hash
    }
}

// ============================================================================
// Mock Callback
// ============================================================================

/// Recorded pipeline-state request.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub key: PipelineStateKey,
    pub shader_defines: String,
    pub shadow_pass: bool,
    pub has_light: bool,
}

#[derive(Debug)]
pub struct MockBatchCallback {
    pub allocator: ShadowMapAllocator,
    /// Zero-based indices of `allocate_shadow_map` calls that return `None`
    pub failing_shadow_requests: Vec<usize>,
    /// Pipeline creation fails when the shader defines contain one of these
    pub failing_shader_defines: Vec<String>,
    /// Overrides the shadow policy when set
    pub force_shadows: Option<bool>,
    pub shadow_queries: Vec<(Light, f32)>,
    pub shadow_requests: Vec<UVec2>,
    pub pipeline_requests: Vec<PipelineRequest>,
}

impl MockBatchCallback {
    /// Mock with 4 shadow atlas pages of 2048².
    pub fn new() -> Self {
        Self::with_allocator(ShadowMapAllocator::new(2048, 4))
    }

    pub fn with_allocator(allocator: ShadowMapAllocator) -> Self {
        Self {
            allocator,
            failing_shadow_requests: Vec::new(),
            failing_shader_defines: Vec::new(),
            force_shadows: None,
            shadow_queries: Vec::new(),
            shadow_requests: Vec::new(),
            pipeline_requests: Vec::new(),
        }
    }

    pub fn fail_shadow_request(mut self, request_index: usize) -> Self {
        self.failing_shadow_requests.push(request_index);
        self
    }

    pub fn fail_shader_defines(mut self, tag: &str) -> Self {
        self.failing_shader_defines.push(tag.to_string());
        self
    }

    pub fn force_shadows(mut self, enabled: bool) -> Self {
        self.force_shadows = Some(enabled);
        self
    }

    /// Release shadow maps and forget recorded calls, keeping the script.
    pub fn end_frame(&mut self) {
        self.allocator.reset();
        self.shadow_queries.clear();
        self.shadow_requests.clear();
        self.pipeline_requests.clear();
    }
}

impl Default for MockBatchCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneBatchCollectorCallback for MockBatchCallback {
    fn has_shadow(&mut self, light: &Light, distance: f32) -> bool {
        self.shadow_queries.push((light.clone(), distance));
        self.force_shadows.unwrap_or_else(|| default_has_shadow(light, distance))
    }

    fn allocate_shadow_map(&mut self, size: UVec2) -> Option<ShadowMap> {
        let request_index = self.shadow_requests.len();
        self.shadow_requests.push(size);
        if self.failing_shadow_requests.contains(&request_index) {
            return None;
        }
        self.allocator.allocate(size)
    }

    fn create_pipeline_state(
        &mut self,
        key: &PipelineStateKey,
        ctx: &PipelineStateContext,
    ) -> Result<Arc<dyn PipelineState>> {
        self.pipeline_requests.push(PipelineRequest {
            key: *key,
            shader_defines: ctx.shader_defines.to_string(),
            shadow_pass: ctx.shadow_pass,
            has_light: ctx.light.is_some(),
        });

        if self.failing_shader_defines.iter().any(|tag| ctx.shader_defines.contains(tag.as_str())) {
            return Err(Error::PipelineStateUnavailable(format!(
                "no technique for material {} with defines '{}'",
                key.material_id, ctx.shader_defines
            )));
        }

        Ok(Arc::new(MockPipelineState::new(*key, ctx.shader_defines)))
    }
}

#[cfg(test)]
#[path = "mock_callback_tests.rs"]
mod tests;
