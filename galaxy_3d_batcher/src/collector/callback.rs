/// Capabilities the batch collector borrows from its caller for one frame.
///
/// The callback is passed explicitly to the stages that need it and is
/// only ever called from the calling thread: worker threads collect
/// unresolved work, the serial merge steps call back.

use std::sync::Arc;
use glam::UVec2;
use crate::batch::{PipelineState, PipelineStateContext, PipelineStateKey};
use crate::error::Result;
use crate::lighting::{default_has_shadow, ShadowMap};
use crate::scene::Light;

/// Shadow policy, temporary shadow maps and pipeline-state creation.
pub trait SceneBatchCollectorCallback {
    /// Whether a visible light at `distance` from the camera casts shadows
    /// this frame.
    fn has_shadow(&mut self, light: &Light, distance: f32) -> bool {
        default_has_shadow(light, distance)
    }

    /// Allocate a shadow map valid until the frame is submitted.
    ///
    /// `None` when the pool is exhausted; the split is then rendered
    /// unshadowed.
    fn allocate_shadow_map(&mut self, size: UVec2) -> Option<ShadowMap>;

    /// Create the pipeline state of a batch on a cache miss.
    ///
    /// An error drops the batch for this frame and is retried next frame.
    fn create_pipeline_state(
        &mut self,
        key: &PipelineStateKey,
        ctx: &PipelineStateContext,
    ) -> Result<Arc<dyn PipelineState>>;
}
