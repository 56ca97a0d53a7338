/// Scene batches: units of draw work before and after pipeline-state resolution.

use std::sync::Arc;
use crate::config::NO_LIGHT;
use crate::scene::{
    DrawableIndex, DrawableKey, GeometryId, GeometryType, Material, MaterialPass, SourceBatch,
    ViewDistance,
};
use super::pipeline_state::{PipelineState, PipelineStateKey};

/// Drawable × source batch × material pass pair collected during drawable processing.
///
/// `base_pass` is `None` for lit source batches whose technique has no
/// lit-base pass; their base is emitted as a separate unlit batch.
#[derive(Debug, Clone)]
pub struct IntermediateSceneBatch {
    pub drawable: DrawableKey,
    pub drawable_index: DrawableIndex,
    pub source_batch_index: u32,
    pub base_pass: Option<Arc<MaterialPass>>,
    /// Per-light forward pass
    pub additional_pass: Option<Arc<MaterialPass>>,
}

/// One source batch of a drawable, with the drawable's distances this frame.
#[derive(Debug, Clone, Copy)]
pub struct SceneBatchSource<'a> {
    pub drawable: DrawableKey,
    pub drawable_index: DrawableIndex,
    pub source_batch_index: u32,
    pub source_batch: &'a SourceBatch,
    pub view_distance: ViewDistance,
}

/// Base, lit-base, light or shadow batch ready for submission once
/// `pipeline_state` is set.
#[derive(Debug, Clone)]
pub struct SceneBatch {
    /// Index in the visible light list, `NO_LIGHT` for unlit batches
    pub light_index: u32,
    pub drawable: DrawableKey,
    pub drawable_index: DrawableIndex,
    pub source_batch_index: u32,
    pub geometry: GeometryId,
    pub geometry_type: GeometryType,
    pub material: Arc<Material>,
    pub pass: Arc<MaterialPass>,
    pub lightmap_index: u32,
    /// Camera distance of the drawable
    pub distance: f32,
    pub pipeline_state: Option<Arc<dyn PipelineState>>,
}

impl SceneBatch {
    /// Batch for one source batch of a drawable, without pipeline state.
    ///
    /// The geometry level is picked from the LOD distance. A source batch
    /// without material uses `default_material`.
    pub fn new(
        source: &SceneBatchSource,
        light_index: u32,
        pass: Arc<MaterialPass>,
        default_material: &Arc<Material>,
    ) -> Self {
        let source_batch = source.source_batch;
        Self {
            light_index,
            drawable: source.drawable,
            drawable_index: source.drawable_index,
            source_batch_index: source.source_batch_index,
            geometry: source_batch.geometry_at(source.view_distance.lod_distance),
            geometry_type: source_batch.geometry_type,
            material: source_batch.material.clone().unwrap_or_else(|| default_material.clone()),
            pass,
            lightmap_index: source_batch.lightmap_index,
            distance: source.view_distance.distance,
            pipeline_state: None,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.light_index != NO_LIGHT
    }

    /// Pipeline cache key of this batch under a light hash.
    pub fn pipeline_key(&self, light_hash: u64) -> PipelineStateKey {
        PipelineStateKey {
            geometry: self.geometry,
            geometry_type: self.geometry_type,
            material_id: self.material.id(),
            pass_hash: self.pass.state_hash(),
            light_hash,
        }
    }
}
