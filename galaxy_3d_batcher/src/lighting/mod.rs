//! Lighting module
//!
//! Per-drawable light ranking, view depth ranges, shadow map allocation
//! and the per-frame state of visible lights (lit geometries, shadow splits).

mod light_accumulator;
mod scene_light;
mod shadow_map;
mod z_range;

pub use light_accumulator::{
    LightAccumulator, LightAccumulatorContext, PixelLightIndices, VertexLightIndices,
};
pub use scene_light::{
    default_has_shadow, SceneLight, SceneLightContext, ShadowSplit, ShadowState,
};
pub use shadow_map::{ShadowMap, ShadowMapAllocator};
pub use z_range::{reduce_z_ranges, ZRange, ZRangeEvaluator};
