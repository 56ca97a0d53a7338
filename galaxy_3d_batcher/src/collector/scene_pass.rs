/// Scene passes: per render pass collection of scene batches.
///
/// A `ScenePass` binds three material passes of a technique by name:
/// unlit base, lit base and per-light forward pass. During drawable
/// processing every source batch becomes an intermediate batch in the
/// unlit and/or lit list (chunk-local, merged in input order). Once the
/// lights are accumulated, intermediates are expanded into scene batches,
/// their pipeline states are resolved and the batches are sorted.
///
/// Source batch classification:
///
/// | light pass | lit-base pass | result                                    |
/// |------------|---------------|-------------------------------------------|
/// | yes        | yes           | lit (lit-base, light)                     |
/// | yes        | no            | unlit (base) + lit (none, light)          |
/// | no         | -             | unlit (base)                              |
///
/// `ShadowScenePass` builds the batches of every shadowed split from its
/// casters with a single shadow material pass.

use std::sync::Arc;
use crate::batch::{
    BackToFrontSortKey, IntermediateSceneBatch, LightStateSortKey, PipelineStateCache,
    PipelineStateContext, SceneBatch, SceneBatchSource, StateSortKey,
    sort_batches_back_to_front, sort_batches_by_state, sort_light_batches_by_state,
};
use crate::camera::Camera;
use crate::config::NO_LIGHT;
use crate::engine_warn;
use crate::lighting::{LightAccumulator, SceneLight};
use crate::scene::{DrawableIndex, DrawableKey, Material, MaterialPass, MaterialQuality, Scene, Technique};
use crate::utils::{ThreadedVector, WorkQueue};
use super::callback::SceneBatchCollectorCallback;
use super::drawable_data::DrawableData;

/// Normalize a shader define string so that tags can be concatenated.
fn normalize_defines(defines: &str) -> String {
    let trimmed = defines.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{} ", trimmed)
    }
}

// ============================================================================
// Shared types
// ============================================================================

/// Submission order of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchSortMode {
    /// Minimize state changes (opaque geometry)
    #[default]
    ByState,
    /// Render order, then ascending camera distance
    BackToFront,
}

/// Sorted keys of the base and light batches of a pass.
#[derive(Debug, Clone)]
pub enum SortedSceneBatches {
    ByState {
        base: Vec<StateSortKey>,
        light: Vec<LightStateSortKey>,
    },
    BackToFront {
        base: Vec<BackToFrontSortKey>,
        light: Vec<BackToFrontSortKey>,
    },
}

impl SortedSceneBatches {
    fn empty(mode: BatchSortMode) -> Self {
        match mode {
            BatchSortMode::ByState => Self::ByState { base: Vec::new(), light: Vec::new() },
            BatchSortMode::BackToFront => Self::BackToFront { base: Vec::new(), light: Vec::new() },
        }
    }

    /// Indices into `ScenePass::base_batches` in submission order.
    pub fn base_order(&self) -> Vec<u32> {
        match self {
            Self::ByState { base, .. } => base.iter().map(|key| key.batch_index).collect(),
            Self::BackToFront { base, .. } => base.iter().map(|key| key.batch_index).collect(),
        }
    }

    /// Indices into `ScenePass::light_batches` in submission order.
    pub fn light_order(&self) -> Vec<u32> {
        match self {
            Self::ByState { light, .. } => light.iter().map(LightStateSortKey::batch_index).collect(),
            Self::BackToFront { light, .. } => light.iter().map(|key| key.batch_index).collect(),
        }
    }
}

/// Chunk-local intermediate batches of one pass.
#[derive(Debug, Clone, Default)]
pub(crate) struct PassBatches {
    pub unlit: Vec<IntermediateSceneBatch>,
    pub lit: Vec<IntermediateSceneBatch>,
}

/// Frame data shared by pass collection.
pub(crate) struct BatchContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub default_material: &'a Arc<Material>,
    pub material_quality: MaterialQuality,
    pub work_queue: &'a WorkQueue,
    pub batch_work_threshold: usize,
}

/// Result of light accumulation consumed by lit batch expansion.
pub(crate) struct ForwardLighting<'a> {
    pub lights: &'a [SceneLight],
    pub main_light: Option<u32>,
    pub accumulators: &'a [LightAccumulator],
    pub drawable_data: &'a DrawableData,
}

/// Material pass name, its shader define tag and its pipeline cache.
#[derive(Debug)]
struct SubPass {
    pass_name: String,
    shader_defines: String,
    cache: PipelineStateCache,
}

impl SubPass {
    fn new(pass_name: &str, shader_defines: &str) -> Self {
        Self {
            pass_name: pass_name.to_string(),
            shader_defines: normalize_defines(shader_defines),
            cache: PipelineStateCache::new(),
        }
    }

    fn find<'t>(&self, technique: &'t Technique) -> Option<&'t Arc<MaterialPass>> {
        technique.pass(&self.pass_name)
    }
}

fn light_hash(lights: &[SceneLight], light_index: u32) -> u64 {
    if light_index == NO_LIGHT {
        return 0;
    }
    lights.get(light_index as usize).map_or(0, SceneLight::pipeline_state_hash)
}

/// Look up pipeline states in parallel, then create the missing ones on
/// the calling thread. Returns the number of batches left unresolved.
fn resolve_pipeline_states(
    sub_pass: &mut SubPass,
    batches: &mut [SceneBatch],
    ctx: &BatchContext,
    lights: &[SceneLight],
    shadow_pass: bool,
    callback: &mut dyn SceneBatchCollectorCallback,
) -> usize {
    let cache = &sub_pass.cache;
    ctx.work_queue.for_each_parallel_mut(ctx.batch_work_threshold, batches, |_, chunk| {
        for batch in chunk {
            batch.pipeline_state = cache.get(&batch.pipeline_key(light_hash(lights, batch.light_index)));
        }
    });

    let mut unresolved = 0;
    for batch in batches.iter_mut().filter(|batch| batch.pipeline_state.is_none()) {
        let key = batch.pipeline_key(light_hash(lights, batch.light_index));
        let light = if batch.light_index == NO_LIGHT { None } else { lights.get(batch.light_index as usize) };
        let state_ctx = PipelineStateContext {
            shader_defines: &sub_pass.shader_defines,
            shadow_pass,
            camera: ctx.camera,
            drawable: batch.drawable,
            light: light.map(SceneLight::light),
            light_has_shadow: light.is_some_and(SceneLight::has_shadow),
        };

        match sub_pass.cache.get_or_create(&key, || callback.create_pipeline_state(&key, &state_ctx)) {
            Ok(state) => batch.pipeline_state = Some(state),
            Err(error) => {
                engine_warn!("galaxy3d::ScenePass",
                    "Dropped batch {} of drawable {:?} (material '{}', pass '{}'): {}",
                    batch.source_batch_index, batch.drawable, batch.material.name(),
                    sub_pass.pass_name, error);
                unresolved += 1;
            }
        }
    }
    unresolved
}

// ============================================================================
// Scene pass
// ============================================================================

/// Forward-lit render pass.
#[derive(Debug)]
pub struct ScenePass {
    name: String,
    sort_mode: BatchSortMode,
    unlit: SubPass,
    lit_base: SubPass,
    light: SubPass,
    unlit_intermediate: ThreadedVector<IntermediateSceneBatch>,
    lit_intermediate: ThreadedVector<IntermediateSceneBatch>,
    /// Unlit base batches followed by lit base batches
    base_batches: Vec<SceneBatch>,
    light_batches: Vec<SceneBatch>,
    sorted: SortedSceneBatches,
    num_dropped_batches: usize,
}

impl ScenePass {
    /// Create a pass from material pass names.
    ///
    /// Shader define tags default to `UNLIT `, `LITBASE ` and `LIGHT `.
    pub fn new(
        name: &str,
        unlit_pass: &str,
        lit_base_pass: &str,
        light_pass: &str,
        sort_mode: BatchSortMode,
    ) -> Self {
        Self {
            name: name.to_string(),
            sort_mode,
            unlit: SubPass::new(unlit_pass, "UNLIT"),
            lit_base: SubPass::new(lit_base_pass, "LITBASE"),
            light: SubPass::new(light_pass, "LIGHT"),
            unlit_intermediate: ThreadedVector::new(),
            lit_intermediate: ThreadedVector::new(),
            base_batches: Vec::new(),
            light_batches: Vec::new(),
            sorted: SortedSceneBatches::empty(sort_mode),
            num_dropped_batches: 0,
        }
    }

    /// Opaque forward pass: `base` / `litbase` / `light`, sorted by state.
    pub fn opaque() -> Self {
        Self::new("opaque", "base", "litbase", "light", BatchSortMode::ByState)
    }

    /// Transparent forward pass: `alpha` / `litalpha` / `light`, back to front.
    pub fn alpha() -> Self {
        Self::new("alpha", "alpha", "litalpha", "light", BatchSortMode::BackToFront)
    }

    /// Replace the shader define tags (builder style).
    pub fn with_shader_defines(mut self, unlit: &str, lit_base: &str, light: &str) -> Self {
        self.unlit.shader_defines = normalize_defines(unlit);
        self.lit_base.shader_defines = normalize_defines(lit_base);
        self.light.shader_defines = normalize_defines(light);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort_mode(&self) -> BatchSortMode {
        self.sort_mode
    }

    pub fn unlit_pass_name(&self) -> &str {
        &self.unlit.pass_name
    }

    pub fn lit_base_pass_name(&self) -> &str {
        &self.lit_base.pass_name
    }

    pub fn light_pass_name(&self) -> &str {
        &self.light.pass_name
    }

    /// Shader define tags of the unlit, lit base and light sub-passes.
    pub fn shader_defines(&self) -> [&str; 3] {
        [&self.unlit.shader_defines, &self.lit_base.shader_defines, &self.light.shader_defines]
    }

    /// Base batches: unlit batches, then lit base batches.
    pub fn base_batches(&self) -> &[SceneBatch] {
        &self.base_batches
    }

    /// Per-light forward batches.
    pub fn light_batches(&self) -> &[SceneBatch] {
        &self.light_batches
    }

    pub fn sorted_batches(&self) -> &SortedSceneBatches {
        &self.sorted
    }

    /// Batches dropped this frame because no pipeline state could be created.
    pub fn num_dropped_batches(&self) -> usize {
        self.num_dropped_batches
    }

    /// Number of cached pipeline states over the three sub-passes.
    pub fn num_cached_pipeline_states(&self) -> usize {
        self.unlit.cache.len() + self.lit_base.cache.len() + self.light.cache.len()
    }

    /// Forget every cached pipeline state.
    pub fn clear_pipeline_states(&mut self) {
        self.unlit.cache.clear();
        self.lit_base.cache.clear();
        self.light.cache.clear();
    }

    pub(crate) fn begin_frame(&mut self) {
        self.unlit_intermediate.clear();
        self.lit_intermediate.clear();
        self.base_batches.clear();
        self.light_batches.clear();
        self.sorted = SortedSceneBatches::empty(self.sort_mode);
        self.num_dropped_batches = 0;
    }

    /// Classify one source batch. Returns whether it produced a lit batch.
    pub(crate) fn add_source_batch(
        &self,
        technique: &Technique,
        drawable: DrawableKey,
        drawable_index: DrawableIndex,
        source_batch_index: u32,
        out: &mut PassBatches,
    ) -> bool {
        let intermediate = |base_pass: Option<&Arc<MaterialPass>>, additional_pass: Option<&Arc<MaterialPass>>| {
            IntermediateSceneBatch {
                drawable,
                drawable_index,
                source_batch_index,
                base_pass: base_pass.cloned(),
                additional_pass: additional_pass.cloned(),
            }
        };

        let unlit_pass = self.unlit.find(technique);
        let lit_base_pass = self.lit_base.find(technique);
        let light_pass = self.light.find(technique);

        match (light_pass, lit_base_pass, unlit_pass) {
            (Some(light), Some(lit_base), _) => {
                out.lit.push(intermediate(Some(lit_base), Some(light)));
                true
            }
            (Some(light), None, unlit) => {
                if unlit.is_some() {
                    out.unlit.push(intermediate(unlit, None));
                }
                out.lit.push(intermediate(None, Some(light)));
                true
            }
            (None, _, Some(unlit)) => {
                out.unlit.push(intermediate(Some(unlit), None));
                false
            }
            (None, _, None) => false,
        }
    }

    /// Append the intermediates of one processing chunk, in input order.
    pub(crate) fn append_chunk(&mut self, batches: PassBatches) {
        self.unlit_intermediate.push_segment(batches.unlit);
        self.lit_intermediate.push_segment(batches.lit);
    }

    #[cfg(test)]
    pub(crate) fn num_intermediate_batches(&self) -> (usize, usize) {
        (self.unlit_intermediate.len(), self.lit_intermediate.len())
    }

    /// Expand intermediates, resolve pipeline states and sort.
    pub(crate) fn collect_scene_batches(
        &mut self,
        ctx: &BatchContext,
        lighting: &ForwardLighting,
        callback: &mut dyn SceneBatchCollectorCallback,
    ) {
        let threshold = ctx.batch_work_threshold;

        let unlit_segments = ctx.work_queue.for_each_segment(threshold, &self.unlit_intermediate, |_, _, segment| {
            segment
                .iter()
                .filter_map(|intermediate| {
                    let pass = intermediate.base_pass.as_ref()?;
                    Self::make_batch(ctx, lighting, intermediate, NO_LIGHT, pass)
                })
                .collect::<Vec<_>>()
        });

        let lit_segments = ctx.work_queue.for_each_segment(threshold, &self.lit_intermediate, |_, _, segment| {
            let mut lit_base = Vec::new();
            let mut light = Vec::new();
            for intermediate in segment {
                Self::expand_lit(ctx, lighting, intermediate, &mut lit_base, &mut light);
            }
            (lit_base, light)
        });

        self.base_batches = unlit_segments.into_iter().flatten().collect();
        let num_unlit = self.base_batches.len();
        for (lit_base, light) in lit_segments {
            self.base_batches.extend(lit_base);
            self.light_batches.extend(light);
        }

        let (unlit_batches, lit_base_batches) = self.base_batches.split_at_mut(num_unlit);
        self.num_dropped_batches =
            resolve_pipeline_states(&mut self.unlit, unlit_batches, ctx, lighting.lights, false, callback)
            + resolve_pipeline_states(&mut self.lit_base, lit_base_batches, ctx, lighting.lights, false, callback)
            + resolve_pipeline_states(&mut self.light, &mut self.light_batches, ctx, lighting.lights, false, callback);

        if self.num_dropped_batches > 0 {
            self.base_batches.retain(|batch| batch.pipeline_state.is_some());
            self.light_batches.retain(|batch| batch.pipeline_state.is_some());
        }

        self.sorted = match self.sort_mode {
            BatchSortMode::ByState => SortedSceneBatches::ByState {
                base: sort_batches_by_state(&self.base_batches),
                light: sort_light_batches_by_state(&self.light_batches),
            },
            BatchSortMode::BackToFront => SortedSceneBatches::BackToFront {
                base: sort_batches_back_to_front(&self.base_batches),
                light: sort_batches_back_to_front(&self.light_batches),
            },
        };
    }

    fn make_batch(
        ctx: &BatchContext,
        lighting: &ForwardLighting,
        intermediate: &IntermediateSceneBatch,
        light_index: u32,
        pass: &Arc<MaterialPass>,
    ) -> Option<SceneBatch> {
        let drawable = ctx.scene.drawable(intermediate.drawable)?;
        let source = SceneBatchSource {
            drawable: intermediate.drawable,
            drawable_index: intermediate.drawable_index,
            source_batch_index: intermediate.source_batch_index,
            source_batch: drawable.source_batches.get(intermediate.source_batch_index as usize)?,
            view_distance: lighting.drawable_data.view_distance(intermediate.drawable_index),
        };
        Some(SceneBatch::new(&source, light_index, pass.clone(), ctx.default_material))
    }

    /// Lit base batch (main light or ambient only) plus one light batch
    /// per remaining pixel light.
    fn expand_lit(
        ctx: &BatchContext,
        lighting: &ForwardLighting,
        intermediate: &IntermediateSceneBatch,
        lit_base: &mut Vec<SceneBatch>,
        light: &mut Vec<SceneBatch>,
    ) {
        let accumulator = lighting
            .accumulators
            .get(intermediate.drawable_index as usize)
            .copied()
            .unwrap_or_default();
        let pixel_lights = accumulator.pixel_lights();
        let pixel_lights = &pixel_lights[..accumulator.num_pixel_lights()];

        let mut remaining = pixel_lights;
        if let Some(base_pass) = &intermediate.base_pass {
            let base_light = match (pixel_lights.first(), lighting.main_light) {
                (Some(&first), Some(main)) if first == main => {
                    remaining = &pixel_lights[1..];
                    first
                }
                _ => NO_LIGHT,
            };
            lit_base.extend(Self::make_batch(ctx, lighting, intermediate, base_light, base_pass));
        }

        if let Some(additional_pass) = &intermediate.additional_pass {
            for &light_index in remaining {
                light.extend(Self::make_batch(ctx, lighting, intermediate, light_index, additional_pass));
            }
        }
    }
}

// ============================================================================
// Shadow pass
// ============================================================================

/// Shadow caster pass shared by every shadowed split.
#[derive(Debug)]
pub struct ShadowScenePass {
    pass: SubPass,
    num_dropped_batches: usize,
}

impl Default for ShadowScenePass {
    fn default() -> Self {
        Self::new("shadow")
    }
}

impl ShadowScenePass {
    /// Shadow pass rendering the `pass_name` material pass with the `SHADOW ` tag.
    pub fn new(pass_name: &str) -> Self {
        Self {
            pass: SubPass::new(pass_name, "SHADOW"),
            num_dropped_batches: 0,
        }
    }

    pub fn with_shader_defines(mut self, defines: &str) -> Self {
        self.pass.shader_defines = normalize_defines(defines);
        self
    }

    pub fn pass_name(&self) -> &str {
        &self.pass.pass_name
    }

    pub fn shader_defines(&self) -> &str {
        &self.pass.shader_defines
    }

    pub fn num_dropped_batches(&self) -> usize {
        self.num_dropped_batches
    }

    pub fn num_cached_pipeline_states(&self) -> usize {
        self.pass.cache.len()
    }

    pub(crate) fn begin_frame(&mut self) {
        self.num_dropped_batches = 0;
    }

    /// Build, resolve and sort the batches of every shadowed split.
    ///
    /// Batches are built in parallel per light from the caster distances
    /// in `drawable_data`; pipeline states are then resolved like the
    /// forward passes.
    pub(crate) fn collect_shadow_batches(
        &mut self,
        ctx: &BatchContext,
        drawable_data: &DrawableData,
        lights: &mut [SceneLight],
        callback: &mut dyn SceneBatchCollectorCallback,
    ) {
        let pass = &self.pass;

        ctx.work_queue.for_each_item_mut(lights, |light_index, light| {
            for split in light.splits_mut() {
                split.shadow_batches.clear();
                split.sorted_shadow_batches.clear();
                if !split.is_shadowed() {
                    continue;
                }

                for &caster in &split.casters {
                    let Some(drawable) = ctx.scene.drawable(caster) else { continue };
                    let view_distance = drawable_data.view_distance(drawable.index());

                    for (source_batch_index, source_batch) in drawable.source_batches.iter().enumerate() {
                        let material = source_batch.material.as_ref().unwrap_or(ctx.default_material);
                        let Some(shadow_pass) = material
                            .find_technique(view_distance.lod_distance, ctx.material_quality)
                            .and_then(|technique| pass.find(technique))
                        else {
                            continue;
                        };

                        let source = SceneBatchSource {
                            drawable: caster,
                            drawable_index: drawable.index(),
                            source_batch_index: source_batch_index as u32,
                            source_batch,
                            view_distance,
                        };
                        split.shadow_batches.push(SceneBatch::new(
                            &source,
                            light_index as u32,
                            shadow_pass.clone(),
                            ctx.default_material,
                        ));
                    }
                }
            }
        });

        // Move the batches out so the lights can be read during resolution.
        let mut pending: Vec<(usize, usize, Vec<SceneBatch>)> = Vec::new();
        for (light_index, light) in lights.iter_mut().enumerate() {
            for (split_index, split) in light.splits_mut().iter_mut().enumerate() {
                if !split.shadow_batches.is_empty() {
                    pending.push((light_index, split_index, std::mem::take(&mut split.shadow_batches)));
                }
            }
        }

        for (_, _, batches) in &mut pending {
            let unresolved = resolve_pipeline_states(&mut self.pass, batches, ctx, lights, true, callback);
            if unresolved > 0 {
                batches.retain(|batch| batch.pipeline_state.is_some());
                self.num_dropped_batches += unresolved;
            }
        }

        for (light_index, split_index, batches) in pending {
            if let Some(split) = lights[light_index].splits_mut().get_mut(split_index) {
                split.sorted_shadow_batches = sort_batches_by_state(&batches);
                split.shadow_batches = batches;
            }
        }
    }
}

#[cfg(test)]
#[path = "scene_pass_tests.rs"]
mod tests;
