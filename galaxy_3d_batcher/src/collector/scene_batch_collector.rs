/// SceneBatchCollector: turns the visible drawables of one camera into
/// sorted, pipeline-resolved scene batches.
///
/// A frame runs four stages, in order, with the same `FrameContext`:
///
/// 1. `begin_frame`: reset per-frame storage, recycle light state
/// 2. `process_visible_drawables`: classify visible drawables in parallel
/// 3. `process_visible_lights`: lit geometries, shadow splits and maps,
///    distances of shadow casters the camera does not see
/// 4. `collect_scene_batches`: light accumulation, batch expansion,
///    pipeline resolution and sorting
///
/// Stages called out of order fail with `InvalidFrameStage` and leave the
/// collector untouched. Results stay readable until the next `begin_frame`.

use std::sync::Arc;
use glam::UVec2;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::camera::Camera;
use crate::config::{BatchCollectorConfig, MAX_PIXEL_LIGHTS, MAX_SCENE_PASSES, MAX_VERTEX_LIGHTS, NO_LIGHT};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::lighting::{
    LightAccumulator, LightAccumulatorContext, PixelLightIndices, SceneLight, SceneLightContext,
    VertexLightIndices, ZRange, ZRangeEvaluator,
};
use crate::scene::{
    DrawableIndex, DrawableKey, LightType, Material, MaterialQuality, Scene, SceneIndex,
    ViewDistance, LARGE_EPSILON,
};
use crate::utils::WorkQueue;
use crate::{engine_debug, engine_err, engine_trace, engine_warn};
use super::callback::SceneBatchCollectorCallback;
use super::drawable_data::{DrawableData, DrawableTraits};
use super::scene_pass::{BatchContext, ForwardLighting, PassBatches, ScenePass, ShadowScenePass};

const LOG_SOURCE: &str = "galaxy3d::SceneBatchCollector";

// ============================================================================
// Frame context
// ============================================================================

/// Caller-side frame parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInfo {
    pub frame_number: u64,
    pub time_step: f32,
    pub viewport_size: UVec2,
}

/// Everything a frame stage reads from the caller.
#[derive(Clone, Copy)]
pub struct FrameContext<'a> {
    pub frame_number: u64,
    pub time_step: f32,
    pub viewport_size: UVec2,
    pub camera: &'a Camera,
    pub scene: &'a Scene,
    pub scene_index: &'a dyn SceneIndex,
}

impl<'a> FrameContext<'a> {
    pub fn new(info: FrameInfo, camera: &'a Camera, scene: &'a Scene, scene_index: &'a dyn SceneIndex) -> Self {
        Self {
            frame_number: info.frame_number,
            time_step: info.time_step,
            viewport_size: info.viewport_size,
            camera,
            scene,
            scene_index,
        }
    }
}

/// Last completed stage of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameStage {
    /// No frame started yet
    #[default]
    Idle,
    Began,
    DrawablesProcessed,
    LightsProcessed,
    /// Frame complete, results readable
    BatchesCollected,
}

impl FrameStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameStage::Idle => "Idle",
            FrameStage::Began => "Began",
            FrameStage::DrawablesProcessed => "DrawablesProcessed",
            FrameStage::LightsProcessed => "LightsProcessed",
            FrameStage::BatchesCollected => "BatchesCollected",
        }
    }
}

/// Counters of the last frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStatistics {
    pub frame_number: u64,
    pub num_visible_geometries: usize,
    pub num_visible_lights: usize,
    pub num_shadowed_lights: usize,
    /// Splits that received a shadow map
    pub num_shadow_splits: usize,
    /// Splits whose shadow map request was refused
    pub num_failed_shadow_splits: usize,
    /// Shadow casters outside the visible geometries, updated for shadow batches
    pub num_offscreen_shadow_casters: usize,
    pub num_base_batches: usize,
    pub num_light_batches: usize,
    pub num_shadow_batches: usize,
    /// Source batches without technique plus batches without pipeline state
    pub num_dropped_batches: usize,
}

// ============================================================================
// Drawable processing
// ============================================================================

/// Output of one drawable processing chunk, merged serially in input order.
struct DrawableChunk {
    geometries: Vec<DrawableIndex>,
    entries: Vec<(DrawableIndex, DrawableTraits, ZRange, ViewDistance)>,
    lights: Vec<DrawableKey>,
    z_range: ZRange,
    passes: Vec<PassBatches>,
    num_dropped_batches: usize,
}

impl DrawableChunk {
    fn new(num_passes: usize) -> Self {
        Self {
            geometries: Vec::new(),
            entries: Vec::new(),
            lights: Vec::new(),
            z_range: ZRange::EMPTY,
            passes: vec![PassBatches::default(); num_passes],
            num_dropped_batches: 0,
        }
    }
}

/// Read-only frame data shared by the drawable processing workers.
struct DrawableProcessor<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    evaluator: ZRangeEvaluator,
    material_quality: MaterialQuality,
    default_material: &'a Arc<Material>,
    passes: &'a [ScenePass],
}

impl DrawableProcessor<'_> {
    fn process(&self, key: DrawableKey, chunk: &mut DrawableChunk) {
        let Some(drawable) = self.scene.drawable(key) else { return };
        if drawable.view_mask & self.camera.view_mask() == 0 {
            return;
        }

        let view_distance = drawable.view_distance(self.camera.position());
        if drawable.draw_distance > 0.0 && view_distance.distance > drawable.draw_distance {
            return;
        }

        if let Some(light) = drawable.light.as_ref().filter(|_| drawable.is_light()) {
            if drawable.light_mask != 0 && light.effective_color().max_element() > 0.0 {
                chunk.lights.push(key);
            }
        }

        if !drawable.is_geometry() {
            return;
        }

        let aabb = &drawable.world_aabb;
        let mut traits = DrawableTraits::VISIBLE_GEOMETRY;
        let z_range = if aabb.is_infinite() {
            traits |= DrawableTraits::INFINITE;
            ZRange::INFINITE
        } else {
            let z_range = self.evaluator.evaluate(aabb);
            chunk.z_range.accumulate(&z_range);
            z_range
        };

        let index = drawable.index();
        for (source_batch_index, source_batch) in drawable.source_batches.iter().enumerate() {
            let material = source_batch.material.as_ref().unwrap_or(self.default_material);
            let Some(technique) = material.find_technique(view_distance.lod_distance, self.material_quality) else {
                engine_warn!(LOG_SOURCE,
                    "Material '{}' has no technique for drawable {:?}, source batch {} skipped",
                    material.name(), key, source_batch_index);
                chunk.num_dropped_batches += 1;
                continue;
            };

            for (pass, batches) in self.passes.iter().zip(chunk.passes.iter_mut()) {
                if pass.add_source_batch(technique, key, index, source_batch_index as u32, batches) {
                    traits |= DrawableTraits::FORWARD_LIT;
                }
            }
        }

        chunk.geometries.push(index);
        chunk.entries.push((index, traits, z_range, view_distance));
    }
}

// ============================================================================
// Scene batch collector
// ============================================================================

pub struct SceneBatchCollector {
    config: BatchCollectorConfig,
    work_queue: Arc<WorkQueue>,
    default_material: Arc<Material>,
    passes: Vec<ScenePass>,
    shadow_pass: Option<ShadowScenePass>,

    stage: FrameStage,
    frame_number: u64,
    material_quality: MaterialQuality,

    drawable_data: DrawableData,
    /// Ascending dense indices
    visible_geometries: Vec<DrawableIndex>,
    light_candidates: Vec<DrawableKey>,
    scene_z_range: ZRange,

    visible_lights: Vec<SceneLight>,
    /// State of lights not visible this frame, kept for reuse
    light_cache: FxHashMap<DrawableKey, SceneLight>,
    main_light: Option<u32>,
    /// Indexed by dense drawable index
    light_accumulators: Vec<LightAccumulator>,

    statistics: FrameStatistics,
}

impl SceneBatchCollector {
    /// Create a collector running its parallel work on `work_queue`.
    ///
    /// A shadow pass named "shadow" is installed; scene passes are added
    /// with `add_scene_pass`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration is rejected.
    pub fn new(config: BatchCollectorConfig, work_queue: Arc<WorkQueue>) -> Result<Self> {
        config.validate().map_err(|error| engine_err!(LOG_SOURCE, error))?;

        engine_debug!(LOG_SOURCE, "Created with {} worker threads, max {} pixel lights",
            work_queue.num_threads(), config.pixel_light_limit());

        Ok(Self {
            config,
            work_queue,
            default_material: Arc::new(Material::default_material()),
            passes: Vec::new(),
            shadow_pass: Some(ShadowScenePass::default()),
            stage: FrameStage::Idle,
            frame_number: 0,
            material_quality: MaterialQuality::High,
            drawable_data: DrawableData::new(),
            visible_geometries: Vec::new(),
            light_candidates: Vec::new(),
            scene_z_range: ZRange::EMPTY,
            visible_lights: Vec::new(),
            light_cache: FxHashMap::default(),
            main_light: None,
            light_accumulators: Vec::new(),
            statistics: FrameStatistics::default(),
        })
    }

    /// Create a collector sharing the engine's work queue singleton.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine or its work queue is not initialized,
    /// or if the configuration is rejected.
    pub fn with_engine_queue(config: BatchCollectorConfig) -> Result<Self> {
        Self::new(config, Engine::work_queue()?)
    }

    // ===== CONFIGURATION =====

    fn check_configurable(&self) -> Result<()> {
        match self.stage {
            FrameStage::Idle | FrameStage::BatchesCollected => Ok(()),
            stage => Err(engine_err!(LOG_SOURCE, Error::InvalidFrameStage {
                expected: FrameStage::BatchesCollected.as_str(),
                actual: stage.as_str(),
            })),
        }
    }

    /// Append a scene pass. Returns its index, or `None` when the pass
    /// limit is reached (the pass is dropped with a warning).
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` in the middle of a frame.
    pub fn add_scene_pass(&mut self, pass: ScenePass) -> Result<Option<usize>> {
        self.check_configurable()?;

        if self.passes.len() >= MAX_SCENE_PASSES {
            engine_warn!(LOG_SOURCE, "Scene pass '{}' ignored: at most {} scene passes are supported",
                pass.name(), MAX_SCENE_PASSES);
            return Ok(None);
        }

        self.passes.push(pass);
        Ok(Some(self.passes.len() - 1))
    }

    /// Remove every scene pass, with their pipeline state caches.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` in the middle of a frame.
    pub fn reset_passes(&mut self) -> Result<()> {
        self.check_configurable()?;
        self.passes.clear();
        Ok(())
    }

    /// Replace the shadow pass. `None` disables shadow batches; shadow
    /// maps are still allocated.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` in the middle of a frame.
    pub fn set_shadow_pass(&mut self, pass: Option<ShadowScenePass>) -> Result<()> {
        self.check_configurable()?;
        self.shadow_pass = pass;
        Ok(())
    }

    /// Material substituted for source batches without one.
    pub fn set_default_material(&mut self, material: Arc<Material>) {
        self.default_material = material;
    }

    // ===== FRAME STAGES =====

    fn check_stage(&self, frame: &FrameContext, expected: FrameStage) -> Result<()> {
        if self.stage != expected {
            return Err(engine_err!(LOG_SOURCE, Error::InvalidFrameStage {
                expected: expected.as_str(),
                actual: self.stage.as_str(),
            }));
        }
        if frame.frame_number != self.frame_number {
            return Err(engine_err!(LOG_SOURCE, Error::FrameMismatch {
                expected: self.frame_number,
                actual: frame.frame_number,
            }));
        }
        Ok(())
    }

    /// Start a new frame. Allowed from any stage; an unfinished frame is
    /// abandoned.
    pub fn begin_frame(&mut self, frame: &FrameContext) -> Result<()> {
        if matches!(self.stage, FrameStage::Began | FrameStage::DrawablesProcessed | FrameStage::LightsProcessed) {
            engine_warn!(LOG_SOURCE, "Frame {} abandoned in stage {}", self.frame_number, self.stage.as_str());
        }
        if self.passes.is_empty() {
            engine_warn!(LOG_SOURCE, "Frame {} started without scene passes", frame.frame_number);
        }

        self.frame_number = frame.frame_number;
        self.material_quality = if frame.camera.low_material_quality() {
            MaterialQuality::Low
        } else {
            self.config.material_quality
        };

        for light in self.visible_lights.drain(..) {
            self.light_cache.insert(light.key(), light);
        }
        let max_idle = u64::from(self.config.light_cache_max_idle_frames);
        let frame_number = frame.frame_number;
        let scene = frame.scene;
        let num_cached = self.light_cache.len();
        self.light_cache.retain(|&key, light| {
            frame_number.saturating_sub(light.last_seen_frame()) <= max_idle && scene.drawable(key).is_some()
        });
        if self.light_cache.len() < num_cached {
            engine_trace!(LOG_SOURCE, "Released {} cached lights", num_cached - self.light_cache.len());
        }

        self.drawable_data.reset(frame.scene.index_bound() as usize);
        self.visible_geometries.clear();
        self.light_candidates.clear();
        self.scene_z_range = ZRange::EMPTY;
        self.main_light = None;
        for pass in &mut self.passes {
            pass.begin_frame();
        }
        if let Some(shadow_pass) = &mut self.shadow_pass {
            shadow_pass.begin_frame();
        }

        self.statistics = FrameStatistics { frame_number, ..Default::default() };
        self.stage = FrameStage::Began;
        Ok(())
    }

    /// Classify the visible drawables, in parallel chunks.
    ///
    /// Collects light candidates, the visible geometries with their traits,
    /// depth ranges and camera distances, and the intermediate batches of
    /// every scene pass.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` unless called right after `begin_frame`,
    /// `FrameMismatch` for another frame.
    pub fn process_visible_drawables(&mut self, frame: &FrameContext, drawables: &[DrawableKey]) -> Result<()> {
        self.check_stage(frame, FrameStage::Began)?;

        let processor = DrawableProcessor {
            scene: frame.scene,
            camera: frame.camera,
            evaluator: ZRangeEvaluator::new(frame.camera.view_matrix()),
            material_quality: self.material_quality,
            default_material: &self.default_material,
            passes: &self.passes,
        };
        let num_passes = self.passes.len();
        let chunks = self.work_queue.for_each_parallel(self.config.drawable_work_threshold, drawables, |_, _, keys| {
            let mut chunk = DrawableChunk::new(num_passes);
            for &key in keys {
                processor.process(key, &mut chunk);
            }
            chunk
        });

        for chunk in chunks {
            for (index, traits, z_range, distance) in chunk.entries {
                self.drawable_data.set(index, traits, z_range, distance);
            }
            self.visible_geometries.extend(chunk.geometries);
            self.light_candidates.extend(chunk.lights);
            self.scene_z_range.accumulate(&chunk.z_range);
            for (pass, batches) in self.passes.iter_mut().zip(chunk.passes) {
                pass.append_chunk(batches);
            }
            self.statistics.num_dropped_batches += chunk.num_dropped_batches;
        }
        self.visible_geometries.sort_unstable();
        self.visible_geometries.dedup();
        self.statistics.num_visible_geometries = self.visible_geometries.len();

        engine_trace!(LOG_SOURCE, "Frame {}: {} visible geometries, {} light candidates",
            self.frame_number, self.visible_geometries.len(), self.light_candidates.len());

        self.stage = FrameStage::DrawablesProcessed;
        Ok(())
    }

    /// Build the state of every visible light: shadow decision, lit
    /// geometries, shadow splits with casters and shadow maps.
    ///
    /// Shadow maps are requested serially, largest lights first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` unless drawables were processed,
    /// `FrameMismatch` for another frame.
    pub fn process_visible_lights(
        &mut self,
        frame: &FrameContext,
        callback: &mut dyn SceneBatchCollectorCallback,
    ) -> Result<()> {
        self.check_stage(frame, FrameStage::DrawablesProcessed)?;

        let camera_position = frame.camera.position();
        let mut seen = FxHashSet::default();
        for &key in &self.light_candidates {
            if !seen.insert(key) {
                continue;
            }
            let Some(drawable) = frame.scene.drawable(key) else { continue };
            let Some(light) = drawable.light.as_ref() else { continue };

            let distance = drawable.view_distance(camera_position).distance;
            let has_shadow = callback.has_shadow(light, distance);

            let mut scene_light = self.light_cache
                .remove(&key)
                .unwrap_or_else(|| SceneLight::new(key, light.clone()));
            scene_light.begin_frame(drawable, light, has_shadow, frame.frame_number);
            scene_light.set_distance(distance);
            self.visible_lights.push(scene_light);
        }

        let ctx = SceneLightContext {
            scene: frame.scene,
            scene_index: frame.scene_index,
            camera: frame.camera,
            visible_geometries: &self.visible_geometries,
            scene_z_range: self.scene_z_range,
            shadow_caster_extrusion: self.config.shadow_caster_extrusion,
        };
        self.work_queue.for_each_item_mut(&mut self.visible_lights, |_, light| {
            light.update_lit_geometries_and_shadow_casters(&ctx);
        });

        // Stable: equal sizes keep their visibility order
        self.visible_lights.sort_by(|a, b| b.shadow_map_size().cmp(&a.shadow_map_size()));

        let mut num_failed = 0;
        for light in &mut self.visible_lights {
            num_failed += light.allocate_shadow_maps(|size| callback.allocate_shadow_map(size));
        }
        if num_failed > 0 {
            engine_debug!(LOG_SOURCE, "Frame {}: {} shadow splits rendered without shadow map",
                self.frame_number, num_failed);
        }

        let num_offscreen_casters = self.update_shadow_casters(frame);
        self.main_light = self.find_main_light();

        let stats = &mut self.statistics;
        stats.num_visible_lights = self.visible_lights.len();
        stats.num_shadowed_lights = self.visible_lights.iter().filter(|l| l.has_shadow()).count();
        stats.num_shadow_splits = self.visible_lights.iter().map(|l| l.shadowed_splits().count()).sum();
        stats.num_failed_shadow_splits = num_failed;
        stats.num_offscreen_shadow_casters = num_offscreen_casters;

        engine_trace!(LOG_SOURCE, "Frame {}: {} visible lights, {} shadowed, main light {:?}",
            self.frame_number, stats.num_visible_lights, stats.num_shadowed_lights, self.main_light);

        self.stage = FrameStage::LightsProcessed;
        Ok(())
    }

    /// Flag the casters of every shadowed split and store the distances of
    /// those the camera does not see, so their shadow batches select LODs
    /// from this frame's camera position. Returns how many were updated.
    fn update_shadow_casters(&mut self, frame: &FrameContext) -> usize {
        let camera_position = frame.camera.position();
        let mut num_updated = 0;
        for light in &self.visible_lights {
            for (_, split) in light.shadowed_splits() {
                for &caster in &split.casters {
                    let Some(drawable) = frame.scene.drawable(caster) else { continue };
                    if self.drawable_data.set_shadow_caster(drawable.index(), drawable.view_distance(camera_position)) {
                        num_updated += 1;
                    }
                }
            }
        }
        num_updated
    }

    /// Brightest directional light; ties go to the smallest drawable key.
    fn find_main_light(&self) -> Option<u32> {
        self.visible_lights
            .iter()
            .enumerate()
            .filter(|(_, light)| light.light().light_type == LightType::Directional && light.light().intensity() > 0.0)
            .max_by(|(_, a), (_, b)| {
                a.light().intensity().total_cmp(&b.light().intensity())
                    .then_with(|| b.key().cmp(&a.key()))
            })
            .map(|(index, _)| index as u32)
    }

    /// Rank the lights of every visible geometry into pixel and vertex tiers.
    ///
    /// Geometry-major: each accumulator is owned by one worker and sees the
    /// lights in light index order.
    fn accumulate_forward_lighting(&mut self, scene: &Scene) {
        self.light_accumulators.clear();
        self.light_accumulators.resize(self.drawable_data.len(), LightAccumulator::new());

        let max_pixel_lights = self.config.pixel_light_limit();
        let main_light = self.main_light;
        let lights: Vec<(LightAccumulatorContext, &SceneLight)> = self.visible_lights
            .iter()
            .enumerate()
            .map(|(index, light)| {
                let ctx = LightAccumulatorContext {
                    light_index: index as u32,
                    importance: light.light().importance,
                    force_pixel: light.light().light_type == LightType::Directional,
                    max_pixel_lights,
                };
                (ctx, light)
            })
            .collect();
        let drawable_data = &self.drawable_data;

        self.work_queue.for_each_parallel_mut(
            self.config.lit_geometries_work_threshold,
            &mut self.light_accumulators,
            |offset, accumulators| {
                for (i, accumulator) in accumulators.iter_mut().enumerate() {
                    let index = (offset + i) as DrawableIndex;
                    if !drawable_data.is_visible_geometry(index) {
                        continue;
                    }
                    let Some(drawable) = scene.drawable_by_index(index) else { continue };

                    for (ctx, light) in &lights {
                        if light.lit_geometries().binary_search(&index).is_err() {
                            continue;
                        }
                        let score = if main_light == Some(ctx.light_index) {
                            f32::MAX
                        } else {
                            let distance = light.light().distance_to(&drawable.world_aabb);
                            light.light().intensity() / distance.max(LARGE_EPSILON)
                        };
                        accumulator.accumulate(ctx, score);
                    }
                }
            },
        );
    }

    /// Accumulate lights, then build, resolve and sort the batches of the
    /// shadow pass and every scene pass.
    ///
    /// Batches whose pipeline state cannot be created are dropped with a
    /// warning and counted in the statistics.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFrameStage` unless lights were processed,
    /// `FrameMismatch` for another frame.
    pub fn collect_scene_batches(
        &mut self,
        frame: &FrameContext,
        callback: &mut dyn SceneBatchCollectorCallback,
    ) -> Result<()> {
        self.check_stage(frame, FrameStage::LightsProcessed)?;

        self.accumulate_forward_lighting(frame.scene);

        let ctx = BatchContext {
            scene: frame.scene,
            camera: frame.camera,
            default_material: &self.default_material,
            material_quality: self.material_quality,
            work_queue: &self.work_queue,
            batch_work_threshold: self.config.batch_work_threshold,
        };

        if let Some(shadow_pass) = &mut self.shadow_pass {
            shadow_pass.collect_shadow_batches(&ctx, &self.drawable_data, &mut self.visible_lights, callback);
        }

        let lighting = ForwardLighting {
            lights: &self.visible_lights,
            main_light: self.main_light,
            accumulators: &self.light_accumulators,
            drawable_data: &self.drawable_data,
        };
        for pass in &mut self.passes {
            pass.collect_scene_batches(&ctx, &lighting, callback);
        }

        let stats = &mut self.statistics;
        for pass in &self.passes {
            stats.num_base_batches += pass.base_batches().len();
            stats.num_light_batches += pass.light_batches().len();
            stats.num_dropped_batches += pass.num_dropped_batches();
        }
        if let Some(shadow_pass) = &self.shadow_pass {
            stats.num_dropped_batches += shadow_pass.num_dropped_batches();
        }
        stats.num_shadow_batches = self.visible_lights
            .iter()
            .flat_map(|light| light.splits())
            .map(|split| split.shadow_batches.len())
            .sum();

        engine_debug!(LOG_SOURCE,
            "Frame {}: {} base, {} light, {} shadow batches ({} dropped)",
            self.frame_number, stats.num_base_batches, stats.num_light_batches,
            stats.num_shadow_batches, stats.num_dropped_batches);

        self.stage = FrameStage::BatchesCollected;
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn config(&self) -> &BatchCollectorConfig {
        &self.config
    }

    pub fn work_queue(&self) -> &Arc<WorkQueue> {
        &self.work_queue
    }

    pub fn default_material(&self) -> &Arc<Material> {
        &self.default_material
    }

    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Material quality in effect for the current frame.
    pub fn material_quality(&self) -> MaterialQuality {
        self.material_quality
    }

    pub fn scene_passes(&self) -> &[ScenePass] {
        &self.passes
    }

    pub fn scene_pass(&self, index: usize) -> Option<&ScenePass> {
        self.passes.get(index)
    }

    pub fn find_scene_pass(&self, name: &str) -> Option<&ScenePass> {
        self.passes.iter().find(|pass| pass.name() == name)
    }

    pub fn shadow_pass(&self) -> Option<&ShadowScenePass> {
        self.shadow_pass.as_ref()
    }

    pub fn drawable_data(&self) -> &DrawableData {
        &self.drawable_data
    }

    /// Visible geometries of the frame, ascending dense indices.
    pub fn visible_geometries(&self) -> &[DrawableIndex] {
        &self.visible_geometries
    }

    /// Depth range of the finite visible geometries.
    pub fn scene_z_range(&self) -> ZRange {
        self.scene_z_range
    }

    /// Visible lights, largest shadow maps first.
    pub fn visible_lights(&self) -> &[SceneLight] {
        &self.visible_lights
    }

    pub fn visible_light(&self, index: u32) -> Option<&SceneLight> {
        self.visible_lights.get(index as usize)
    }

    /// Index of the main light in `visible_lights`.
    pub fn main_light_index(&self) -> Option<u32> {
        self.main_light
    }

    pub fn main_light(&self) -> Option<&SceneLight> {
        self.main_light.and_then(|index| self.visible_light(index))
    }

    /// Pixel lights of a drawable, best first, padded with `NO_LIGHT`.
    pub fn pixel_lights(&self, index: DrawableIndex) -> PixelLightIndices {
        self.light_accumulators
            .get(index as usize)
            .map_or([NO_LIGHT; MAX_PIXEL_LIGHTS], LightAccumulator::pixel_lights)
    }

    /// Vertex lights of a drawable, best first, padded with `NO_LIGHT`.
    pub fn vertex_lights(&self, index: DrawableIndex) -> VertexLightIndices {
        self.light_accumulators
            .get(index as usize)
            .map_or([NO_LIGHT; MAX_VERTEX_LIGHTS], LightAccumulator::vertex_lights)
    }

    /// Lights whose state is kept across frames, visible or not.
    pub fn num_cached_lights(&self) -> usize {
        self.light_cache.len() + self.visible_lights.len()
    }

    pub fn statistics(&self) -> &FrameStatistics {
        &self.statistics
    }
}

#[cfg(test)]
#[path = "scene_batch_collector_tests.rs"]
mod tests;
