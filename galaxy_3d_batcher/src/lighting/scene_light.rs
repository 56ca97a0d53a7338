/// Per-frame state of a visible light: lit geometries and shadow splits.
///
/// A SceneLight is created the first time its light becomes visible and
/// is reused across frames from the collector's light cache. Every frame
/// it goes through:
///
/// ```text
/// begin_frame ──▶ update_lit_geometries_and_shadow_casters ──▶ allocate_shadow_maps
///  NoShadow /           (splits + casters, worker thread)        SplitsReady
///  PendingSplits
/// ```
///
/// A split whose shadow map cannot be allocated is rendered unshadowed and
/// dropped from the shadow pass; it is not retried within the frame.

use std::f32::consts::FRAC_PI_2;
use glam::{Mat4, UVec2, Vec3};
use crate::camera::{Camera, Frustum};
use crate::engine_warn;
use crate::batch::{SceneBatch, StateSortKey};
use crate::scene::{
    AABB, Drawable, DrawableFlags, DrawableIndex, DrawableKey, Light, LightImportance,
    LightType, Scene, SceneIndex, LIGHT_NEAR_CLIP,
};
use crate::utils::hash64;
use super::shadow_map::ShadowMap;
use super::z_range::ZRange;

/// Directions of the point light cube faces.
const CUBE_FACES: [Vec3; 6] = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];

/// Default shadow eligibility of a light at `distance` from the camera.
///
/// The light must cast shadows, must not be `NotImportant`, must have a
/// visible shadow (intensity below 1) and be within its shadow distance.
pub fn default_has_shadow(light: &Light, distance: f32) -> bool {
    light.cast_shadows
        && light.importance != LightImportance::NotImportant
        && light.shadow_intensity < 1.0
        && (light.shadow_distance <= 0.0 || distance <= light.shadow_distance)
}

// ===== SHADOW SPLIT =====

/// Shadow state of a light within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowState {
    /// Not shadowed this frame
    NoShadow,
    /// Shadowed, splits and casters not yet backed by shadow maps
    PendingSplits,
    /// Shadow maps requested; see `ShadowSplit::is_shadowed` per split
    SplitsReady,
}

/// One cascade, cube face or spot cone of a shadowed light.
#[derive(Debug, Clone)]
pub struct ShadowSplit {
    pub view_projection: Mat4,
    pub frustum: Frustum,
    /// Camera depth range covered by a cascade (empty for point/spot)
    pub z_range: ZRange,
    /// Requested shadow map size in texels
    pub map_size: UVec2,
    pub shadow_map: Option<ShadowMap>,
    /// Geometries rendered into this split, in index query order
    pub casters: Vec<DrawableKey>,
    pub shadow_batches: Vec<SceneBatch>,
    pub sorted_shadow_batches: Vec<StateSortKey>,
}

impl ShadowSplit {
    fn new(view_projection: Mat4, z_range: ZRange, map_size: UVec2) -> Self {
        Self {
            view_projection,
            frustum: Frustum::from_view_projection(&view_projection),
            z_range,
            map_size,
            shadow_map: None,
            casters: Vec::new(),
            shadow_batches: Vec::new(),
            sorted_shadow_batches: Vec::new(),
        }
    }

    /// Whether a shadow map backs this split.
    pub fn is_shadowed(&self) -> bool {
        self.shadow_map.is_some()
    }
}

// ===== CONTEXT =====

/// Frame data shared by every light update.
#[derive(Clone, Copy)]
pub struct SceneLightContext<'a> {
    pub scene: &'a Scene,
    pub scene_index: &'a dyn SceneIndex,
    pub camera: &'a Camera,
    /// Visible geometries of the frame, ascending
    pub visible_geometries: &'a [DrawableIndex],
    /// Depth range of all visible finite geometries
    pub scene_z_range: ZRange,
    /// World units added toward the light in directional cascades
    pub shadow_caster_extrusion: f32,
}

// ===== SCENE LIGHT =====

/// Derived per-frame state of one visible light.
#[derive(Debug, Clone)]
pub struct SceneLight {
    key: DrawableKey,
    drawable_index: DrawableIndex,
    light: Light,
    light_mask: u32,
    /// Camera distance, used by the shadow policy
    distance: f32,
    state: ShadowState,
    splits: Vec<ShadowSplit>,
    lit_geometries: Vec<DrawableIndex>,
    pipeline_state_hash: u64,
    last_seen_frame: u64,
}

impl SceneLight {
    pub fn new(key: DrawableKey, light: Light) -> Self {
        Self {
            key,
            drawable_index: 0,
            light,
            light_mask: u32::MAX,
            distance: 0.0,
            state: ShadowState::NoShadow,
            splits: Vec::new(),
            lit_geometries: Vec::new(),
            pipeline_state_hash: 0,
            last_seen_frame: 0,
        }
    }

    /// Take a snapshot of the light drawable for this frame and reset
    /// the derived state.
    pub fn begin_frame(&mut self, drawable: &Drawable, light: &Light, has_shadow: bool, frame_number: u64) {
        self.drawable_index = drawable.index();
        self.light = light.clone();
        self.light_mask = drawable.light_mask;
        self.state = if has_shadow { ShadowState::PendingSplits } else { ShadowState::NoShadow };
        self.splits.clear();
        self.lit_geometries.clear();
        self.last_seen_frame = frame_number;
        self.update_pipeline_state_hash();
    }

    /// Record the camera distance used for the shadow decision.
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance;
    }

    /// Find the visible geometries this light affects and, when shadowed,
    /// compute the splits and their casters.
    ///
    /// Only reads shared frame data, so lights can be updated in parallel.
    pub fn update_lit_geometries_and_shadow_casters(&mut self, ctx: &SceneLightContext) {
        let mut query = Vec::new();
        self.collect_lit_geometries(ctx, &mut query);

        if self.state != ShadowState::PendingSplits {
            return;
        }

        self.splits = match self.light.light_type {
            LightType::Directional => self.cascade_splits(ctx),
            LightType::Spot => vec![ShadowSplit::new(
                self.light.spot_view_projection(),
                ZRange::EMPTY,
                self.split_map_size(),
            )],
            LightType::Point => self.cube_face_splits(ctx),
        };

        let camera_position = ctx.camera.position();
        let light_mask = self.light_mask;
        for split in &mut self.splits {
            query.clear();
            ctx.scene_index.query_frustum(
                &split.frustum,
                ctx.camera.view_mask(),
                DrawableFlags::GEOMETRY,
                &mut query,
            );
            split.casters = query
                .iter()
                .copied()
                .filter(|&key| {
                    ctx.scene
                        .drawable(key)
                        .is_some_and(|drawable| Self::is_shadow_caster(light_mask, drawable, camera_position))
                })
                .collect();
        }
    }

    /// Request a shadow map for every split, largest first as ordered by
    /// the caller. Returns the number of splits left unshadowed.
    pub fn allocate_shadow_maps<F>(&mut self, mut allocate: F) -> usize
    where
        F: FnMut(UVec2) -> Option<ShadowMap>,
    {
        if self.state != ShadowState::PendingSplits {
            return 0;
        }

        let mut failed = 0;
        for (index, split) in self.splits.iter_mut().enumerate() {
            split.shadow_map = allocate(split.map_size);
            if split.shadow_map.is_none() {
                engine_warn!("galaxy3d::SceneLight",
                    "No shadow map available for split {} of light {:?} ({}x{}), split rendered unshadowed",
                    index, self.key, split.map_size.x, split.map_size.y);
                split.casters.clear();
                failed += 1;
            }
        }

        self.state = ShadowState::SplitsReady;
        self.update_pipeline_state_hash();
        failed
    }

    // ===== ACCESSORS =====

    pub fn key(&self) -> DrawableKey {
        self.key
    }

    pub fn drawable_index(&self) -> DrawableIndex {
        self.drawable_index
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mask(&self) -> u32 {
        self.light_mask
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn state(&self) -> ShadowState {
        self.state
    }

    /// Whether at least one split is backed by a shadow map.
    pub fn has_shadow(&self) -> bool {
        self.state == ShadowState::SplitsReady && self.splits.iter().any(ShadowSplit::is_shadowed)
    }

    /// Size of the largest requested split, 0 when not shadowed.
    pub fn shadow_map_size(&self) -> u32 {
        self.splits.iter().map(|split| split.map_size.max_element()).max().unwrap_or(0)
    }

    pub fn splits(&self) -> &[ShadowSplit] {
        &self.splits
    }

    pub fn splits_mut(&mut self) -> &mut [ShadowSplit] {
        &mut self.splits
    }

    /// Splits backed by a shadow map.
    pub fn shadowed_splits(&self) -> impl Iterator<Item = (usize, &ShadowSplit)> {
        self.splits.iter().enumerate().filter(|(_, split)| split.is_shadowed())
    }

    /// Visible geometries lit by this light, ascending.
    pub fn lit_geometries(&self) -> &[DrawableIndex] {
        &self.lit_geometries
    }

    /// Light variation folded into lit pipeline state keys (never 0).
    pub fn pipeline_state_hash(&self) -> u64 {
        self.pipeline_state_hash
    }

    pub fn last_seen_frame(&self) -> u64 {
        self.last_seen_frame
    }

    // ===== INTERNALS =====

    fn update_pipeline_state_hash(&mut self) {
        self.pipeline_state_hash = hash64(&(self.light.light_type, self.has_shadow())).max(1);
    }

    fn split_map_size(&self) -> UVec2 {
        UVec2::splat(self.light.shadow_map_size.max(1))
    }

    fn illuminates(&self, drawable: &Drawable) -> bool {
        drawable.light_mask & self.light_mask != 0 && self.light.illuminates(&drawable.world_aabb)
    }

    fn is_shadow_caster(light_mask: u32, drawable: &Drawable, camera_position: Vec3) -> bool {
        if !drawable.casts_shadows() || drawable.shadow_mask & light_mask == 0 {
            return false;
        }
        let max_distance = drawable.max_shadow_distance();
        max_distance <= 0.0 || drawable.world_aabb.distance_to_point(camera_position) <= max_distance
    }

    fn collect_lit_geometries(&mut self, ctx: &SceneLightContext, query: &mut Vec<DrawableKey>) {
        self.lit_geometries.clear();

        if self.light.light_type == LightType::Directional {
            for &index in ctx.visible_geometries {
                if let Some(drawable) = ctx.scene.drawable_by_index(index) {
                    if self.illuminates(drawable) {
                        self.lit_geometries.push(index);
                    }
                }
            }
            return;
        }

        query.clear();
        ctx.scene_index.query_aabb(
            &self.light.bounding_box(),
            ctx.camera.view_mask(),
            DrawableFlags::GEOMETRY,
            query,
        );
        for &key in query.iter() {
            let Some(drawable) = ctx.scene.drawable(key) else { continue };
            if ctx.visible_geometries.binary_search(&drawable.index()).is_ok() && self.illuminates(drawable) {
                self.lit_geometries.push(drawable.index());
            }
        }
        self.lit_geometries.sort_unstable();
        self.lit_geometries.dedup();
    }

    /// Cascades clipped to the camera range, the light shadow distance and
    /// the visible scene depth. Empty cascades are skipped.
    fn cascade_splits(&self, ctx: &SceneLightContext) -> Vec<ShadowSplit> {
        let scene_z = ctx.scene_z_range;
        if !scene_z.is_valid() {
            return Vec::new();
        }

        let mut far_limit = ctx.camera.far_clip();
        if self.light.shadow_distance > 0.0 {
            far_limit = far_limit.min(self.light.shadow_distance);
        }

        let mut splits = Vec::new();
        let mut split_start = ctx.camera.near_clip();
        for &split_end in &self.light.cascade.splits[..self.light.cascade.num_splits()] {
            let split_end = split_end.min(far_limit);
            let near = split_start.max(scene_z.min);
            let far = split_end.min(scene_z.max);
            if near < far {
                splits.push(self.cascade_split(ctx, near, far));
            }
            if split_end >= far_limit {
                break;
            }
            split_start = split_end;
        }
        splits
    }

    fn cascade_split(&self, ctx: &SceneLightContext, near: f32, far: f32) -> ShadowSplit {
        let corners = ctx.camera.slice_corners(near, far);
        let center = corners.iter().copied().sum::<Vec3>() / corners.len() as f32;
        let view = Light::look_to(center, self.light.direction);

        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for corner in corners {
            let point = view.transform_point3(corner);
            min = min.min(point);
            max = max.max(point);
        }

        // View space looks down -Z: depth is -z, and casters between the
        // light and the slice sit at larger z.
        let projection = Mat4::orthographic_rh(
            min.x, max.x, min.y, max.y,
            -max.z - ctx.shadow_caster_extrusion,
            -min.z,
        );
        ShadowSplit::new(projection * view, ZRange::new(near, far), self.split_map_size())
    }

    fn cube_face_splits(&self, ctx: &SceneLightContext) -> Vec<ShadowSplit> {
        let projection = Mat4::perspective_rh(
            FRAC_PI_2,
            1.0,
            LIGHT_NEAR_CLIP,
            self.light.range.max(LIGHT_NEAR_CLIP * 2.0),
        );

        CUBE_FACES
            .iter()
            .map(|&direction| projection * Light::look_to(self.light.position, direction))
            .filter(|view_projection| ctx.camera.frustum().intersects_aabb(&projection_bounds(view_projection)))
            .map(|view_projection| ShadowSplit::new(view_projection, ZRange::EMPTY, self.split_map_size()))
            .collect()
    }
}

/// World-space bounds of a projection volume.
fn projection_bounds(view_projection: &Mat4) -> AABB {
    let inverse = view_projection.inverse();
    let mut points = [Vec3::ZERO; 8];
    for (i, point) in points.iter_mut().enumerate() {
        let ndc = Vec3::new(
            if i & 1 == 0 { -1.0 } else { 1.0 },
            if i & 2 == 0 { -1.0 } else { 1.0 },
            if i & 4 == 0 { 0.0 } else { 1.0 },
        );
        *point = inverse.project_point3(ndc);
    }
    AABB::from_points(&points)
}

#[cfg(test)]
#[path = "scene_light_tests.rs"]
mod tests;
