/// Drawable types for the scene registry.
///
/// A Drawable is a renderable geometry or a light, described by its world
/// bounds, masks and either source batches or a light description.

use std::sync::Arc;
use bitflags::bitflags;
use glam::Vec3;
use slotmap::new_key_type;
use super::bounds::AABB;
use super::light::{Light, LightType, LARGE_EPSILON};
use super::material::Material;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable, generation-tagged key of a Drawable within a Scene.
    ///
    /// Keys remain valid even after other drawables are removed.
    /// A key becomes invalid only when its own drawable is removed.
    pub struct DrawableKey;
}

/// Dense index of a drawable, used to address per-frame tables in O(1).
///
/// Assigned by the Scene on insertion and recycled on removal.
pub type DrawableIndex = u32;

// ===== FLAGS =====

bitflags! {
    /// Drawable kind and shadow behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawableFlags: u32 {
        /// Renderable geometry with source batches
        const GEOMETRY = 1 << 0;
        /// Light source
        const LIGHT = 1 << 1;
        /// Rendered into shadow maps
        const CAST_SHADOWS = 1 << 2;
        /// Samples shadow maps
        const RECEIVE_SHADOWS = 1 << 3;
    }
}

// ===== SOURCE BATCH =====

/// Opaque geometry identity, owned by the device layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

/// Geometry instancing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GeometryType {
    #[default]
    Static,
    Skinned,
    Instanced,
    Billboard,
}

/// Reduced-detail geometry drawn from `distance` on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryLod {
    /// LOD distance at which this level starts
    pub distance: f32,
    pub geometry: GeometryId,
}

/// One geometry + material unit within a drawable.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// Full-detail geometry
    pub geometry: GeometryId,
    pub geometry_type: GeometryType,
    /// Lower detail levels, ascending distance
    pub lods: Vec<GeometryLod>,
    /// `None` uses the collector's default material
    pub material: Option<Arc<Material>>,
    pub lightmap_index: u32,
}

impl SourceBatch {
    /// Static geometry with a material and no lightmap.
    pub fn new(geometry: GeometryId, material: Option<Arc<Material>>) -> Self {
        Self {
            geometry,
            geometry_type: GeometryType::Static,
            lods: Vec::new(),
            material,
            lightmap_index: 0,
        }
    }

    /// Set the detail levels (builder style). Levels are sorted by distance.
    pub fn with_lods(mut self, mut lods: Vec<GeometryLod>) -> Self {
        lods.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        self.lods = lods;
        self
    }

    /// Geometry drawn at `lod_distance`: the farthest level already
    /// reached, or the full-detail geometry.
    pub fn geometry_at(&self, lod_distance: f32) -> GeometryId {
        self.lods
            .iter()
            .take_while(|lod| lod_distance >= lod.distance)
            .last()
            .map_or(self.geometry, |lod| lod.geometry)
    }
}

/// Camera distances of a drawable for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewDistance {
    /// Distance from the camera, 0 for unbounded drawables and directional lights
    pub distance: f32,
    /// Distance scaled by the LOD bias, selects techniques and geometry levels
    pub lod_distance: f32,
}

// ===== DRAWABLE =====

/// A renderable object or a light.
#[derive(Debug, Clone)]
pub struct Drawable {
    /// Dense index, assigned by the Scene
    pub(crate) index: DrawableIndex,
    pub world_aabb: AABB,
    pub flags: DrawableFlags,
    pub view_mask: u32,
    pub light_mask: u32,
    pub shadow_mask: u32,
    /// Max camera distance at which the drawable is rendered (0 = unlimited)
    pub draw_distance: f32,
    /// Max camera distance at which the drawable casts shadows (0 = unlimited)
    pub shadow_distance: f32,
    /// Higher values keep full detail farther away
    pub lod_bias: f32,
    pub source_batches: Vec<SourceBatch>,
    pub light: Option<Light>,
}

impl Drawable {
    fn with_flags(world_aabb: AABB, flags: DrawableFlags) -> Self {
        Self {
            index: 0,
            world_aabb,
            flags,
            view_mask: u32::MAX,
            light_mask: u32::MAX,
            shadow_mask: u32::MAX,
            draw_distance: 0.0,
            shadow_distance: 0.0,
            lod_bias: 1.0,
            source_batches: Vec::new(),
            light: None,
        }
    }

    /// Geometry drawable with the given source batches.
    pub fn geometry(world_aabb: AABB, source_batches: Vec<SourceBatch>) -> Self {
        Self {
            source_batches,
            ..Self::with_flags(world_aabb, DrawableFlags::GEOMETRY)
        }
    }

    /// Light drawable. Its bounds are taken from the light volume.
    pub fn light(light: Light) -> Self {
        Self {
            light: Some(light.clone()),
            ..Self::with_flags(light.bounding_box(), DrawableFlags::LIGHT)
        }
    }

    /// Set or clear shadow casting (builder style).
    pub fn with_cast_shadows(mut self, enabled: bool) -> Self {
        self.flags.set(DrawableFlags::CAST_SHADOWS, enabled);
        self
    }

    /// Dense index assigned by the Scene.
    pub fn index(&self) -> DrawableIndex {
        self.index
    }

    pub fn is_geometry(&self) -> bool {
        self.flags.contains(DrawableFlags::GEOMETRY)
    }

    pub fn is_light(&self) -> bool {
        self.flags.contains(DrawableFlags::LIGHT)
    }

    pub fn casts_shadows(&self) -> bool {
        self.flags.contains(DrawableFlags::CAST_SHADOWS)
    }

    /// Camera distances for this frame.
    ///
    /// Point and spot lights are measured from their position, geometry
    /// from the center of its bounds.
    pub fn view_distance(&self, camera_position: Vec3) -> ViewDistance {
        let distance = match self.light.as_ref().filter(|_| self.is_light()) {
            Some(light) if light.light_type == LightType::Directional => 0.0,
            Some(light) => camera_position.distance(light.position),
            None if self.world_aabb.is_infinite() => 0.0,
            None => camera_position.distance(self.world_aabb.center()),
        };
        ViewDistance {
            distance,
            lod_distance: distance / self.lod_bias.max(LARGE_EPSILON),
        }
    }

    /// Effective max shadow distance: the smaller positive value of the
    /// shadow and draw distances (0 = unlimited).
    pub fn max_shadow_distance(&self) -> f32 {
        let mut max_distance = self.shadow_distance;
        if self.draw_distance > 0.0 && (max_distance <= 0.0 || self.draw_distance < max_distance) {
            max_distance = self.draw_distance;
        }
        max_distance
    }
}

#[cfg(test)]
#[path = "drawable_tests.rs"]
mod tests;
