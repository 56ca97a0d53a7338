/// Light description attached to light drawables.
///
/// Pure data, like Material. The batch collector derives per-frame state
/// (shadow splits, lit geometries) from it in `SceneLight`.

use glam::{Mat4, Vec3};
use crate::camera::Frustum;
use super::bounds::AABB;

/// Max number of directional light cascades.
pub const MAX_CASCADE_SPLITS: usize = 4;

/// Smallest distance used when ranking lights, avoids division by zero.
pub const LARGE_EPSILON: f32 = 0.00001;

/// Near clip of spot and point light shadow cameras.
pub const LIGHT_NEAR_CLIP: f32 = 0.05;

// ===== ENUMS =====

/// Light type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    Directional,
    Point,
    Spot,
}

/// Per-pixel lighting override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LightImportance {
    /// Ranked by importance score
    #[default]
    Auto,
    /// Always per-pixel
    Important,
    /// Always per-vertex, never shadowed
    NotImportant,
}

// ===== CASCADES =====

/// Directional light cascade split distances (view depth of each split end).
///
/// Splits are used in order until the first non-positive or non-increasing value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParameters {
    pub splits: [f32; MAX_CASCADE_SPLITS],
}

impl CascadeParameters {
    /// Parameters with the given split ends; unused slots are zero.
    pub fn new(splits: &[f32]) -> Self {
        let mut values = [0.0; MAX_CASCADE_SPLITS];
        for (slot, value) in values.iter_mut().zip(splits) {
            *slot = *value;
        }
        Self { splits: values }
    }

    /// Number of usable cascades.
    pub fn num_splits(&self) -> usize {
        let mut previous = 0.0;
        let mut count = 0;
        for &split in &self.splits {
            if split <= previous {
                break;
            }
            previous = split;
            count += 1;
        }
        count
    }
}

impl Default for CascadeParameters {
    fn default() -> Self {
        Self::new(&[10.0, 50.0, 200.0])
    }
}

// ===== LIGHT =====

/// Light parameters in world space.
#[derive(Debug, Clone)]
pub struct Light {
    pub light_type: LightType,
    /// Linear RGB color
    pub color: Vec3,
    pub brightness: f32,
    /// Range of point and spot lights
    pub range: f32,
    /// Full spot cone angle in degrees
    pub spot_fov: f32,
    pub position: Vec3,
    /// Normalized direction the light points to (directional and spot)
    pub direction: Vec3,
    pub importance: LightImportance,
    pub cast_shadows: bool,
    /// 0 = fully dark shadows, 1 = no shadows
    pub shadow_intensity: f32,
    /// Beyond this camera distance the light casts no shadows (0 = unlimited)
    pub shadow_distance: f32,
    /// Shadow map size of a single split, in texels
    pub shadow_map_size: u32,
    pub cascade: CascadeParameters,
}

impl Light {
    fn with_type(light_type: LightType) -> Self {
        Self {
            light_type,
            color: Vec3::ONE,
            brightness: 1.0,
            range: 10.0,
            spot_fov: 30.0,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            importance: LightImportance::Auto,
            cast_shadows: false,
            shadow_intensity: 0.0,
            shadow_distance: 0.0,
            shadow_map_size: 1024,
            cascade: CascadeParameters::default(),
        }
    }

    /// Directional light pointing along `direction`.
    pub fn directional(direction: Vec3) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            ..Self::with_type(LightType::Directional)
        }
    }

    /// Point light at `position`.
    pub fn point(position: Vec3, range: f32) -> Self {
        Self {
            position,
            range,
            ..Self::with_type(LightType::Point)
        }
    }

    /// Spot light at `position` pointing along `direction`.
    pub fn spot(position: Vec3, direction: Vec3, range: f32, fov_degrees: f32) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
            range,
            spot_fov: fov_degrees,
            ..Self::with_type(LightType::Spot)
        }
    }

    /// Color multiplied by brightness.
    pub fn effective_color(&self) -> Vec3 {
        self.color * self.brightness
    }

    /// Luminance of the effective color.
    pub fn intensity(&self) -> f32 {
        self.effective_color().dot(Vec3::new(0.2126, 0.7152, 0.0722))
    }

    /// Distance from the light to a box (0 for directional lights or when inside).
    pub fn distance_to(&self, aabb: &AABB) -> f32 {
        match self.light_type {
            LightType::Directional => 0.0,
            LightType::Point | LightType::Spot => aabb.distance_to_point(self.position),
        }
    }

    /// World-space bounds of the lit volume.
    pub fn bounding_box(&self) -> AABB {
        match self.light_type {
            LightType::Directional => AABB::infinite(),
            LightType::Point => AABB::from_center_half_size(self.position, Vec3::splat(self.range)),
            LightType::Spot => {
                let mut points = self.spot_far_corners().to_vec();
                points.push(self.position);
                AABB::from_points(&points)
            }
        }
    }

    /// View matrix looking along `direction` from `eye`.
    pub fn look_to(eye: Vec3, direction: Vec3) -> Mat4 {
        let up = if direction.normalize_or_zero().dot(Vec3::Y).abs() > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        Mat4::look_to_rh(eye, direction, up)
    }

    /// View-projection matrix of the spot cone.
    pub fn spot_view_projection(&self) -> Mat4 {
        let projection = Mat4::perspective_rh(
            self.spot_fov.clamp(1.0, 179.0).to_radians(),
            1.0,
            LIGHT_NEAR_CLIP,
            self.range.max(LIGHT_NEAR_CLIP * 2.0),
        );
        projection * Self::look_to(self.position, self.direction)
    }

    /// Frustum of the spot cone.
    pub fn spot_frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.spot_view_projection())
    }

    fn spot_far_corners(&self) -> [Vec3; 4] {
        let inverse = self.spot_view_projection().inverse();
        [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .map(|(x, y)| inverse.project_point3(Vec3::new(x, y, 1.0)))
    }

    /// Whether the lit volume overlaps a box.
    pub fn illuminates(&self, aabb: &AABB) -> bool {
        match self.light_type {
            LightType::Directional => true,
            LightType::Point => aabb.intersects_sphere(self.position, self.range),
            LightType::Spot => {
                aabb.intersects_sphere(self.position, self.range)
                    && self.spot_frustum().intersects_aabb(aabb)
            }
        }
    }
}

#[cfg(test)]
#[path = "light_tests.rs"]
mod tests;
