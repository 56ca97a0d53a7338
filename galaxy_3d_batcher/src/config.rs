//! Batch collector configuration and capacity constants.

use crate::error::{Error, Result};
use crate::scene::MaterialQuality;

/// Capacity of the per-drawable vertex light tier.
pub const MAX_VERTEX_LIGHTS: usize = 4;

/// Capacity of the per-drawable pixel light tier.
pub const MAX_PIXEL_LIGHTS: usize = 4;

/// Max number of scene passes a collector accepts.
pub const MAX_SCENE_PASSES: usize = 8;

/// Sentinel padding the light index lists.
pub const NO_LIGHT: u32 = u32::MAX;

/// Tunables of the batch collector.
#[derive(Debug, Clone)]
pub struct BatchCollectorConfig {
    /// Pixel lights per drawable for non-important lights.
    /// Important lights may exceed it up to `MAX_PIXEL_LIGHTS`.
    pub max_pixel_lights: usize,
    /// Min drawables per task in `process_visible_drawables`
    pub drawable_work_threshold: usize,
    /// Min lit geometries per task during light accumulation
    pub lit_geometries_work_threshold: usize,
    /// Min batches per task during pipeline state lookup
    pub batch_work_threshold: usize,
    /// Frames a light may stay invisible before its cached state is dropped
    pub light_cache_max_idle_frames: u32,
    /// Requested material quality (the camera can force `Low`)
    pub material_quality: MaterialQuality,
    /// World units added behind directional cascades when collecting casters
    pub shadow_caster_extrusion: f32,
}

impl Default for BatchCollectorConfig {
    fn default() -> Self {
        Self {
            max_pixel_lights: 1,
            drawable_work_threshold: 1,
            lit_geometries_work_threshold: 1,
            batch_work_threshold: 10,
            light_cache_max_idle_frames: 8,
            material_quality: MaterialQuality::High,
            shadow_caster_extrusion: 100.0,
        }
    }
}

impl BatchCollectorConfig {
    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for zero work thresholds or a
    /// negative/non-finite caster extrusion.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("drawable_work_threshold", self.drawable_work_threshold),
            ("lit_geometries_work_threshold", self.lit_geometries_work_threshold),
            ("batch_work_threshold", self.batch_work_threshold),
        ];
        for (name, value) in thresholds {
            if value == 0 {
                return Err(Error::InvalidConfiguration(format!("{} must be at least 1", name)));
            }
        }

        if !self.shadow_caster_extrusion.is_finite() || self.shadow_caster_extrusion < 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "shadow_caster_extrusion must be a non-negative number, got {}",
                self.shadow_caster_extrusion
            )));
        }

        Ok(())
    }

    /// Pixel light limit clamped to the tier capacity.
    pub fn pixel_light_limit(&self) -> usize {
        self.max_pixel_lights.min(MAX_PIXEL_LIGHTS)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
