/// Camera: low-level passive data container.
///
/// The caller (game engine) is responsible for computing and setting the
/// view matrix, projection matrix, frustum and clip distances.
///
/// The engine does NOT store or manage cameras. They are tools provided
/// by the engine, owned and driven by the caller.

use glam::{Mat4, Vec3};
use super::frustum::Frustum;

/// Low-level camera. A passive data container.
///
/// Typically, the game engine computes view/projection/frustum from
/// high-level parameters (position, rotation, FOV, etc.) and passes
/// the results here. The derived getters (`position`, `view_depth`,
/// `slice_corners`) only read the stored matrices.
#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection_matrix: Mat4,
    frustum: Frustum,
    near_clip: f32,
    far_clip: f32,
    view_mask: u32,
    low_material_quality: bool,
}

impl Camera {
    /// Create a new camera with the given parameters.
    ///
    /// The view mask defaults to all bits set and the material quality
    /// override is disabled.
    pub fn new(view: Mat4, projection: Mat4, frustum: Frustum, near_clip: f32, far_clip: f32) -> Self {
        Self {
            view_matrix: view,
            projection_matrix: projection,
            frustum,
            near_clip,
            far_clip,
            view_mask: u32::MAX,
            low_material_quality: false,
        }
    }

    /// Create a perspective camera looking from `eye` to `target`.
    ///
    /// Convenience for tools and tests: the frustum is extracted from the
    /// resulting view-projection matrix.
    pub fn perspective_look_at(
        eye: Vec3,
        target: Vec3,
        fov_y: f32,
        aspect: f32,
        near_clip: f32,
        far_clip: f32,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh(fov_y, aspect, near_clip, far_clip);
        let frustum = Frustum::from_view_projection(&(projection * view));
        Self::new(view, projection, frustum, near_clip, far_clip)
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Projection matrix (perspective or orthographic).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Frustum planes for culling.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Near clip distance.
    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    /// Far clip distance.
    pub fn far_clip(&self) -> f32 {
        self.far_clip
    }

    /// View mask matched against drawable view masks.
    pub fn view_mask(&self) -> u32 {
        self.view_mask
    }

    /// Whether materials are forced to their low quality techniques.
    pub fn low_material_quality(&self) -> bool {
        self.low_material_quality
    }

    /// World-space camera position.
    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }

    /// View-space depth of a world-space point (positive in front of the camera).
    pub fn view_depth(&self, point: Vec3) -> f32 {
        -self.view_matrix.transform_point3(point).z
    }

    /// World-space corners of the camera frustum between two view depths.
    ///
    /// Returns the 4 corners at `near_depth` followed by the 4 corners at
    /// `far_depth`. Used to fit directional shadow cascades.
    pub fn slice_corners(&self, near_depth: f32, far_depth: f32) -> [Vec3; 8] {
        let inverse = self.view_projection_matrix().inverse();
        let ndc = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut corners = [Vec3::ZERO; 8];
        for (i, &(x, y)) in ndc.iter().enumerate() {
            let start = inverse.project_point3(Vec3::new(x, y, 0.0));
            let end = inverse.project_point3(Vec3::new(x, y, 1.0));
            let start_depth = self.view_depth(start);
            let end_depth = self.view_depth(end);
            let span = end_depth - start_depth;

            let at = |depth: f32| {
                if span.abs() <= f32::EPSILON {
                    start
                } else {
                    start + (end - start) * ((depth - start_depth) / span)
                }
            };
            corners[i] = at(near_depth);
            corners[i + 4] = at(far_depth);
        }
        corners
    }

    // ===== SETTERS (store, compute nothing) =====

    /// Set the view matrix.
    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
    }

    /// Set the projection matrix.
    pub fn set_projection(&mut self, matrix: Mat4) {
        self.projection_matrix = matrix;
    }

    /// Set the frustum.
    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    /// Set the near and far clip distances.
    pub fn set_clip_range(&mut self, near_clip: f32, far_clip: f32) {
        self.near_clip = near_clip;
        self.far_clip = far_clip;
    }

    /// Set the view mask.
    pub fn set_view_mask(&mut self, view_mask: u32) {
        self.view_mask = view_mask;
    }

    /// Force low quality material techniques for this camera.
    pub fn set_low_material_quality(&mut self, enabled: bool) {
        self.low_material_quality = enabled;
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
