/// RenderView: result of the visibility query for one frame.
///
/// Created by `SceneView::update()`. Contains a snapshot of the camera
/// at query time and the keys of the visible drawables, geometries and
/// lights mixed, in the order returned by the spatial index.
///
/// Ephemeral: lives for one frame. No Arc, no Mutex.

use crate::scene::DrawableKey;
use super::camera::Camera;

/// Result of the visibility query. Ephemeral, lives for one frame.
#[derive(Debug, Clone)]
pub struct RenderView {
    camera: Camera,
    visible_drawables: Vec<DrawableKey>,
}

impl RenderView {
    /// Create a new RenderView from a camera snapshot and visible drawables.
    pub fn new(camera: Camera, visible_drawables: Vec<DrawableKey>) -> Self {
        Self {
            camera,
            visible_drawables,
        }
    }

    /// Camera snapshot at the time of the query.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Keys of the visible drawables.
    pub fn visible_drawables(&self) -> &[DrawableKey] {
        &self.visible_drawables
    }

    /// Number of visible drawables.
    pub fn visible_count(&self) -> usize {
        self.visible_drawables.len()
    }
}

#[cfg(test)]
#[path = "render_view_tests.rs"]
mod tests;
