/// SceneView: per-camera driver of the batch collector.
///
/// Binds a camera to a spatial index, runs the visibility query and the
/// four collector stages for one frame.

use crate::camera::{Camera, RenderView};
use crate::engine_err;
use crate::error::{Error, Result};
use crate::scene::{DrawableFlags, DrawableKey, Scene, SceneIndex};
use super::callback::SceneBatchCollectorCallback;
use super::scene_batch_collector::{FrameContext, FrameInfo, SceneBatchCollector};

/// A camera looking into a scene through its spatial index.
#[derive(Clone, Copy)]
pub struct SceneView<'a> {
    camera: &'a Camera,
    scene_index: &'a dyn SceneIndex,
}

impl<'a> SceneView<'a> {
    /// Bind a camera and a spatial index.
    ///
    /// # Errors
    ///
    /// Returns `MissingCamera` or `MissingSceneIndex` when either is absent.
    pub fn define(camera: Option<&'a Camera>, scene_index: Option<&'a dyn SceneIndex>) -> Result<Self> {
        let camera = camera.ok_or_else(|| engine_err!("galaxy3d::SceneView", Error::MissingCamera))?;
        let scene_index = scene_index.ok_or_else(|| engine_err!("galaxy3d::SceneView", Error::MissingSceneIndex))?;
        Ok(Self { camera, scene_index })
    }

    pub fn camera(&self) -> &'a Camera {
        self.camera
    }

    pub fn scene_index(&self) -> &'a dyn SceneIndex {
        self.scene_index
    }

    /// Frame context of this view for `scene`.
    pub fn frame_context(&self, scene: &'a Scene, info: FrameInfo) -> FrameContext<'a> {
        FrameContext::new(info, self.camera, scene, self.scene_index)
    }

    /// Geometries and lights the camera sees, in spatial index order.
    pub fn query_visible(&self) -> Vec<DrawableKey> {
        let mut visible = Vec::new();
        self.scene_index.query_frustum(
            self.camera.frustum(),
            self.camera.view_mask(),
            DrawableFlags::GEOMETRY | DrawableFlags::LIGHT,
            &mut visible,
        );
        visible
    }

    /// Run a whole frame: visibility query, then every collector stage.
    ///
    /// Returns the visibility result; batches are read from the collector.
    ///
    /// # Errors
    ///
    /// Propagates the first stage error; the collector is then left in the
    /// last completed stage.
    pub fn update(
        &self,
        collector: &mut SceneBatchCollector,
        scene: &'a Scene,
        info: FrameInfo,
        callback: &mut dyn SceneBatchCollectorCallback,
    ) -> Result<RenderView> {
        let visible = self.query_visible();
        let frame = self.frame_context(scene, info);

        collector.begin_frame(&frame)?;
        collector.process_visible_drawables(&frame, &visible)?;
        collector.process_visible_lights(&frame, callback)?;
        collector.collect_scene_batches(&frame, callback)?;

        Ok(RenderView::new(self.camera.clone(), visible))
    }
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
