/// Spatial acceleration structures for scene queries.
///
/// A SceneIndex indexes Drawables by their world-space AABB
/// for efficient frustum culling and light volume queries.
///
/// Ownership: the caller creates and owns the SceneIndex.
/// It is borrowed by SceneView for the duration of a frame.

use crate::camera::Frustum;
use super::bounds::AABB;
use super::drawable::{DrawableFlags, DrawableKey};

/// Trait for spatial indexing of scene drawables.
///
/// Queries are synchronous and read-only; results are appended to `results`.
/// A drawable matches a query when `view_mask & mask != 0` and its flags
/// intersect `kinds`.
pub trait SceneIndex: Send + Sync {
    /// Insert a drawable with its world-space AABB, view mask and flags.
    fn insert(&mut self, key: DrawableKey, world_aabb: &AABB, view_mask: u32, flags: DrawableFlags);

    /// Remove a drawable from the index.
    fn remove(&mut self, key: DrawableKey);

    /// Update a drawable's world-space AABB (e.g. after it moved).
    fn update(&mut self, key: DrawableKey, world_aabb: &AABB);

    /// Query all drawables whose world AABB intersects the frustum.
    fn query_frustum(
        &self,
        frustum: &Frustum,
        mask: u32,
        kinds: DrawableFlags,
        results: &mut Vec<DrawableKey>,
    );

    /// Query all drawables whose world AABB intersects a box.
    fn query_aabb(
        &self,
        aabb: &AABB,
        mask: u32,
        kinds: DrawableFlags,
        results: &mut Vec<DrawableKey>,
    );

    /// Remove all drawables from the index.
    fn clear(&mut self);
}
