/// Scene: the registry of Drawables rendered by the batch collector.
///
/// Uses a SlotMap for O(1) insert/remove with stable keys.
/// Every drawable also receives a dense index so per-frame tables can be
/// addressed without key lookups.

use slotmap::SlotMap;
use crate::utils::IndexAllocator;
use super::drawable::{Drawable, DrawableIndex, DrawableKey};
use super::scene_index::SceneIndex;

/// A collection of drawables (geometries and lights).
///
/// Drawables are managed via stable keys (DrawableKey).
/// Keys remain valid even after other drawables are removed.
pub struct Scene {
    /// Drawables stored in a slot map for O(1) insert/remove
    drawables: SlotMap<DrawableKey, Drawable>,
    /// Allocator for dense drawable indices
    index_allocator: IndexAllocator,
    /// Reverse lookup: dense index → key
    keys_by_index: Vec<Option<DrawableKey>>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            drawables: SlotMap::with_key(),
            index_allocator: IndexAllocator::new(),
            keys_by_index: Vec::new(),
        }
    }

    /// Add a drawable and assign its dense index.
    ///
    /// Returns a stable key that remains valid until the drawable is removed.
    pub fn add_drawable(&mut self, mut drawable: Drawable) -> DrawableKey {
        let index = self.index_allocator.alloc();
        drawable.index = index;
        let key = self.drawables.insert(drawable);

        let slot = index as usize;
        if slot >= self.keys_by_index.len() {
            self.keys_by_index.resize(slot + 1, None);
        }
        self.keys_by_index[slot] = Some(key);
        key
    }

    /// Remove a drawable and recycle its index. Returns None if the key is invalid.
    pub fn remove_drawable(&mut self, key: DrawableKey) -> Option<Drawable> {
        let drawable = self.drawables.remove(key)?;
        self.index_allocator.free(drawable.index);
        if let Some(slot) = self.keys_by_index.get_mut(drawable.index as usize) {
            *slot = None;
        }
        Some(drawable)
    }

    /// Get a drawable by key
    pub fn drawable(&self, key: DrawableKey) -> Option<&Drawable> {
        self.drawables.get(key)
    }

    /// Get a mutable drawable by key.
    ///
    /// Callers that move the drawable must update the SceneIndex as well.
    pub fn drawable_mut(&mut self, key: DrawableKey) -> Option<&mut Drawable> {
        self.drawables.get_mut(key)
    }

    /// Key of the drawable currently holding a dense index.
    pub fn key_by_index(&self, index: DrawableIndex) -> Option<DrawableKey> {
        self.keys_by_index.get(index as usize).copied().flatten()
    }

    /// Get a drawable by dense index
    pub fn drawable_by_index(&self, index: DrawableIndex) -> Option<&Drawable> {
        self.key_by_index(index).and_then(|key| self.drawables.get(key))
    }

    /// Highest dense index ever assigned + 1.
    ///
    /// Per-drawable tables must be at least this long.
    pub fn index_bound(&self) -> u32 {
        self.index_allocator.high_water_mark()
    }

    /// Iterate over all drawables (key, drawable)
    pub fn drawables(&self) -> impl Iterator<Item = (DrawableKey, &Drawable)> {
        self.drawables.iter()
    }

    /// Iterate over all drawable keys.
    pub fn keys(&self) -> impl Iterator<Item = DrawableKey> + '_ {
        self.drawables.keys()
    }

    /// Get the number of drawables
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawables.is_empty()
    }

    /// Refill a spatial index with every drawable of the scene.
    pub fn build_index(&self, index: &mut dyn SceneIndex) {
        index.clear();
        for (key, drawable) in &self.drawables {
            index.insert(key, &drawable.world_aabb, drawable.view_mask, drawable.flags);
        }
    }

    /// Remove all drawables and reset the index allocator
    pub fn clear(&mut self) {
        self.drawables.clear();
        self.index_allocator = IndexAllocator::new();
        self.keys_by_index.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
