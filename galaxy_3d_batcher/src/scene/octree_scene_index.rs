/// OctreeSceneIndex: static octree spatial index for visibility and light queries.
///
/// Each drawable is stored in exactly one node: the deepest node whose AABB
/// fully contains it. If the drawable straddles a child boundary, it stays
/// in the parent. Drawables outside the octree bounds (including infinite
/// ones such as directional lights) are stored at the root.
///
/// Queries never return duplicates and filter by view mask and drawable kind.
///
/// The tree structure is pre-allocated at construction time (static octree)
/// with a fixed `max_depth`. All 8^d nodes exist regardless of occupancy.

use rustc_hash::FxHashMap;
use glam::Vec3;
use crate::camera::{Frustum, FrustumTest};
use super::bounds::AABB;
use super::drawable::{DrawableFlags, DrawableKey};
use super::scene_index::SceneIndex;

/// Index of the root node in the flat node array.
const ROOT: usize = 0;

/// A single node in the octree.
struct OctreeNode {
    /// World-space AABB of this node
    aabb: AABB,
    /// Index of the first child in the flat array (0 = no children / leaf)
    first_child: usize,
    /// Drawables stored in this node (those that don't fit in any child)
    objects: Vec<DrawableKey>,
}

/// Per-drawable data kept for filtering and O(1) removal.
#[derive(Clone, Copy)]
struct Placement {
    node: usize,
    aabb: AABB,
    view_mask: u32,
    flags: DrawableFlags,
}

impl Placement {
    fn matches(&self, mask: u32, kinds: DrawableFlags) -> bool {
        self.view_mask & mask != 0 && self.flags.intersects(kinds)
    }
}

/// Query volume: node classification and per-object test.
enum QueryVolume<'a> {
    Frustum(&'a Frustum),
    Box(&'a AABB),
}

impl QueryVolume<'_> {
    fn classify(&self, aabb: &AABB) -> FrustumTest {
        match self {
            QueryVolume::Frustum(frustum) => frustum.classify_aabb(aabb),
            QueryVolume::Box(volume) => {
                if volume.contains(aabb) {
                    FrustumTest::Inside
                } else if volume.intersects(aabb) {
                    FrustumTest::Partial
                } else {
                    FrustumTest::Outside
                }
            }
        }
    }

    fn intersects(&self, aabb: &AABB) -> bool {
        match self {
            QueryVolume::Frustum(frustum) => frustum.intersects_aabb(aabb),
            QueryVolume::Box(volume) => volume.intersects(aabb),
        }
    }
}

/// Query filter shared by the recursive traversal.
struct QueryFilter {
    mask: u32,
    kinds: DrawableFlags,
}

/// Static octree spatial index.
///
/// Constructed with a world-space AABB and a maximum depth.
/// All nodes are pre-allocated.
pub struct OctreeSceneIndex {
    /// Flat array of all octree nodes (pre-allocated)
    nodes: Vec<OctreeNode>,
    /// Maximum depth of the tree (root = depth 0)
    max_depth: u32,
    /// Reverse lookup: drawable key → placement
    placements: FxHashMap<DrawableKey, Placement>,
    /// subtree_sizes[d] = total node count for a subtree of depth d.
    subtree_sizes: Vec<usize>,
}

impl OctreeSceneIndex {
    /// Create a new static octree with the given world bounds and depth.
    ///
    /// # Arguments
    ///
    /// * `world_aabb` - The world-space AABB encompassing the scene
    /// * `max_depth` - Maximum tree depth (root = 0). Total nodes = (8^(d+1) - 1) / 7.
    pub fn new(world_aabb: AABB, max_depth: u32) -> Self {
        let total_nodes = Self::total_node_count(max_depth);
        let mut nodes = Vec::with_capacity(total_nodes);

        Self::build_recursive(&mut nodes, &world_aabb, 0, max_depth);
        debug_assert_eq!(nodes.len(), total_nodes);

        let subtree_sizes: Vec<usize> = (0..=max_depth).map(Self::total_node_count).collect();

        Self {
            nodes,
            max_depth,
            placements: FxHashMap::default(),
            subtree_sizes,
        }
    }

    /// Number of indexed drawables.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Total number of nodes for a given depth: (8^(d+1) - 1) / 7
    fn total_node_count(max_depth: u32) -> usize {
        let mut count = 0usize;
        let mut level_count = 1usize;
        for _ in 0..=max_depth {
            count += level_count;
            level_count *= 8;
        }
        count
    }

    /// Recursively build the static octree node array (depth-first).
    fn build_recursive(
        nodes: &mut Vec<OctreeNode>,
        aabb: &AABB,
        depth: u32,
        max_depth: u32,
    ) {
        let node_index = nodes.len();
        nodes.push(OctreeNode {
            aabb: *aabb,
            first_child: 0,
            objects: Vec::new(),
        });

        if depth >= max_depth {
            return;
        }

        let center = aabb.center();
        nodes[node_index].first_child = nodes.len();

        for octant in 0..8u8 {
            let child_aabb = Self::octant_aabb(aabb, &center, octant);
            Self::build_recursive(nodes, &child_aabb, depth + 1, max_depth);
        }
    }

    /// Compute the AABB of a specific octant (0–7).
    ///
    /// Octant bit layout: bit0 = X, bit1 = Y, bit2 = Z (0 = low, 1 = high).
    fn octant_aabb(parent: &AABB, center: &Vec3, octant: u8) -> AABB {
        AABB::new(
            Vec3::new(
                if octant & 1 == 0 { parent.min.x } else { center.x },
                if octant & 2 == 0 { parent.min.y } else { center.y },
                if octant & 4 == 0 { parent.min.z } else { center.z },
            ),
            Vec3::new(
                if octant & 1 == 0 { center.x } else { parent.max.x },
                if octant & 2 == 0 { center.y } else { parent.max.y },
                if octant & 4 == 0 { center.z } else { parent.max.z },
            ),
        )
    }

    /// Determine which octant a point falls into relative to a center.
    fn point_octant(center: &Vec3, point: &Vec3) -> u8 {
        ((point.x >= center.x) as u8)
            | (((point.y >= center.y) as u8) << 1)
            | (((point.z >= center.z) as u8) << 2)
    }

    /// Find the deepest node that fully contains an AABB.
    ///
    /// If both AABB corners fall into the same octant the drawable fits
    /// entirely in that child; otherwise it stays in the current node.
    fn find_target_node(&self, world_aabb: &AABB) -> usize {
        if !self.nodes[ROOT].aabb.contains(world_aabb) {
            return ROOT;
        }

        let mut node_idx = ROOT;
        let mut depth = 0;

        loop {
            let first_child = self.nodes[node_idx].first_child;
            if depth >= self.max_depth || first_child == 0 {
                return node_idx;
            }

            let center = self.nodes[node_idx].aabb.center();
            let min_oct = Self::point_octant(&center, &world_aabb.min);
            let max_oct = Self::point_octant(&center, &world_aabb.max);

            if min_oct != max_oct {
                return node_idx;
            }

            node_idx = first_child + self.subtree_offset(min_oct, self.max_depth - depth - 1);
            depth += 1;
        }
    }

    /// Offset of octant `i` in the depth-first node layout.
    fn subtree_offset(&self, octant: u8, remaining_depth: u32) -> usize {
        octant as usize * self.subtree_sizes[remaining_depth as usize]
    }

    /// Child node indices of a node, empty for leaves.
    fn children(&self, node_idx: usize, depth: u32) -> impl Iterator<Item = usize> + '_ {
        let first_child = self.nodes[node_idx].first_child;
        let has_children = depth < self.max_depth && first_child != 0;
        let remaining = if has_children { self.max_depth - depth - 1 } else { 0 };
        (0..8u8)
            .filter(move |_| has_children)
            .map(move |octant| first_child + self.subtree_offset(octant, remaining))
    }

    /// Recursively query the octree.
    ///
    /// 3-way classification at each node:
    /// - `Outside` → skip entire subtree
    /// - `Inside` → collect all matching drawables from the subtree without further testing
    /// - `Partial` → test drawables individually, recurse into children
    fn query_recursive(
        &self,
        node_idx: usize,
        volume: &QueryVolume<'_>,
        filter: &QueryFilter,
        classification: FrustumTest,
        results: &mut Vec<DrawableKey>,
        depth: u32,
    ) {
        match classification {
            FrustumTest::Outside => {}

            FrustumTest::Inside => self.collect_all(node_idx, filter, results, depth),

            FrustumTest::Partial => {
                for key in &self.nodes[node_idx].objects {
                    if let Some(placement) = self.placements.get(key) {
                        if placement.matches(filter.mask, filter.kinds) && volume.intersects(&placement.aabb) {
                            results.push(*key);
                        }
                    }
                }

                for child_idx in self.children(node_idx, depth) {
                    let child_class = volume.classify(&self.nodes[child_idx].aabb);
                    self.query_recursive(child_idx, volume, filter, child_class, results, depth + 1);
                }
            }
        }
    }

    /// Collect all matching drawables from a node and its entire subtree.
    fn collect_all(
        &self,
        node_idx: usize,
        filter: &QueryFilter,
        results: &mut Vec<DrawableKey>,
        depth: u32,
    ) {
        for key in &self.nodes[node_idx].objects {
            if let Some(placement) = self.placements.get(key) {
                if placement.matches(filter.mask, filter.kinds) {
                    results.push(*key);
                }
            }
        }

        for child_idx in self.children(node_idx, depth) {
            self.collect_all(child_idx, filter, results, depth + 1);
        }
    }

    fn query(&self, volume: QueryVolume<'_>, filter: QueryFilter, results: &mut Vec<DrawableKey>) {
        if self.nodes.is_empty() || self.placements.is_empty() {
            return;
        }

        // Out-of-bounds drawables live at the root, so it is never skipped.
        match volume.classify(&self.nodes[ROOT].aabb) {
            FrustumTest::Inside => self.query_root_inside(&volume, &filter, results),
            FrustumTest::Partial | FrustumTest::Outside => {
                self.query_recursive(ROOT, &volume, &filter, FrustumTest::Partial, results, 0)
            }
        }
    }

    /// Root fully inside the volume: only the out-of-bounds drawables at the root need testing.
    fn query_root_inside(&self, volume: &QueryVolume<'_>, filter: &QueryFilter, results: &mut Vec<DrawableKey>) {
        let root_aabb = &self.nodes[ROOT].aabb;
        for key in &self.nodes[ROOT].objects {
            if let Some(placement) = self.placements.get(key) {
                let inside = root_aabb.contains(&placement.aabb) || volume.intersects(&placement.aabb);
                if placement.matches(filter.mask, filter.kinds) && inside {
                    results.push(*key);
                }
            }
        }

        for child_idx in self.children(ROOT, 0) {
            self.collect_all(child_idx, filter, results, 1);
        }
    }
}

// ===== SCENE INDEX TRAIT =====

impl SceneIndex for OctreeSceneIndex {
    fn insert(&mut self, key: DrawableKey, world_aabb: &AABB, view_mask: u32, flags: DrawableFlags) {
        self.remove(key);

        let node = self.find_target_node(world_aabb);
        self.nodes[node].objects.push(key);
        self.placements.insert(key, Placement {
            node,
            aabb: *world_aabb,
            view_mask,
            flags,
        });
    }

    fn remove(&mut self, key: DrawableKey) {
        if let Some(placement) = self.placements.remove(&key) {
            let objects = &mut self.nodes[placement.node].objects;
            if let Some(pos) = objects.iter().position(|&k| k == key) {
                objects.swap_remove(pos);
            }
        }
    }

    fn update(&mut self, key: DrawableKey, world_aabb: &AABB) {
        let target = self.find_target_node(world_aabb);

        let Some(placement) = self.placements.get_mut(&key) else {
            return;
        };

        if placement.node == target {
            placement.aabb = *world_aabb;
            return;
        }

        let Placement { view_mask, flags, .. } = *placement;
        self.insert(key, world_aabb, view_mask, flags);
    }

    fn query_frustum(
        &self,
        frustum: &Frustum,
        mask: u32,
        kinds: DrawableFlags,
        results: &mut Vec<DrawableKey>,
    ) {
        self.query(QueryVolume::Frustum(frustum), QueryFilter { mask, kinds }, results);
    }

    fn query_aabb(
        &self,
        aabb: &AABB,
        mask: u32,
        kinds: DrawableFlags,
        results: &mut Vec<DrawableKey>,
    ) {
        self.query(QueryVolume::Box(aabb), QueryFilter { mask, kinds }, results);
    }

    fn clear(&mut self) {
        for node in &mut self.nodes {
            node.objects.clear();
        }
        self.placements.clear();
    }
}
