//! Scene module
//!
//! Provides the drawable registry, light and material descriptions,
//! bounding volumes and the spatial index used for visibility queries.

mod bounds;
mod drawable;
mod light;
mod material;
mod scene;
mod scene_index;
mod octree_scene_index;

pub use bounds::{AABB, LARGE_VALUE};
pub use drawable::{
    Drawable, DrawableFlags, DrawableIndex, DrawableKey,
    GeometryId, GeometryLod, GeometryType, SourceBatch, ViewDistance,
};
pub use light::{
    CascadeParameters, Light, LightImportance, LightType,
    LARGE_EPSILON, LIGHT_NEAR_CLIP, MAX_CASCADE_SPLITS,
};
pub use material::{
    BlendMode, Material, MaterialPass, MaterialQuality, Technique, TechniqueEntry,
    DEFAULT_RENDER_ORDER,
};
pub use scene::Scene;
pub use scene_index::SceneIndex;
pub use octree_scene_index::OctreeSceneIndex;
