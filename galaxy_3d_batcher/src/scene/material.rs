/// Material, technique and pass descriptions.
///
/// Pure data: no GPU resources. A Material owns a list of techniques
/// ranked by LOD distance and quality level; a Technique owns named
/// passes. The batch collector matches drawables against passes by name
/// and hands the chosen pass to the pipeline-state resolver.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::utils::{hash64, name_hash};

/// Render order of materials that do not set one.
pub const DEFAULT_RENDER_ORDER: u8 = 128;

// ===== QUALITY =====

/// Material quality level. Techniques are selected for the highest level
/// that does not exceed the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MaterialQuality {
    Low,
    Medium,
    #[default]
    High,
}

// ===== PASS =====

/// Blend mode of a material pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Replace,
    Add,
    Alpha,
}

/// A single pass of a technique (e.g. "base", "litbase", "light", "shadow").
#[derive(Debug, Clone)]
pub struct MaterialPass {
    name: String,
    vertex_shader: String,
    pixel_shader: String,
    defines: String,
    blend_mode: BlendMode,
    depth_write: bool,
    state_hash: u64,
}

impl MaterialPass {
    /// Create a pass using the same shader for both stages.
    pub fn new(name: &str, shader: &str) -> Self {
        Self::with_state(name, shader, shader, "", BlendMode::Replace, true)
    }

    /// Create a pass with explicit shaders, defines and render state.
    pub fn with_state(
        name: &str,
        vertex_shader: &str,
        pixel_shader: &str,
        defines: &str,
        blend_mode: BlendMode,
        depth_write: bool,
    ) -> Self {
        let state_hash = hash64(&(name, vertex_shader, pixel_shader, defines, blend_mode, depth_write));
        Self {
            name: name.to_string(),
            vertex_shader: vertex_shader.to_string(),
            pixel_shader: pixel_shader.to_string(),
            defines: defines.to_string(),
            blend_mode,
            depth_write,
            state_hash,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertex_shader(&self) -> &str {
        &self.vertex_shader
    }

    pub fn pixel_shader(&self) -> &str {
        &self.pixel_shader
    }

    pub fn defines(&self) -> &str {
        &self.defines
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn depth_write(&self) -> bool {
        self.depth_write
    }

    /// Hash of every field that affects the pipeline state built for this pass.
    pub fn state_hash(&self) -> u64 {
        self.state_hash
    }
}

// ===== TECHNIQUE =====

/// Named collection of passes.
#[derive(Debug)]
pub struct Technique {
    name: String,
    passes: Vec<Arc<MaterialPass>>,
    pass_names: FxHashMap<String, usize>,
}

impl Technique {
    /// Create a technique. A pass name appearing twice keeps the last pass.
    pub fn new(name: &str, passes: Vec<MaterialPass>) -> Self {
        let mut pass_names = FxHashMap::default();
        let mut stored: Vec<Arc<MaterialPass>> = Vec::with_capacity(passes.len());
        for pass in passes {
            match pass_names.get(pass.name()) {
                Some(&index) => stored[index] = Arc::new(pass),
                None => {
                    pass_names.insert(pass.name().to_string(), stored.len());
                    stored.push(Arc::new(pass));
                }
            }
        }
        Self { name: name.to_string(), passes: stored, pass_names }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Find a pass by name.
    pub fn pass(&self, name: &str) -> Option<&Arc<MaterialPass>> {
        self.pass_names.get(name).map(|&index| &self.passes[index])
    }

    /// Whether the technique has a pass with this name.
    pub fn has_pass(&self, name: &str) -> bool {
        self.pass_names.contains_key(name)
    }

    /// All passes in declaration order.
    pub fn passes(&self) -> &[Arc<MaterialPass>] {
        &self.passes
    }
}

// ===== MATERIAL =====

/// Technique with its selection criteria.
#[derive(Debug, Clone)]
pub struct TechniqueEntry {
    pub technique: Arc<Technique>,
    pub quality: MaterialQuality,
    pub lod_distance: f32,
}

/// Material resource: identity, render order and techniques.
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    id: u32,
    render_order: u8,
    techniques: Vec<TechniqueEntry>,
}

impl Material {
    /// Create a material without techniques. Its identity is the hash of its name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: name_hash(name),
            render_order: DEFAULT_RENDER_ORDER,
            techniques: Vec::new(),
        }
    }

    /// Material substituted for source batches without one.
    ///
    /// Provides unlit, lit-base, light and shadow passes.
    pub fn default_material() -> Self {
        let technique = Technique::new("NoTexture", vec![
            MaterialPass::new("base", "Unlit"),
            MaterialPass::new("litbase", "LitSolid"),
            MaterialPass::with_state("light", "LitSolid", "LitSolid", "", BlendMode::Add, false),
            MaterialPass::new("shadow", "Shadow"),
        ]);
        let mut material = Self::new("DefaultMaterial");
        material.add_technique(Arc::new(technique), MaterialQuality::Low, 0.0);
        material
    }

    /// Set the render order (builder style).
    pub fn with_render_order(mut self, render_order: u8) -> Self {
        self.render_order = render_order;
        self
    }

    /// Add a technique.
    ///
    /// Entries are kept sorted by descending LOD distance, then descending
    /// quality, so that `find_technique` can return the first match.
    pub fn add_technique(&mut self, technique: Arc<Technique>, quality: MaterialQuality, lod_distance: f32) {
        self.techniques.push(TechniqueEntry { technique, quality, lod_distance });
        self.techniques.sort_by(|a, b| {
            b.lod_distance.total_cmp(&a.lod_distance)
                .then(b.quality.cmp(&a.quality))
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stable identity (hash of the name).
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn render_order(&self) -> u8 {
        self.render_order
    }

    pub fn techniques(&self) -> &[TechniqueEntry] {
        &self.techniques
    }

    /// Find the technique for a drawable at `distance` and a quality level.
    ///
    /// Returns the first entry whose quality does not exceed `quality` and
    /// whose LOD distance does not exceed `distance`, else the last entry.
    /// `None` only when the material has no techniques.
    pub fn find_technique(&self, distance: f32, quality: MaterialQuality) -> Option<&Arc<Technique>> {
        self.techniques
            .iter()
            .find(|entry| entry.quality <= quality && distance >= entry.lod_distance)
            .or(self.techniques.last())
            .map(|entry| &entry.technique)
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
