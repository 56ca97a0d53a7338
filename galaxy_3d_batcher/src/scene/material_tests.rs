use std::sync::Arc;
use super::*;

fn technique(name: &str, passes: &[&str]) -> Arc<Technique> {
    Arc::new(Technique::new(
        name,
        passes.iter().map(|p| MaterialPass::new(p, name)).collect(),
    ))
}

// ============================================================================
// MaterialPass / Technique
// ============================================================================

#[test]
fn test_pass_state_hash_depends_on_state() {
    let a = MaterialPass::new("base", "Unlit");
    let b = MaterialPass::new("base", "Unlit");
    let c = MaterialPass::with_state("base", "Unlit", "Unlit", "ALPHAMASK", BlendMode::Replace, true);
    let d = MaterialPass::with_state("base", "Unlit", "Unlit", "", BlendMode::Alpha, true);

    assert_eq!(a.state_hash(), b.state_hash());
    assert_ne!(a.state_hash(), c.state_hash());
    assert_ne!(a.state_hash(), d.state_hash());
}

#[test]
fn test_technique_pass_lookup() {
    let tech = technique("Diff", &["base", "litbase", "light"]);

    assert_eq!(tech.name(), "Diff");
    assert!(tech.has_pass("litbase"));
    assert!(!tech.has_pass("shadow"));
    assert_eq!(tech.pass("light").map(|p| p.name()), Some("light"));
    assert!(tech.pass("shadow").is_none());
    assert_eq!(tech.passes().len(), 3);
}

#[test]
fn test_technique_duplicate_pass_keeps_last() {
    let tech = Technique::new("Dup", vec![
        MaterialPass::new("base", "First"),
        MaterialPass::new("base", "Second"),
    ]);

    assert_eq!(tech.passes().len(), 1);
    assert_eq!(tech.pass("base").map(|p| p.vertex_shader()), Some("Second"));
}

// ============================================================================
// Material
// ============================================================================

#[test]
fn test_material_defaults() {
    let material = Material::new("Stone");

    assert_eq!(material.name(), "Stone");
    assert_eq!(material.render_order(), DEFAULT_RENDER_ORDER);
    assert_eq!(material.id(), Material::new("Stone").id());
    assert_ne!(material.id(), Material::new("Grass").id());
    assert!(material.find_technique(0.0, MaterialQuality::High).is_none());
}

#[test]
fn test_with_render_order() {
    let material = Material::new("Glass").with_render_order(200);
    assert_eq!(material.render_order(), 200);
}

#[test]
fn test_find_technique_by_quality() {
    let mut material = Material::new("Stone");
    material.add_technique(technique("Low", &["base"]), MaterialQuality::Low, 0.0);
    material.add_technique(technique("High", &["base"]), MaterialQuality::High, 0.0);

    let name = |q| material.find_technique(0.0, q).map(|t| t.name().to_string());
    assert_eq!(name(MaterialQuality::High).as_deref(), Some("High"));
    assert_eq!(name(MaterialQuality::Medium).as_deref(), Some("Low"));
    assert_eq!(name(MaterialQuality::Low).as_deref(), Some("Low"));
}

#[test]
fn test_find_technique_by_lod_distance() {
    let mut material = Material::new("Tree");
    material.add_technique(technique("Near", &["base"]), MaterialQuality::Low, 0.0);
    material.add_technique(technique("Far", &["base"]), MaterialQuality::Low, 100.0);

    let name = |d| material.find_technique(d, MaterialQuality::High).map(|t| t.name().to_string());
    assert_eq!(name(10.0).as_deref(), Some("Near"));
    assert_eq!(name(150.0).as_deref(), Some("Far"));
}

#[test]
fn test_find_technique_falls_back_to_last() {
    let mut material = Material::new("Fancy");
    material.add_technique(technique("Ultra", &["base"]), MaterialQuality::High, 0.0);

    let found = material.find_technique(0.0, MaterialQuality::Low);
    assert_eq!(found.map(|t| t.name()), Some("Ultra"));
}

#[test]
fn test_default_material_passes() {
    let material = Material::default_material();
    let tech = material.find_technique(0.0, MaterialQuality::Low).unwrap();

    for pass in ["base", "litbase", "light", "shadow"] {
        assert!(tech.has_pass(pass), "missing pass {}", pass);
    }
    assert_eq!(tech.pass("light").unwrap().blend_mode(), BlendMode::Add);
}
