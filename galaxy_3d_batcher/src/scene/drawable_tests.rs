use glam::Vec3;
use super::*;

fn unit_box() -> AABB {
    AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

#[test]
fn test_geometry_drawable_defaults() {
    let drawable = Drawable::geometry(unit_box(), vec![SourceBatch::new(GeometryId(7), None)]);

    assert!(drawable.is_geometry());
    assert!(!drawable.is_light());
    assert!(!drawable.casts_shadows());
    assert_eq!(drawable.view_mask, u32::MAX);
    assert_eq!(drawable.light_mask, u32::MAX);
    assert_eq!(drawable.source_batches.len(), 1);
    assert_eq!(drawable.source_batches[0].geometry_type, GeometryType::Static);
    assert_eq!(drawable.source_batches[0].lightmap_index, 0);
    assert!(drawable.light.is_none());
}

#[test]
fn test_light_drawable_bounds_from_volume() {
    let drawable = Drawable::light(Light::point(Vec3::new(1.0, 2.0, 3.0), 4.0));

    assert!(drawable.is_light());
    assert!(!drawable.is_geometry());
    assert_eq!(drawable.world_aabb.center(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(drawable.world_aabb.half_size(), Vec3::splat(4.0));
    assert!(drawable.source_batches.is_empty());
}

#[test]
fn test_with_cast_shadows() {
    let drawable = Drawable::geometry(unit_box(), Vec::new()).with_cast_shadows(true);
    assert!(drawable.casts_shadows());
    assert!(drawable.flags.contains(DrawableFlags::GEOMETRY | DrawableFlags::CAST_SHADOWS));

    let drawable = drawable.with_cast_shadows(false);
    assert!(!drawable.casts_shadows());
}

#[test]
fn test_max_shadow_distance() {
    let mut drawable = Drawable::geometry(unit_box(), Vec::new());
    assert_eq!(drawable.max_shadow_distance(), 0.0);

    drawable.shadow_distance = 50.0;
    assert_eq!(drawable.max_shadow_distance(), 50.0);

    drawable.draw_distance = 30.0;
    assert_eq!(drawable.max_shadow_distance(), 30.0);

    drawable.draw_distance = 80.0;
    assert_eq!(drawable.max_shadow_distance(), 50.0);

    drawable.shadow_distance = 0.0;
    assert_eq!(drawable.max_shadow_distance(), 80.0);
}

#[test]
fn test_flags_are_distinct_bits() {
    let all = DrawableFlags::GEOMETRY
        | DrawableFlags::LIGHT
        | DrawableFlags::CAST_SHADOWS
        | DrawableFlags::RECEIVE_SHADOWS;
    assert_eq!(all.bits().count_ones(), 4);
}

#[test]
fn test_geometry_lod_selection() {
    let batch = SourceBatch::new(GeometryId(1), None).with_lods(vec![
        GeometryLod { distance: 40.0, geometry: GeometryId(3) },
        GeometryLod { distance: 15.0, geometry: GeometryId(2) },
    ]);

    assert_eq!(batch.lods[0].geometry, GeometryId(2));
    assert_eq!(batch.geometry_at(0.0), GeometryId(1));
    assert_eq!(batch.geometry_at(14.9), GeometryId(1));
    assert_eq!(batch.geometry_at(15.0), GeometryId(2));
    assert_eq!(batch.geometry_at(39.0), GeometryId(2));
    assert_eq!(batch.geometry_at(500.0), GeometryId(3));
    assert_eq!(SourceBatch::new(GeometryId(5), None).geometry_at(500.0), GeometryId(5));
}

#[test]
fn test_view_distance() {
    let camera = Vec3::new(0.0, 0.0, 10.0);

    let mut geometry = Drawable::geometry(unit_box(), Vec::new());
    let distances = geometry.view_distance(camera);
    assert!((distances.distance - 10.0).abs() < 1e-5);
    assert!((distances.lod_distance - 10.0).abs() < 1e-5);

    geometry.lod_bias = 2.0;
    assert!((geometry.view_distance(camera).lod_distance - 5.0).abs() < 1e-5);

    let sky = Drawable::geometry(AABB::infinite(), Vec::new());
    assert_eq!(sky.view_distance(camera).distance, 0.0);

    let sun = Drawable::light(Light::directional(Vec3::NEG_Y));
    assert_eq!(sun.view_distance(camera).distance, 0.0);

    let lamp = Drawable::light(Light::point(Vec3::new(0.0, 4.0, 10.0), 2.0));
    assert!((lamp.view_distance(camera).distance - 4.0).abs() < 1e-5);
}
