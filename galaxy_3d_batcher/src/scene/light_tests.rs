use glam::Vec3;
use super::*;

// ============================================================================
// Cascades
// ============================================================================

#[test]
fn test_cascade_num_splits() {
    assert_eq!(CascadeParameters::default().num_splits(), 3);
    assert_eq!(CascadeParameters::new(&[5.0, 20.0, 80.0, 300.0]).num_splits(), 4);
    assert_eq!(CascadeParameters::new(&[5.0]).num_splits(), 1);
    assert_eq!(CascadeParameters::new(&[]).num_splits(), 0);
}

#[test]
fn test_cascade_stops_at_non_increasing_split() {
    assert_eq!(CascadeParameters::new(&[10.0, 5.0, 80.0]).num_splits(), 1);
    assert_eq!(CascadeParameters::new(&[10.0, 10.0]).num_splits(), 1);
}

#[test]
fn test_cascade_ignores_extra_values() {
    let params = CascadeParameters::new(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(params.splits, [1.0, 2.0, 3.0, 4.0]);
}

// ============================================================================
// Intensity and distance
// ============================================================================

#[test]
fn test_intensity_is_luminance_times_brightness() {
    let mut light = Light::directional(Vec3::NEG_Y);
    assert!((light.intensity() - 1.0).abs() < 1e-4);

    light.brightness = 2.0;
    assert!((light.intensity() - 2.0).abs() < 1e-4);

    light.color = Vec3::new(0.0, 0.0, 1.0);
    assert!((light.intensity() - 2.0 * 0.0722).abs() < 1e-4);

    light.color = Vec3::ZERO;
    assert_eq!(light.intensity(), 0.0);
    assert_eq!(light.effective_color(), Vec3::ZERO);
}

#[test]
fn test_distance_to() {
    let aabb = AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0));

    assert_eq!(Light::directional(Vec3::NEG_Y).distance_to(&aabb), 0.0);
    assert_eq!(Light::point(Vec3::new(5.0, 0.0, 0.0), 10.0).distance_to(&aabb), 4.0);
    assert_eq!(Light::point(Vec3::ZERO, 10.0).distance_to(&aabb), 0.0);
}

// ============================================================================
// Volumes
// ============================================================================

#[test]
fn test_directional_illuminates_everything() {
    let light = Light::directional(Vec3::new(1.0, -1.0, 0.0));
    assert!(light.illuminates(&AABB::new(Vec3::splat(1000.0), Vec3::splat(1001.0))));
    assert!(light.bounding_box().is_infinite());
    assert!((light.direction.length() - 1.0).abs() < 1e-5);
}

#[test]
fn test_point_light_volume() {
    let light = Light::point(Vec3::ZERO, 5.0);

    assert!(light.illuminates(&AABB::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(6.0, 1.0, 1.0))));
    assert!(!light.illuminates(&AABB::new(Vec3::new(6.0, 0.0, 0.0), Vec3::new(7.0, 1.0, 1.0))));

    let bounds = light.bounding_box();
    assert_eq!(bounds.min, Vec3::splat(-5.0));
    assert_eq!(bounds.max, Vec3::splat(5.0));
}

#[test]
fn test_spot_light_volume() {
    let light = Light::spot(Vec3::ZERO, Vec3::NEG_Z, 20.0, 60.0);

    let in_cone = AABB::from_center_half_size(Vec3::new(0.0, 0.0, -10.0), Vec3::splat(0.5));
    let behind = AABB::from_center_half_size(Vec3::new(0.0, 0.0, 10.0), Vec3::splat(0.5));
    let beside = AABB::from_center_half_size(Vec3::new(15.0, 0.0, -5.0), Vec3::splat(0.5));
    let too_far = AABB::from_center_half_size(Vec3::new(0.0, 0.0, -30.0), Vec3::splat(0.5));

    assert!(light.illuminates(&in_cone));
    assert!(!light.illuminates(&behind));
    assert!(!light.illuminates(&beside));
    assert!(!light.illuminates(&too_far));
}

#[test]
fn test_spot_bounding_box_contains_cone() {
    let light = Light::spot(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 10.0, 90.0);
    let bounds = light.bounding_box();

    assert!((bounds.max.y - 10.0).abs() < 1e-3);
    assert!(bounds.min.y < 0.5);
    assert!(bounds.max.x > 5.0);
}

#[test]
fn test_look_to_handles_vertical_direction() {
    let view = Light::look_to(Vec3::ZERO, Vec3::NEG_Y);
    assert!(view.is_finite());
    let forward = view.transform_point3(Vec3::new(0.0, -1.0, 0.0));
    assert!((forward.z + 1.0).abs() < 1e-5);
}
