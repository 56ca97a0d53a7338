//! Integration tests for the scene batch collector
//!
//! These tests run whole frames through SceneView and SceneBatchCollector
//! with the mock callback. No GPU required.
//!
//! Run with: cargo test --test collector_integration_tests


use galaxy_3d_batcher::galaxy3d::batch::{LightStateSortKey, StateSortKey};
use galaxy_3d_batcher::galaxy3d::collector::{MockBatchCallback, ScenePass};
use galaxy_3d_batcher::galaxy3d::lighting::ZRange;
use galaxy_3d_batcher::galaxy3d::scene::{DrawableKey, Light, SceneIndex};
use galaxy_3d_batcher::galaxy3d::{
    BatchCollectorConfig, FrameInfo, SceneBatchCollector, SceneView, NO_LIGHT,
};
use galaxy_3d_batcher::glam::{UVec2, Vec3};
use scene_test_utils::{shadowed_sun, sun, work_queue, TestScene};

// ============================================================================
// HELPERS
// ============================================================================

fn frame(frame_number: u64) -> FrameInfo {
    FrameInfo { frame_number, time_step: 1.0 / 60.0, viewport_size: UVec2::new(1920, 1080) }
}

fn new_collector(config: BatchCollectorConfig, num_threads: usize) -> SceneBatchCollector {
    let mut collector = SceneBatchCollector::new(config, work_queue(num_threads)).unwrap();
    collector.add_scene_pass(ScenePass::opaque()).unwrap();
    collector
}

/// Grid of 100 geometries, one sun and five point lights.
fn lit_grid() -> (TestScene, Vec<DrawableKey>) {
    let mut test_scene = TestScene::new();
    let grid = test_scene.add_grid();
    test_scene.add_light(sun());
    for i in 0..5 {
        let mut light = Light::point(Vec3::new(0.0, 2.0, -20.0 - 16.0 * i as f32), 30.0);
        light.brightness = 1.0 + i as f32 * 0.25;
        test_scene.add_light(light);
    }
    test_scene.build_index();
    (test_scene, grid)
}

fn run(test_scene: &TestScene, collector: &mut SceneBatchCollector, frame_number: u64, callback: &mut MockBatchCallback) {
    let index: &dyn SceneIndex = &test_scene.index;
    let view = SceneView::define(Some(&test_scene.camera), Some(index)).unwrap();
    view.update(collector, &test_scene.scene, frame(frame_number), callback).unwrap();
}

/// Everything observable about a frame's batches, in output order.
#[derive(Debug, PartialEq)]
struct FrameSignature {
    base: Vec<(DrawableKey, u32, u32)>,
    light: Vec<(DrawableKey, u32, u32)>,
    base_order: Vec<u32>,
    light_order: Vec<u32>,
    pixel_lights: Vec<[u32; 4]>,
    z_range: ZRange,
}

fn signature(collector: &SceneBatchCollector, grid: &[u32]) -> FrameSignature {
    let pass = &collector.scene_passes()[0];
    let key = |b: &galaxy_3d_batcher::galaxy3d::batch::SceneBatch| (b.drawable, b.light_index, b.source_batch_index);
    FrameSignature {
        base: pass.base_batches().iter().map(key).collect(),
        light: pass.light_batches().iter().map(key).collect(),
        base_order: pass.sorted_batches().base_order(),
        light_order: pass.sorted_batches().light_order(),
        pixel_lights: grid.iter().map(|&index| collector.pixel_lights(index)).collect(),
        z_range: collector.scene_z_range(),
    }
}

fn grid_indices(test_scene: &TestScene, grid: &[DrawableKey]) -> Vec<u32> {
    grid.iter()
        .map(|&key| test_scene.scene.drawable(key).map(|d| d.index()).unwrap())
        .collect()
}

// ============================================================================
// FRAME TESTS
// ============================================================================

#[test]
fn test_integration_lit_grid_frame() {
    let (test_scene, grid) = lit_grid();
    let config = BatchCollectorConfig { max_pixel_lights: 4, ..Default::default() };
    let mut collector = new_collector(config, 4);
    let mut callback = MockBatchCallback::new();
    run(&test_scene, &mut collector, 1, &mut callback);

    let stats = collector.statistics();
    assert_eq!(stats.num_visible_geometries, 100);
    assert_eq!(stats.num_visible_lights, 6);
    assert_eq!(stats.num_base_batches, 100);
    assert_eq!(stats.num_dropped_batches, 0);

    let main = collector.main_light_index().unwrap();
    let mut expected_light_batches = 0;
    for index in grid_indices(&test_scene, &grid) {
        let pixel = collector.pixel_lights(index);
        let vertex = collector.vertex_lights(index);
        assert_eq!(pixel[0], main, "the sun is the first pixel light of every geometry");

        let num_pixel = pixel.iter().filter(|&&l| l != NO_LIGHT).count();
        assert!(num_pixel <= 4);
        for light in pixel.iter().filter(|&&l| l != NO_LIGHT) {
            assert!(!vertex.contains(light), "light {} in both tiers", light);
        }
        expected_light_batches += num_pixel - 1;
    }
    assert_eq!(stats.num_light_batches, expected_light_batches);

    let pass = &collector.scene_passes()[0];
    assert!(pass.base_batches().iter().all(|batch| batch.light_index == main));
    assert!(pass.base_batches().iter().all(|batch| batch.pipeline_state.is_some()));

    let base_order = pass.sorted_batches().base_order();
    let mut order = base_order.clone();
    order.sort_unstable();
    assert_eq!(order, (0..100).collect::<Vec<u32>>());

    // Submission order has no inversions under the state keys
    let base_keys: Vec<StateSortKey> = base_order
        .iter()
        .map(|&i| StateSortKey::new(&pass.base_batches()[i as usize], i))
        .collect();
    assert!(base_keys.windows(2).all(|w| w[0] < w[1]));

    let light_order = pass.sorted_batches().light_order();
    assert_eq!(light_order.len(), pass.light_batches().len());
    let light_keys: Vec<LightStateSortKey> = light_order
        .iter()
        .map(|&i| LightStateSortKey::new(&pass.light_batches()[i as usize], i))
        .collect();
    assert!(!light_keys.is_empty());
    assert!(light_keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_integration_output_independent_of_parallelism() {
    let (test_scene, grid) = lit_grid();
    let grid = grid_indices(&test_scene, &grid);

    let serial_config = BatchCollectorConfig { max_pixel_lights: 4, ..Default::default() };
    let mut serial = new_collector(serial_config, 1);
    let mut callback = MockBatchCallback::new();
    run(&test_scene, &mut serial, 1, &mut callback);

    let parallel_config = BatchCollectorConfig {
        max_pixel_lights: 4,
        drawable_work_threshold: 3,
        lit_geometries_work_threshold: 7,
        batch_work_threshold: 1,
        ..Default::default()
    };
    let mut parallel = new_collector(parallel_config, 4);
    run(&test_scene, &mut parallel, 1, &mut callback);

    assert_eq!(signature(&serial, &grid), signature(&parallel, &grid));
}

#[test]
fn test_integration_z_range_independent_of_chunking() {
    let (test_scene, _) = lit_grid();

    let mut ranges = Vec::new();
    for threshold in [1, 16, 1000] {
        let config = BatchCollectorConfig { drawable_work_threshold: threshold, ..Default::default() };
        let mut collector = new_collector(config, 4);
        let mut callback = MockBatchCallback::new();
        run(&test_scene, &mut collector, 1, &mut callback);
        ranges.push(collector.scene_z_range());
    }

    assert!(ranges[0].is_valid());
    assert!((ranges[0].min - 11.0).abs() < 1e-3);
    assert!((ranges[0].max - 85.0).abs() < 1e-3);
    assert!(ranges.iter().all(|range| *range == ranges[0]));
}

#[test]
fn test_integration_third_shadow_split_refused() {
    let mut test_scene = TestScene::new();
    for z in [-5.0, -30.0, -120.0] {
        test_scene.add_geometry(Vec3::new(0.0, 0.0, z), true);
    }
    let sun = test_scene.add_light(shadowed_sun());
    test_scene.build_index();

    let mut collector = new_collector(BatchCollectorConfig::default(), 2);
    let mut callback = MockBatchCallback::new().fail_shadow_request(2);
    run(&test_scene, &mut collector, 1, &mut callback);

    let stats = collector.statistics();
    assert_eq!(callback.shadow_requests.len(), 3);
    assert_eq!(stats.num_shadowed_lights, 1);
    assert_eq!(stats.num_shadow_splits, 2);
    assert_eq!(stats.num_failed_shadow_splits, 1);
    assert_eq!(stats.num_base_batches, 3);

    let light = collector.main_light().unwrap();
    assert_eq!(light.key(), sun);
    let splits = light.splits();
    assert_eq!(splits.len(), 3);
    assert!(splits[0].is_shadowed() && !splits[0].shadow_batches.is_empty());
    assert!(splits[1].is_shadowed() && !splits[1].shadow_batches.is_empty());
    assert!(!splits[2].is_shadowed());
    assert!(splits[2].shadow_batches.is_empty());
}

#[test]
fn test_integration_main_light_stable_across_frames() {
    let mut test_scene = TestScene::new();
    test_scene.add_geometry(Vec3::new(0.0, 0.0, -10.0), false);
    let a = test_scene.add_light(sun());
    let b = test_scene.add_light(Light::directional(Vec3::NEG_Y));
    test_scene.build_index();
    let expected = a.min(b);

    let mut collector = new_collector(BatchCollectorConfig::default(), 2);
    let mut callback = MockBatchCallback::new();
    for frame_number in 1..=5 {
        run(&test_scene, &mut collector, frame_number, &mut callback);
        assert_eq!(collector.main_light().map(|light| light.key()), Some(expected));
        callback.end_frame();
    }
}

#[test]
fn test_integration_pipeline_states_reused_across_frames() {
    let (test_scene, _) = lit_grid();
    let mut collector = new_collector(BatchCollectorConfig { max_pixel_lights: 4, ..Default::default() }, 4);
    let mut callback = MockBatchCallback::new();

    run(&test_scene, &mut collector, 1, &mut callback);
    assert!(!callback.pipeline_requests.is_empty());
    callback.end_frame();

    run(&test_scene, &mut collector, 2, &mut callback);
    assert!(callback.pipeline_requests.is_empty());
    assert_eq!(collector.statistics().num_dropped_batches, 0);
}
