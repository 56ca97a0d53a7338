//! Integration tests for Engine logging system
//!
//! These tests verify the logger routing and the diagnostics the batch
//! collector reports through it. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests


use galaxy_3d_batcher::galaxy3d::collector::{MockBatchCallback, ScenePass};
use galaxy_3d_batcher::galaxy3d::log::{Logger, LogEntry, LogSeverity};
use galaxy_3d_batcher::galaxy3d::scene::SceneIndex;
use galaxy_3d_batcher::galaxy3d::{BatchCollectorConfig, Engine, FrameInfo, SceneBatchCollector, SceneView};
use galaxy_3d_batcher::glam::Vec3;
use scene_test_utils::{shadowed_sun, work_queue, TestScene};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn entries_from(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str, severity: LogSeverity) -> Vec<String> {
    entries.lock().unwrap()
        .iter()
        .filter(|entry| entry.source == source && entry.severity == severity)
        .map(|entry| entry.message.clone())
        .collect()
}

fn collector() -> SceneBatchCollector {
    let mut collector = SceneBatchCollector::new(BatchCollectorConfig::default(), work_queue(2)).unwrap();
    collector.add_scene_pass(ScenePass::opaque()).unwrap();
    collector
}

fn run(test_scene: &TestScene, collector: &mut SceneBatchCollector, callback: &mut MockBatchCallback) {
    let index: &dyn SceneIndex = &test_scene.index;
    let view = SceneView::define(Some(&test_scene.camera), Some(index)).unwrap();
    let info = FrameInfo { frame_number: 1, ..Default::default() };
    view.update(collector, &test_scene.scene, info, callback).unwrap();
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log_detailed(LogSeverity::Error, "test::module", "Test error message".to_string(), "test_file.rs", 42);

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].message, "Test info message");
        assert_eq!(captured[1].file, Some("test_file.rs"));
        assert_eq!(captured[1].line, Some(42));
    }

    // Messages after a reset go to the default logger
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test::module", "Not captured".to_string());
    assert_eq!(entries.lock().unwrap().len(), 2);
}

#[test]
#[serial]
fn test_integration_refused_shadow_map_warns() {
    let mut test_scene = TestScene::new();
    test_scene.add_geometry(Vec3::new(0.0, 0.0, -5.0), true);
    test_scene.add_light(shadowed_sun());
    test_scene.build_index();

    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let mut collector = collector();
    let mut callback = MockBatchCallback::new().fail_shadow_request(0);
    run(&test_scene, &mut collector, &mut callback);

    let warnings = entries_from(&entries, "galaxy3d::SceneLight", LogSeverity::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("split 0"));
    assert_eq!(collector.statistics().num_failed_shadow_splits, 1);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_unresolved_pipeline_state_warns() {
    let mut test_scene = TestScene::new();
    test_scene.add_geometry(Vec3::new(0.0, 0.0, -5.0), false);
    test_scene.add_geometry(Vec3::new(2.0, 0.0, -5.0), false);
    test_scene.build_index();

    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let mut collector = collector();
    let mut callback = MockBatchCallback::new().fail_shader_defines("LITBASE");
    run(&test_scene, &mut collector, &mut callback);

    let warnings = entries_from(&entries, "galaxy3d::ScenePass", LogSeverity::Warn);
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().all(|message| message.contains("litbase")));

    let stats = collector.statistics();
    assert_eq!(stats.num_dropped_batches, 2);
    assert_eq!(stats.num_base_batches, 0);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_stage_error_is_logged() {
    let test_scene = TestScene::new();
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let mut collector = collector();
    let index: &dyn SceneIndex = &test_scene.index;
    let view = SceneView::define(Some(&test_scene.camera), Some(index)).unwrap();
    let frame = view.frame_context(&test_scene.scene, FrameInfo::default());
    assert!(collector.process_visible_drawables(&frame, &[]).is_err());

    let errors = entries_from(&entries, "galaxy3d::SceneBatchCollector", LogSeverity::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("Invalid frame stage"));

    Engine::reset_logger();
}
