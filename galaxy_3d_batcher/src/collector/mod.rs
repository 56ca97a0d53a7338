//! Collector module
//!
//! The frame pipeline: scene passes, the batch collector running the
//! frame stages, the per-camera view driving it and the callback through
//! which the caller provides shadow policy, shadow maps and pipeline
//! states.

mod callback;
mod drawable_data;
mod mock_callback;
mod scene_batch_collector;
mod scene_pass;
mod view;

pub use callback::SceneBatchCollectorCallback;
pub use drawable_data::{DrawableData, DrawableTraits};
pub use mock_callback::{MockBatchCallback, MockPipelineState, PipelineRequest};
pub use scene_batch_collector::{
    FrameContext, FrameInfo, FrameStage, FrameStatistics, SceneBatchCollector,
};
pub use scene_pass::{BatchSortMode, ScenePass, ShadowScenePass, SortedSceneBatches};
pub use view::SceneView;
