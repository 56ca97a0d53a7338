//! Scene batches, pipeline-state caching and sort keys.

mod scene_batch;
mod pipeline_state;
mod sort_key;

pub use scene_batch::{IntermediateSceneBatch, SceneBatch, SceneBatchSource};
pub use pipeline_state::{
    PipelineState, PipelineStateCache, PipelineStateContext, PipelineStateKey,
};
pub use sort_key::{
    BackToFrontSortKey, LightStateSortKey, StateSortKey,
    sort_batches_back_to_front, sort_batches_by_state, sort_light_batches_by_state,
};
