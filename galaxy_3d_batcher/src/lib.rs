/*!
# Galaxy 3D Batcher

Per-frame scene batch collection for the Galaxy 3D engine.

Given a camera, a scene and the set of drawables the camera sees, the
collector produces for each frame the sorted lists of draw batches of
every scene pass, the per-drawable pixel and vertex lights, and the
shadow splits of every shadowed light with their own batches.

## Architecture

- **Scene**: drawable registry (geometries and lights) and spatial index
- **Camera**: view, projection, frustum and per-frame visibility result
- **Lighting**: light ranking, view depth ranges, shadow splits and maps
- **Batch**: scene batches, pipeline-state cache and sort keys
- **Collector**: scene passes, the frame stages and the per-camera driver

The device layer stays outside: shadow maps and pipeline states are
requested through `SceneBatchCollectorCallback`. Parallel work runs on
the engine's `WorkQueue`.
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod camera;
pub mod scene;
pub mod lighting;
pub mod batch;
pub mod collector;
pub mod utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Collector configuration and capacities
    pub use crate::config::{
        BatchCollectorConfig, MAX_PIXEL_LIGHTS, MAX_SCENE_PASSES, MAX_VERTEX_LIGHTS, NO_LIGHT,
    };

    // Frame pipeline entry points
    pub use crate::collector::{
        FrameContext, FrameInfo, FrameStage, FrameStatistics, SceneBatchCollector,
        SceneBatchCollectorCallback, SceneView,
    };

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Lighting sub-module
    pub mod lighting {
        pub use crate::lighting::*;
    }

    // Batch sub-module
    pub mod batch {
        pub use crate::batch::*;
    }

    // Collector sub-module
    pub mod collector {
        pub use crate::collector::*;
    }

    // Utility sub-module
    pub mod utils {
        pub use crate::utils::*;
    }
}

// Re-export math library at crate root
pub use glam;
