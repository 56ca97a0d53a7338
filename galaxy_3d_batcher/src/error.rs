//! Error types for the Galaxy3D batch collector
//!
//! This module defines the error types returned by the frame pipeline:
//! precondition failures (missing camera or spatial index, stages called
//! out of order), configuration errors and resolution failures reported
//! by the external device layer.

use std::fmt;

/// Result type for Galaxy3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error reported by an external collaborator
    BackendError(String),

    /// Invalid resource (material, technique, pass, drawable, ...)
    InvalidResource(String),

    /// Initialization failed (engine, work queue, subsystems)
    InitializationFailed(String),

    /// Configuration rejected by validation
    InvalidConfiguration(String),

    /// No camera was provided for the frame
    MissingCamera,

    /// No spatial index was provided for the frame
    MissingSceneIndex,

    /// A frame stage was called out of order
    InvalidFrameStage {
        /// Stage the collector expected to be in
        expected: &'static str,
        /// Stage the collector was actually in
        actual: &'static str,
    },

    /// A stage was called with a different frame than `begin_frame`
    FrameMismatch {
        /// Frame number captured by `begin_frame`
        expected: u64,
        /// Frame number passed to the stage
        actual: u64,
    },

    /// The pipeline-state resolver could not produce a pipeline state
    PipelineStateUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::MissingCamera => write!(f, "No camera provided for the frame"),
            Error::MissingSceneIndex => write!(f, "No scene index provided for the frame"),
            Error::InvalidFrameStage { expected, actual } => {
                write!(f, "Invalid frame stage: expected {}, got {}", expected, actual)
            }
            Error::FrameMismatch { expected, actual } => {
                write!(f, "Frame mismatch: expected frame {}, got frame {}", expected, actual)
            }
            Error::PipelineStateUnavailable(msg) => write!(f, "Pipeline state unavailable: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
