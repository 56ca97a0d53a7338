/// Galaxy3D Engine - Singleton manager for engine subsystems
///
/// This module provides global singleton management for the shared work queue
/// and the logger. It uses thread-safe static storage with RwLock for safe
/// concurrent access.

use std::sync::{OnceLock, RwLock, Arc};
use std::time::SystemTime;
use crate::utils::{WorkQueue, WorkQueueConfig};
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding all engine singletons
struct EngineState {
    /// Work queue shared by every batch collector
    work_queue: RwLock<Option<Arc<WorkQueue>>>,
}

impl EngineState {
    /// Create a new empty engine state
    fn new() -> Self {
        Self {
            work_queue: RwLock::new(None),
        }
    }
}

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the lifecycle of the shared work queue and the global logger.
/// Batch collectors can also be given a `WorkQueue` directly, the singleton
/// is a convenience for applications with a single worker pool.
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_batcher::galaxy3d::Engine;
/// use galaxy_3d_batcher::galaxy3d::utils::WorkQueueConfig;
///
/// Engine::initialize()?;
/// Engine::create_work_queue(&WorkQueueConfig::default())?;
///
/// let work_queue = Engine::work_queue()?;
/// // Hand the queue to a SceneBatchCollector...
///
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_batcher::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Helper to log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::InitializationFailed(msg) => {
                crate::engine_error!("galaxy3d::Engine", "Initialization failed: {}", msg);
            }
            _ => {
                crate::engine_error!("galaxy3d::Engine", "Engine error: {}", error);
            }
        }
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine
    ///
    /// This must be called once at application startup before creating any subsystems.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and destroy all singletons
    ///
    /// Collectors still holding an `Arc<WorkQueue>` keep their pool alive
    /// until they are dropped.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut work_queue) = state.work_queue.write() {
                *work_queue = None;
            }
        }
    }

    // ===== WORK QUEUE API =====

    /// Create and register the work queue singleton
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A work queue already exists
    /// - The configuration is rejected or the worker threads cannot be spawned
    pub fn create_work_queue(config: &WorkQueueConfig) -> Result<Arc<WorkQueue>> {
        let state = Self::state()?;

        let mut lock = state.work_queue.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("WorkQueue lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("WorkQueue already exists. Call Engine::destroy_work_queue() first.".to_string())
            ));
        }

        let work_queue = Arc::new(WorkQueue::new(config).map_err(Self::log_and_return_error)?);
        *lock = Some(Arc::clone(&work_queue));

        crate::engine_info!("galaxy3d::Engine",
            "WorkQueue singleton created with {} worker threads", work_queue.num_threads());

        Ok(work_queue)
    }

    /// Get the work queue singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the work queue
    /// has not been created.
    pub fn work_queue() -> Result<Arc<WorkQueue>> {
        let state = Self::state()?;

        let lock = state.work_queue.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("WorkQueue lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("WorkQueue not created. Call Engine::create_work_queue() first.".to_string())
            ))
    }

    /// Destroy the work queue singleton
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized
    pub fn destroy_work_queue() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.work_queue.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("WorkQueue lock poisoned".to_string())
            ))?;

        *lock = None;

        crate::engine_info!("galaxy3d::Engine", "WorkQueue singleton destroyed");

        Ok(())
    }

    /// Reset all singletons for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut work_queue) = state.work_queue.write() {
                *work_queue = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// frame diagnostics collector, etc.)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use galaxy_3d_batcher::galaxy3d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct FileLogger;
    /// impl Logger for FileLogger {
    ///     fn log(&self, entry: &LogEntry) {
    ///         // Write to file...
    ///     }
    /// }
    ///
    /// Engine::set_logger(FileLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
