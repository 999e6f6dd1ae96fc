//! Error types for the pi sampling engine.
//!
//! Configuration problems are caught when [`EngineConfig`](crate::config::EngineConfig)
//! is built; everything else surfaces from [`Engine::run`](crate::engine::Engine::run).

use thiserror::Error;

/// Configuration error raised by [`EngineConfigBuilder::build`](crate::config::EngineConfigBuilder::build).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Worker count outside the valid range.
    #[error("Invalid worker count {0}: must be in range [1, {max}]", max = crate::config::MAX_WORKERS)]
    InvalidWorkerCount(usize),

    /// Checkpoint interval of zero.
    #[error("Invalid checkpoint interval {0}: must be at least 1")]
    InvalidCheckpointInterval(u64),

    /// Sample limit of zero.
    #[error("Invalid sample limit {0}: must be at least 1")]
    InvalidSampleLimit(u64),

    /// Reference constant that is not a finite positive number.
    #[error("Invalid reference pi {0}: must be finite and positive")]
    InvalidReference(f64),
}

/// Runtime error raised while driving the worker pool.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The OS refused to start a worker thread.
    #[error("Failed to launch worker {index}: {source}")]
    Spawn {
        /// Index of the worker that could not be started.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before it could be joined cleanly.
    #[error("Worker {0} panicked during sampling")]
    WorkerPanicked(usize),

    /// The report sink failed to write.
    #[error("Report error: {0}")]
    Report(#[from] std::io::Error),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
