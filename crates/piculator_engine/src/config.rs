//! Engine configuration.
//!
//! This module provides [`EngineConfig`] and its builder. Every value has a
//! default so that `EngineConfig::builder().build()` yields the interactive,
//! run-until-stopped setup.

use std::num::NonZeroUsize;
use std::thread;

use crate::error::ConfigError;

/// Reference approximation of pi that checkpoint deviations are measured against.
#[allow(clippy::approx_constant, clippy::excessive_precision)]
pub const REFERENCE_PI: f64 = 3.14159265358979324;

/// Lead-worker samples between two analysis checkpoints.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1_000_000;

/// Worker count used when hardware parallelism cannot be detected.
pub const FALLBACK_WORKERS: usize = 2;

/// Maximum number of workers allowed.
pub const MAX_WORKERS: usize = 1024;

/// Returns the number of workers the current machine can sustain.
///
/// Falls back to [`FALLBACK_WORKERS`] when the platform cannot report its
/// available parallelism.
pub fn detect_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or_else(|err| {
            tracing::warn!(
                %err,
                "Hardware parallelism undetectable, using {} workers",
                FALLBACK_WORKERS
            );
            FALLBACK_WORKERS
        })
}

/// Pool-wide sampling configuration.
///
/// Immutable once built. Use [`EngineConfigBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust
/// use piculator_engine::config::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .workers(4)
///     .checkpoint_interval(10_000)
///     .sample_limit(100_000)
///     .seed(42)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.workers(), 4);
/// assert_eq!(config.sample_limit(), Some(100_000));
/// ```
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of worker threads.
    workers: usize,
    /// Lead-worker samples between analysis checkpoints.
    checkpoint_interval: u64,
    /// Constant deviations are measured against.
    reference_pi: f64,
    /// Optional per-worker sample limit; `None` samples until stopped.
    sample_limit: Option<u64>,
    /// Optional base seed; `None` seeds every worker from OS entropy.
    seed: Option<u64>,
}

impl EngineConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Returns the number of worker threads.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the lead-worker checkpoint interval.
    #[inline]
    pub fn checkpoint_interval(&self) -> u64 {
        self.checkpoint_interval
    }

    /// Returns the reference pi constant.
    #[inline]
    pub fn reference_pi(&self) -> f64 {
        self.reference_pi
    }

    /// Returns the per-worker sample limit, if any.
    #[inline]
    pub fn sample_limit(&self) -> Option<u64> {
        self.sample_limit
    }

    /// Returns the base seed, if any.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `workers` is 0 or greater than [`MAX_WORKERS`]
    /// - `checkpoint_interval` is 0
    /// - `sample_limit` is `Some(0)`
    /// - `reference_pi` is not finite and positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount(self.workers));
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::InvalidCheckpointInterval(self.checkpoint_interval));
        }
        if self.sample_limit == Some(0) {
            return Err(ConfigError::InvalidSampleLimit(0));
        }
        if !self.reference_pi.is_finite() || self.reference_pi <= 0.0 {
            return Err(ConfigError::InvalidReference(self.reference_pi));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: detect_worker_count(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            reference_pi: REFERENCE_PI,
            sample_limit: None,
            seed: None,
        }
    }
}

/// Builder for [`EngineConfig`].
///
/// Unset fields take the defaults of [`EngineConfig::default`].
#[derive(Clone, Debug, Default)]
pub struct EngineConfigBuilder {
    workers: Option<usize>,
    checkpoint_interval: Option<u64>,
    reference_pi: Option<f64>,
    sample_limit: Option<u64>,
    seed: Option<u64>,
}

impl EngineConfigBuilder {
    /// Sets the number of worker threads.
    #[inline]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Sets the number of lead-worker samples between checkpoints.
    #[inline]
    pub fn checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = Some(interval);
        self
    }

    /// Overrides the reference constant.
    #[inline]
    pub fn reference_pi(mut self, reference_pi: f64) -> Self {
        self.reference_pi = Some(reference_pi);
        self
    }

    /// Caps every worker at `limit` samples.
    #[inline]
    pub fn sample_limit(mut self, limit: u64) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    /// Seeds every worker deterministically from `seed`.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig {
            workers: self.workers.unwrap_or_else(detect_worker_count),
            checkpoint_interval: self
                .checkpoint_interval
                .unwrap_or(DEFAULT_CHECKPOINT_INTERVAL),
            reference_pi: self.reference_pi.unwrap_or(REFERENCE_PI),
            sample_limit: self.sample_limit,
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder().build().unwrap();

        assert!(config.workers() >= 1);
        assert_eq!(config.checkpoint_interval(), DEFAULT_CHECKPOINT_INTERVAL);
        assert_eq!(config.reference_pi(), REFERENCE_PI);
        assert_eq!(config.sample_limit(), None);
        assert_eq!(config.seed(), None);
    }

    #[test]
    fn test_detect_worker_count_is_positive() {
        assert!(detect_worker_count() >= 1);
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::builder()
            .workers(3)
            .checkpoint_interval(500)
            .reference_pi(3.0)
            .sample_limit(10)
            .seed(7)
            .build()
            .unwrap();

        assert_eq!(config.workers(), 3);
        assert_eq!(config.checkpoint_interval(), 500);
        assert_eq!(config.reference_pi(), 3.0);
        assert_eq!(config.sample_limit(), Some(10));
        assert_eq!(config.seed(), Some(7));
    }

    #[test]
    fn test_invalid_worker_count() {
        let err = EngineConfig::builder().workers(0).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidWorkerCount(0));

        let err = EngineConfig::builder()
            .workers(MAX_WORKERS + 1)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidWorkerCount(MAX_WORKERS + 1));
    }

    #[test]
    fn test_invalid_interval_and_limit() {
        let err = EngineConfig::builder()
            .checkpoint_interval(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidCheckpointInterval(0));

        let err = EngineConfig::builder().sample_limit(0).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidSampleLimit(0));
    }

    #[test]
    fn test_invalid_reference() {
        assert!(EngineConfig::builder()
            .reference_pi(f64::INFINITY)
            .build()
            .is_err());
        assert!(EngineConfig::builder().reference_pi(-1.0).build().is_err());
    }
}
