//! # Piculator Engine
//!
//! Estimates pi by Monte Carlo sampling on a fixed pool of worker threads.
//!
//! Every worker draws uniform points in the unit square from its own
//! [`PointSource`](rng::PointSource) and counts how many land inside the
//! quarter unit circle. The ratio of circle to square area is `pi / 4`, so
//! `4 * inside / total` converges to pi.
//!
//! ## Architecture
//!
//! - [`rng`]: per-worker point sources (entropy-seeded or reproducible)
//! - [`slot`]: cache-padded, single-writer atomic counters plus stop flags
//! - [`worker`]: the sampling loop and point classification
//! - [`analysis`]: lead-worker checkpoints recording deviation from the
//!   reference constant
//! - [`signal`]: the stop signal and its stdin/timer triggers
//! - [`report`]: report sink and the plain-text line format
//! - [`engine`]: the orchestrator tying the run together
//!
//! Data flows one way for sampling (source → worker → slot) and one way for
//! observation (slot → analysis → series → report).
//!
//! ## Usage Example
//!
//! ```rust
//! use piculator_engine::prelude::*;
//!
//! let config = EngineConfig::builder()
//!     .workers(2)
//!     .sample_limit(50_000)
//!     .checkpoint_interval(10_000)
//!     .build()
//!     .unwrap();
//!
//! let signal = StopSignal::new();
//! let mut engine = Engine::new(config);
//! let summary = engine
//!     .run_uniform(&signal, TextReport::new(Vec::new()))
//!     .unwrap();
//!
//! let estimate = summary.estimate().unwrap();
//! assert!((estimate - REFERENCE_PI).abs() < 0.1);
//! ```

pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod rng;
pub mod signal;
pub mod slot;
pub mod worker;

/// Commonly used types.
pub mod prelude {
    pub use crate::analysis::{DeviationRecord, DeviationSeries};
    pub use crate::config::{EngineConfig, REFERENCE_PI};
    pub use crate::engine::{Engine, EngineState, RunSummary};
    pub use crate::error::{ConfigError, EngineError};
    pub use crate::report::{ReportSink, TextReport};
    pub use crate::rng::{PointSource, ScriptedPointSource, UniformPointSource};
    pub use crate::signal::{StopHandle, StopSignal};
    pub use crate::slot::SlotSnapshot;
}
