//! The orchestrator.
//!
//! [`Engine::run`] walks one run through
//! `Starting → Running → Stopping → Aggregating → Reporting → Done`:
//!
//! 1. **Starting**: allocate one slot per worker and launch the threads
//! 2. **Running**: block on the [`StopSignal`]
//! 3. **Stopping**: raise every stop flag, then join every worker
//! 4. **Aggregating**: sum the final per-slot counters
//! 5. **Reporting**: emit the estimate, then drain the checkpoint series
//!
//! # Example
//!
//! ```rust
//! use piculator_engine::config::EngineConfig;
//! use piculator_engine::engine::Engine;
//! use piculator_engine::report::TextReport;
//! use piculator_engine::signal::StopSignal;
//!
//! let config = EngineConfig::builder()
//!     .workers(2)
//!     .checkpoint_interval(1_000)
//!     .sample_limit(10_000)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! let mut engine = Engine::new(config);
//! let mut report = TextReport::new(Vec::new());
//! let summary = engine.run_uniform(&StopSignal::new(), &mut report).unwrap();
//!
//! assert_eq!(summary.totals.points_total, 20_000);
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::analysis::AnalysisSampler;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::report::ReportSink;
use crate::rng::{PointSource, UniformPointSource};
use crate::signal::StopSignal;
use crate::slot::{SlotSnapshot, SlotTable};
use crate::worker::{ExitReason, Worker, WorkerExit};

/// Lifecycle of one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Allocating slots and launching workers.
    #[default]
    Starting,
    /// Workers are sampling; waiting for the stop signal.
    Running,
    /// Stop flags raised; joining workers.
    Stopping,
    /// Summing final counters.
    Aggregating,
    /// Emitting the report.
    Reporting,
    /// Run complete.
    Done,
}

/// Outcome of a completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Number of workers that ran.
    pub workers: usize,
    /// Final counters per worker, in worker order.
    pub per_worker: Vec<SlotSnapshot>,
    /// Sum of `per_worker`.
    pub totals: SlotSnapshot,
    /// Checkpoint records emitted to the report.
    pub checkpoints: usize,
    /// Checkpoints skipped because nothing had been sampled.
    pub skipped_checkpoints: u64,
    /// Workers that stopped because they reached the sample limit.
    pub limit_exits: usize,
}

impl RunSummary {
    /// Final pi estimate, `None` when no point was sampled.
    #[inline]
    pub fn estimate(&self) -> Option<f64> {
        self.totals.estimate()
    }
}

/// Drives a pool of sampling workers.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    state: EngineState,
}

impl Engine {
    /// Creates an engine for `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::Starting,
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the state the engine last entered.
    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Runs with entropy-seeded (or base-seeded, if configured) uniform sources.
    ///
    /// # Errors
    ///
    /// See [`Engine::run`].
    pub fn run_uniform<R>(&mut self, signal: &StopSignal, sink: R) -> Result<RunSummary>
    where
        R: ReportSink,
    {
        let seed = self.config.seed();
        self.run(signal, sink, |index| UniformPointSource::for_worker(seed, index))
    }

    /// Runs one full cycle, drawing worker `i`'s points from `make_source(i)`.
    ///
    /// Blocks until `signal` fires (or, with a sample limit, until every
    /// worker has finished), then joins all workers and reports.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Spawn`] if a worker thread cannot be launched; the
    ///   workers already running are stopped and joined first
    /// - [`EngineError::WorkerPanicked`] if a worker panicked
    /// - [`EngineError::Report`] if the sink fails
    pub fn run<R, S, F>(
        &mut self,
        signal: &StopSignal,
        mut sink: R,
        mut make_source: F,
    ) -> Result<RunSummary>
    where
        R: ReportSink,
        S: PointSource + 'static,
        F: FnMut(usize) -> S,
    {
        self.enter(EngineState::Starting);
        let workers = self.config.workers();
        let slots = Arc::new(SlotTable::new(workers));
        sink.launched(workers)?;

        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let sampler = (index == 0)
                .then(|| AnalysisSampler::new(Arc::clone(&slots), self.config.reference_pi()));
            let worker = Worker::new(
                index,
                Arc::clone(&slots),
                make_source(index),
                sampler,
                self.config.checkpoint_interval(),
                self.config.sample_limit(),
                signal.handle(),
            );

            let spawned = thread::Builder::new()
                .name(format!("piculator-{index}"))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    tracing::error!(worker = index, %source, "Failed to launch worker");
                    slots.request_stop_all();
                    // The launch error wins over anything the partial pool reports.
                    let _ = join_all(handles);
                    return Err(EngineError::Spawn { index, source });
                }
            }
        }

        self.enter(EngineState::Running);
        signal.wait();

        self.enter(EngineState::Stopping);
        slots.request_stop_all();
        let mut report_error = None;
        for index in 0..workers {
            if let Err(err) = sink.interrupting(index) {
                report_error.get_or_insert(err);
            }
        }
        let exits = join_all(handles)?;
        if let Some(err) = report_error {
            return Err(err.into());
        }

        self.enter(EngineState::Aggregating);
        let per_worker = slots.snapshots();
        let totals: SlotSnapshot = per_worker.iter().copied().sum();
        let limit_exits = exits
            .iter()
            .filter(|exit| exit.reason == ExitReason::LimitReached)
            .count();
        let skipped_checkpoints: u64 = exits.iter().map(|exit| exit.skipped_checkpoints).sum();
        let mut series = exits
            .into_iter()
            .find_map(|exit| exit.series)
            .unwrap_or_default();

        self.enter(EngineState::Reporting);
        sink.summary(&totals)?;
        sink.deviation_header()?;
        let mut checkpoints = 0;
        for record in series.drain() {
            sink.deviation(&record)?;
            checkpoints += 1;
        }

        tracing::info!(
            points = totals.points_total,
            estimate = ?totals.estimate(),
            checkpoints,
            "Run complete"
        );
        self.enter(EngineState::Done);

        Ok(RunSummary {
            workers,
            per_worker,
            totals,
            checkpoints,
            skipped_checkpoints,
            limit_exits,
        })
    }

    fn enter(&mut self, state: EngineState) {
        tracing::info!(from = ?self.state, to = ?state, "Engine state change");
        self.state = state;
    }
}

/// Joins every handle, even after a failure, so no worker outlives the run.
fn join_all(handles: Vec<JoinHandle<WorkerExit>>) -> Result<Vec<WorkerExit>> {
    let mut exits = Vec::with_capacity(handles.len());
    let mut panicked = None;
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(exit) => exits.push(exit),
            Err(_) => {
                tracing::error!(worker = index, "Worker panicked");
                panicked.get_or_insert(index);
            }
        }
    }
    match panicked {
        Some(index) => Err(EngineError::WorkerPanicked(index)),
        None => Ok(exits),
    }
}
