//! The per-worker sampling loop.

use std::sync::Arc;
use std::thread;

use num_traits::Float;

use crate::analysis::{AnalysisSampler, DeviationSeries};
use crate::rng::PointSource;
use crate::signal::StopHandle;
use crate::slot::SlotTable;

/// Returns whether `(x, y)` lies within the unit circle centred at the origin.
///
/// Points exactly on the circle count as inside.
///
/// # Examples
///
/// ```rust
/// use piculator_engine::worker::is_inside;
///
/// assert!(is_inside(1.0_f64, 0.0));
/// assert!(!is_inside(1.0_f64, 1.0));
/// ```
#[inline]
pub fn is_inside<T: Float>(x: T, y: T) -> bool {
    x * x + y * y <= T::one()
}

/// Why a worker left its loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    /// The orchestrator set the stop flag.
    Stopped,
    /// The configured sample limit was reached.
    LimitReached,
}

/// What a worker hands back through its join handle.
#[derive(Debug)]
pub struct WorkerExit {
    /// Worker index.
    pub index: usize,
    /// Why the loop ended.
    pub reason: ExitReason,
    /// Checkpoint series; only the lead worker carries one.
    pub series: Option<DeviationSeries>,
    /// Checkpoints skipped because the pool had not counted anything yet.
    pub skipped_checkpoints: u64,
}

/// Fires the pool signal if the worker unwinds, so the orchestrator never
/// waits on a sample limit a dead worker can no longer reach.
struct PanicGuard<'a>(&'a StopHandle);

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.trigger();
        }
    }
}

/// One sampling task, bound to slot `index`.
pub(crate) struct Worker<S> {
    index: usize,
    slots: Arc<SlotTable>,
    source: S,
    sampler: Option<AnalysisSampler>,
    checkpoint_interval: u64,
    sample_limit: Option<u64>,
    pool_done: StopHandle,
}

impl<S: PointSource> Worker<S> {
    pub(crate) fn new(
        index: usize,
        slots: Arc<SlotTable>,
        source: S,
        sampler: Option<AnalysisSampler>,
        checkpoint_interval: u64,
        sample_limit: Option<u64>,
        pool_done: StopHandle,
    ) -> Self {
        Self {
            index,
            slots,
            source,
            sampler,
            checkpoint_interval,
            sample_limit,
            pool_done,
        }
    }

    /// Samples until stopped or until the sample limit is reached.
    pub(crate) fn run(mut self) -> WorkerExit {
        tracing::debug!(worker = self.index, lead = self.sampler.is_some(), "Worker started");

        let _guard = PanicGuard(&self.pool_done);
        let slot = self.slots.slot(self.index);
        let mut in_circle = 0u64;
        let mut total = 0u64;

        let reason = loop {
            if slot.stop_requested() {
                break ExitReason::Stopped;
            }
            if self.sample_limit.is_some_and(|limit| total >= limit) {
                break ExitReason::LimitReached;
            }

            let (x, y) = self.source.next_point();
            if is_inside(x, y) {
                in_circle += 1;
            }
            total += 1;
            slot.publish(in_circle, total);

            if total % self.checkpoint_interval == 0 {
                if let Some(sampler) = self.sampler.as_mut() {
                    sampler.checkpoint();
                }
            }
        };

        if reason == ExitReason::LimitReached && self.slots.mark_finished() {
            tracing::debug!("Every worker reached its sample limit");
            self.pool_done.trigger();
        }

        tracing::debug!(worker = self.index, ?reason, in_circle, total, "Worker exited");
        let skipped_checkpoints = self.sampler.as_ref().map_or(0, AnalysisSampler::skipped);
        WorkerExit {
            index: self.index,
            reason,
            series: self.sampler.map(AnalysisSampler::into_series),
            skipped_checkpoints,
        }
    }
}
