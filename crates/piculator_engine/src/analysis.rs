//! Checkpoint analysis.
//!
//! The lead worker owns an [`AnalysisSampler`] and calls
//! [`AnalysisSampler::checkpoint`] every `checkpoint_interval` samples. Each
//! call sums all slots, including the lead's own, and appends one
//! [`DeviationRecord`] to its [`DeviationSeries`]. The series travels back to
//! the orchestrator through the lead worker's join handle.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::slot::SlotTable;

/// Deviation from the reference constant at one checkpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviationRecord {
    /// `reference_pi - estimate`.
    pub deviation: f64,
    /// Aggregate sample count the estimate was computed from.
    pub sample_count: u64,
}

impl DeviationRecord {
    /// Renders the record as the `<count>,<deviation>` CSV fragment.
    pub fn to_csv(&self) -> String {
        format!("{},{:.6}", self.sample_count, self.deviation)
    }
}

/// Ordered, drain-once sequence of checkpoint records.
#[derive(Clone, Debug, Default)]
pub struct DeviationSeries {
    records: VecDeque<DeviationRecord>,
}

impl DeviationSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record at the back.
    #[inline]
    pub fn push(&mut self, record: DeviationRecord) {
        self.records.push_back(record);
    }

    /// Number of records held.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no record is held.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the records in creation order without consuming them.
    pub fn iter(&self) -> impl Iterator<Item = &DeviationRecord> {
        self.records.iter()
    }

    /// Removes and yields every record in creation order.
    pub fn drain(&mut self) -> impl Iterator<Item = DeviationRecord> + '_ {
        self.records.drain(..)
    }
}

/// Computes running estimates at checkpoints.
#[derive(Debug)]
pub struct AnalysisSampler {
    slots: Arc<SlotTable>,
    reference_pi: f64,
    series: DeviationSeries,
    skipped: u64,
}

impl AnalysisSampler {
    /// Creates a sampler reading `slots` and measuring against `reference_pi`.
    pub fn new(slots: Arc<SlotTable>, reference_pi: f64) -> Self {
        Self {
            slots,
            reference_pi,
            series: DeviationSeries::new(),
            skipped: 0,
        }
    }

    /// Takes one checkpoint.
    ///
    /// Returns the appended record, or `None` when no sample has been counted
    /// yet; in that case nothing is appended.
    pub fn checkpoint(&mut self) -> Option<DeviationRecord> {
        let totals = self.slots.aggregate();
        let Some(estimate) = totals.estimate() else {
            self.skipped += 1;
            tracing::debug!("Checkpoint skipped: no samples counted yet");
            return None;
        };

        let record = DeviationRecord {
            deviation: self.reference_pi - estimate,
            sample_count: totals.points_total,
        };
        tracing::trace!(
            samples = record.sample_count,
            estimate,
            deviation = record.deviation,
            "Checkpoint recorded"
        );
        self.series.push(record);
        Some(record)
    }

    /// Number of checkpoints skipped because nothing had been sampled.
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Borrows the series recorded so far.
    #[inline]
    pub fn series(&self) -> &DeviationSeries {
        &self.series
    }

    /// Consumes the sampler and hands over its series.
    pub fn into_series(self) -> DeviationSeries {
        self.series
    }
}
