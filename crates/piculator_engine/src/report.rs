//! Report output.
//!
//! The orchestrator narrates a run through a [`ReportSink`]. [`TextReport`]
//! writes the line format that downstream tooling consumes: only the
//! deviation lines contain a comma, so `grep ",.*"` extracts a CSV series.

use std::io::{self, Write};

use crate::analysis::DeviationRecord;
use crate::slot::SlotSnapshot;

/// Receives the events of one run, in order.
pub trait ReportSink {
    /// The pool is about to start `workers` threads.
    fn launched(&mut self, workers: usize) -> io::Result<()>;

    /// Worker `index` has been told to stop and is being joined.
    fn interrupting(&mut self, index: usize) -> io::Result<()>;

    /// Final aggregate counts of every worker.
    fn summary(&mut self, totals: &SlotSnapshot) -> io::Result<()>;

    /// The checkpoint series follows.
    fn deviation_header(&mut self) -> io::Result<()>;

    /// One checkpoint, delivered in creation order.
    fn deviation(&mut self, record: &DeviationRecord) -> io::Result<()>;
}

/// Plain-text report written to any `Write`.
#[derive(Debug)]
pub struct TextReport<W: Write> {
    out: W,
}

impl TextReport<io::Stdout> {
    /// Report on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextReport<W> {
    /// Wraps `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn launched(&mut self, workers: usize) -> io::Result<()> {
        writeln!(self.out, "Launching {} Piculators threads.", workers)?;
        self.out.flush()
    }

    fn interrupting(&mut self, index: usize) -> io::Result<()> {
        writeln!(
            self.out,
            "Sending interrupt signal to thread: {} and waiting to close.",
            index
        )
    }

    fn summary(&mut self, totals: &SlotSnapshot) -> io::Result<()> {
        match totals.estimate() {
            Some(estimate) => writeln!(
                self.out,
                "Calculated Pi value of {:.6} using {} points.",
                estimate, totals.points_total
            ),
            None => writeln!(
                self.out,
                "Calculated Pi value of undefined using {} points.",
                totals.points_total
            ),
        }
    }

    fn deviation_header(&mut self) -> io::Result<()> {
        writeln!(self.out, "Deviation at given points (CSV safe):")
    }

    fn deviation(&mut self, record: &DeviationRecord) -> io::Result<()> {
        writeln!(self.out, "{}", record.to_csv())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for &mut S {
    fn launched(&mut self, workers: usize) -> io::Result<()> {
        (**self).launched(workers)
    }

    fn interrupting(&mut self, index: usize) -> io::Result<()> {
        (**self).interrupting(index)
    }

    fn summary(&mut self, totals: &SlotSnapshot) -> io::Result<()> {
        (**self).summary(totals)
    }

    fn deviation_header(&mut self) -> io::Result<()> {
        (**self).deviation_header()
    }

    fn deviation(&mut self, record: &DeviationRecord) -> io::Result<()> {
        (**self).deviation(record)
    }
}
