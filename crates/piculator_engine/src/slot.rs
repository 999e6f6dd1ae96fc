//! Shared accumulator state.
//!
//! Each worker owns one [`WorkerSlot`] for writing; the analysis sampler and
//! the orchestrator only read. Slots live in a [`SlotTable`] shared by `Arc`.
//!
//! # Memory Ordering
//!
//! A slot has exactly one writer, so counters are published with plain
//! stores instead of read-modify-write operations. The writer stores
//! `points_total` before `points_in_circle`, the latter with `Release`; a
//! reader loads `points_in_circle` with `Acquire` before `points_total`.
//! Any reader therefore observes `in_circle <= total`.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

/// Point-in-time copy of a slot's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotSnapshot {
    /// Points that fell inside the circle.
    pub points_in_circle: u64,
    /// Points generated.
    pub points_total: u64,
}

impl SlotSnapshot {
    /// Returns `4 * in_circle / total`, or `None` when no point was counted.
    #[inline]
    pub fn estimate(&self) -> Option<f64> {
        if self.points_total == 0 {
            None
        } else {
            Some(4.0 * self.points_in_circle as f64 / self.points_total as f64)
        }
    }
}

impl std::ops::Add for SlotSnapshot {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            points_in_circle: self.points_in_circle + rhs.points_in_circle,
            points_total: self.points_total + rhs.points_total,
        }
    }
}

impl std::iter::Sum for SlotSnapshot {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, s| acc + s)
    }
}

/// Per-worker counters plus the stop flag.
#[derive(Debug, Default)]
pub struct WorkerSlot {
    points_in_circle: AtomicU64,
    points_total: AtomicU64,
    stop_requested: AtomicBool,
}

impl WorkerSlot {
    /// Creates a zeroed slot with the stop flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the owning worker's running counts.
    ///
    /// Must only be called by the slot's worker.
    #[inline]
    pub(crate) fn publish(&self, in_circle: u64, total: u64) {
        debug_assert!(in_circle <= total);
        self.points_total.store(total, Ordering::Relaxed);
        self.points_in_circle.store(in_circle, Ordering::Release);
    }

    /// Reads both counters.
    #[inline]
    pub fn snapshot(&self) -> SlotSnapshot {
        let points_in_circle = self.points_in_circle.load(Ordering::Acquire);
        let points_total = self.points_total.load(Ordering::Relaxed);
        SlotSnapshot {
            points_in_circle,
            points_total,
        }
    }

    /// Asks the owning worker to stop after its current sample.
    #[inline]
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Returns whether a stop has been requested.
    #[inline]
    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

/// The fixed set of slots for one worker pool.
///
/// Slots are cache-line padded so that workers hammering their own counters
/// do not invalidate each other's cache lines.
#[derive(Debug)]
pub struct SlotTable {
    slots: Box<[CachePadded<WorkerSlot>]>,
    finished: AtomicUsize,
}

impl SlotTable {
    /// Allocates `workers` zeroed slots.
    pub fn new(workers: usize) -> Self {
        Self {
            slots: (0..workers).map(|_| CachePadded::new(WorkerSlot::new())).collect(),
            finished: AtomicUsize::new(0),
        }
    }

    /// Returns the number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the table holds no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn slot(&self, index: usize) -> &WorkerSlot {
        &self.slots[index]
    }

    /// Iterates the slots in worker order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkerSlot> {
        self.slots.iter().map(|padded| &**padded)
    }

    /// Sums the counters of every slot.
    ///
    /// While workers are running the result is a slightly stale but
    /// internally consistent view.
    pub fn aggregate(&self) -> SlotSnapshot {
        self.iter().map(WorkerSlot::snapshot).sum()
    }

    /// Per-slot snapshots in worker order.
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        self.iter().map(WorkerSlot::snapshot).collect()
    }

    /// Sets the stop flag on every slot.
    pub fn request_stop_all(&self) {
        self.iter().for_each(WorkerSlot::request_stop);
    }

    /// Records that one worker exhausted its sample limit.
    ///
    /// Returns `true` for the call that accounts for the last worker.
    pub(crate) fn mark_finished(&self) -> bool {
        self.finished.fetch_add(1, Ordering::AcqRel) + 1 == self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_slot_is_zeroed() {
        let slot = WorkerSlot::new();
        assert_eq!(slot.snapshot(), SlotSnapshot::default());
        assert!(!slot.stop_requested());
    }

    #[test]
    fn test_publish_and_snapshot() {
        let slot = WorkerSlot::new();
        slot.publish(3, 5);

        let snap = slot.snapshot();
        assert_eq!(snap.points_in_circle, 3);
        assert_eq!(snap.points_total, 5);
        assert_eq!(snap.estimate(), Some(2.4));
    }

    #[test]
    fn test_empty_snapshot_has_no_estimate() {
        assert_eq!(SlotSnapshot::default().estimate(), None);
    }

    #[test]
    fn test_stop_flag() {
        let table = SlotTable::new(3);
        table.slot(1).request_stop();
        assert!(!table.slot(0).stop_requested());
        assert!(table.slot(1).stop_requested());

        table.request_stop_all();
        assert!(table.iter().all(WorkerSlot::stop_requested));
    }

    #[test]
    fn test_aggregate_sums_every_slot() {
        let table = SlotTable::new(3);
        table.slot(0).publish(1, 2);
        table.slot(1).publish(3, 4);
        table.slot(2).publish(5, 6);

        let total = table.aggregate();
        assert_eq!(total.points_in_circle, 9);
        assert_eq!(total.points_total, 12);
        assert_eq!(table.snapshots().len(), 3);
    }

    #[test]
    fn test_mark_finished_reports_last() {
        let table = SlotTable::new(2);
        assert!(!table.mark_finished());
        assert!(table.mark_finished());
    }

    #[test]
    fn test_concurrent_reader_sees_consistent_counts() {
        let table = Arc::new(SlotTable::new(1));
        let writer_table = Arc::clone(&table);

        let writer = thread::spawn(move || {
            let slot = writer_table.slot(0);
            let mut inside = 0;
            for total in 1..=200_000u64 {
                if total % 4 != 0 {
                    inside += 1;
                }
                slot.publish(inside, total);
            }
        });

        let mut last = SlotSnapshot::default();
        while !writer.is_finished() {
            let snap = table.slot(0).snapshot();
            assert!(snap.points_in_circle <= snap.points_total);
            assert!(snap.points_total >= last.points_total);
            assert!(snap.points_in_circle >= last.points_in_circle);
            last = snap;
        }
        writer.join().unwrap();

        assert_eq!(table.slot(0).snapshot().points_total, 200_000);
    }
}
