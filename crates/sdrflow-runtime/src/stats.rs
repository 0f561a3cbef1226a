//! Runtime counters shared between the gate, the scheduler and handles.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters, updated with relaxed ordering.
#[derive(Debug, Default)]
pub struct FlowgraphStats {
    pushes_accepted: AtomicU64,
    pushes_rejected: AtomicU64,
    samples_accepted: AtomicU64,
    samples_consumed: AtomicU64,
    windows_computed: AtomicU64,
    windows_published: AtomicU64,
    windows_decimated: AtomicU64,
    faults: AtomicU64,
}

impl FlowgraphStats {
    pub(crate) fn record_accept(&self, samples: usize) {
        self.pushes_accepted.fetch_add(1, Ordering::Relaxed);
        self.samples_accepted
            .fetch_add(samples as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_reject(&self) {
        self.pushes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_consumed(&self, samples: usize) {
        self.samples_consumed
            .fetch_add(samples as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_computed(&self) {
        self.windows_computed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published(&self) {
        self.windows_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decimated(&self) {
        self.windows_decimated.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.faults.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pushes_accepted: self.pushes_accepted.load(Ordering::Relaxed),
            pushes_rejected: self.pushes_rejected.load(Ordering::Relaxed),
            samples_accepted: self.samples_accepted.load(Ordering::Relaxed),
            samples_consumed: self.samples_consumed.load(Ordering::Relaxed),
            windows_computed: self.windows_computed.load(Ordering::Relaxed),
            windows_published: self.windows_published.load(Ordering::Relaxed),
            windows_decimated: self.windows_decimated.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`FlowgraphStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Pushes admitted into the buffer.
    pub pushes_accepted: u64,
    /// Pushes turned away for lack of space.
    pub pushes_rejected: u64,
    /// Samples admitted.
    pub samples_accepted: u64,
    /// Samples drained by the scheduler (computed or faulted).
    pub samples_consumed: u64,
    /// Windows that reached the transform and succeeded.
    pub windows_computed: u64,
    /// Windows whose output became a snapshot.
    pub windows_published: u64,
    /// Windows computed but skipped by decimation.
    pub windows_decimated: u64,
    /// Windows dropped by a fault.
    pub faults: u64,
}

impl StatsSnapshot {
    /// Samples admitted but not yet drained.
    pub fn pending_samples(&self) -> u64 {
        self.samples_accepted.saturating_sub(self.samples_consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = FlowgraphStats::default();
        stats.record_accept(100);
        stats.record_accept(28);
        stats.record_reject();
        stats.record_consumed(64);
        stats.record_computed();
        stats.record_published();
        stats.record_fault();

        let snap = stats.snapshot();
        assert_eq!(snap.pushes_accepted, 2);
        assert_eq!(snap.pushes_rejected, 1);
        assert_eq!(snap.samples_accepted, 128);
        assert_eq!(snap.pending_samples(), 64);
        assert_eq!(snap.windows_published, 1);
        assert_eq!(snap.faults, 1);
    }
}
