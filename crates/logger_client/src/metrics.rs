//! Per-client call counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one client (shared by all its clones and spawned calls)
#[derive(Debug, Default)]
pub struct CallMetrics {
    /// Finished synchronous calls
    sync_calls: AtomicU64,
    /// Synchronous calls that returned an error
    sync_failures: AtomicU64,
    /// `log_async` invocations, admitted or not
    async_started: AtomicU64,
    async_succeeded: AtomicU64,
    async_failed: AtomicU64,
    /// Refused by the admission limit
    async_rejected: AtomicU64,
    /// Dropped before the transport answered
    async_cancelled: AtomicU64,
}

impl CallMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sync(&self, ok: bool) {
        self.sync_calls.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.sync_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn inc_async_started(&self) {
        self.async_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_async(&self, ok: bool) {
        if ok {
            self.async_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.async_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn inc_async_rejected(&self) {
        self.async_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_async_cancelled(&self) {
        self.async_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn async_completed(&self) -> u64 {
        self.async_succeeded.load(Ordering::Relaxed)
            + self.async_failed.load(Ordering::Relaxed)
            + self.async_rejected.load(Ordering::Relaxed)
            + self.async_cancelled.load(Ordering::Relaxed)
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self, in_flight: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            sync_calls: self.sync_calls.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            async_started: self.async_started.load(Ordering::Relaxed),
            async_succeeded: self.async_succeeded.load(Ordering::Relaxed),
            async_failed: self.async_failed.load(Ordering::Relaxed),
            async_rejected: self.async_rejected.load(Ordering::Relaxed),
            async_cancelled: self.async_cancelled.load(Ordering::Relaxed),
            in_flight,
        }
    }
}

/// Snapshot of client metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sync_calls: u64,
    pub sync_failures: u64,
    pub async_started: u64,
    pub async_succeeded: u64,
    pub async_failed: u64,
    pub async_rejected: u64,
    pub async_cancelled: u64,
    pub in_flight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_counts_every_outcome() {
        let metrics = CallMetrics::new();
        for _ in 0..4 {
            metrics.inc_async_started();
        }
        metrics.record_async(true);
        metrics.record_async(false);
        metrics.inc_async_rejected();
        metrics.inc_async_cancelled();

        assert_eq!(metrics.async_completed(), 4);
        let snapshot = metrics.snapshot(0);
        assert_eq!(snapshot.async_started, 4);
        assert_eq!(snapshot.async_failed, 1);
    }
}
