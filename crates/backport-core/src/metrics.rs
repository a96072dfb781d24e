//! Global atomic counters for triage runs.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, no allocations and no locking.
pub struct Metrics {
    commits_processed: AtomicU64,
    tasks_executed: AtomicU64,
    cherry_picks_failed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            commits_processed: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            cherry_picks_failed: AtomicU64::new(0),
        }
    }

    pub fn inc_commits_processed(&self) {
        self.commits_processed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "commits_processed", "counter incremented");
    }

    pub fn inc_tasks_executed(&self) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "tasks_executed", "counter incremented");
    }

    pub fn inc_cherry_picks_failed(&self) {
        self.cherry_picks_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "cherry_picks_failed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            commits_processed = self.commits_processed(),
            tasks_executed = self.tasks_executed(),
            cherry_picks_failed = self.cherry_picks_failed(),
        );
    }

    pub fn commits_processed(&self) -> u64 {
        self.commits_processed.load(Ordering::Relaxed)
    }

    pub fn tasks_executed(&self) -> u64 {
        self.tasks_executed.load(Ordering::Relaxed)
    }

    pub fn cherry_picks_failed(&self) -> u64 {
        self.cherry_picks_failed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.commits_processed.store(0, Ordering::Relaxed);
        self.tasks_executed.store(0, Ordering::Relaxed);
        self.cherry_picks_failed.store(0, Ordering::Relaxed);
    }
}
