//! Processing statistics
//!
//! Lock-free counters for observability; snapshots are cheap and taken on
//! demand by health endpoints and tests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the edit processing pipeline.
#[derive(Debug, Default)]
pub struct ProcessingStats {
    /// CDC messages pulled from the feed
    pub messages_processed: AtomicU64,
    /// Edits that passed geometry validation
    pub edits_validated: AtomicU64,
    /// Edits rejected by a validation rule
    pub edits_rejected: AtomicU64,
    /// Reconciliations applied end to end
    pub edits_applied: AtomicU64,
    /// Full re-runs triggered by concurrency conflicts
    pub conflicts_retried: AtomicU64,
    /// Edits that failed terminally
    pub edits_failed: AtomicU64,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validated(&self) {
        self.edits_validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.edits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self) {
        self.edits_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conflict_retry(&self) {
        self.conflicts_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.edits_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProcessingStatsSnapshot {
        ProcessingStatsSnapshot {
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            edits_validated: self.edits_validated.load(Ordering::Relaxed),
            edits_rejected: self.edits_rejected.load(Ordering::Relaxed),
            edits_applied: self.edits_applied.load(Ordering::Relaxed),
            conflicts_retried: self.conflicts_retried.load(Ordering::Relaxed),
            edits_failed: self.edits_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`ProcessingStats`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStatsSnapshot {
    pub messages_processed: u64,
    pub edits_validated: u64,
    pub edits_rejected: u64,
    pub edits_applied: u64,
    pub conflicts_retried: u64,
    pub edits_failed: u64,
}

impl ProcessingStatsSnapshot {
    /// Fraction of processed messages that were applied (0.0 - 1.0).
    pub fn apply_rate(&self) -> f64 {
        if self.messages_processed == 0 {
            return 1.0;
        }
        self.edits_applied as f64 / self.messages_processed as f64
    }
}
