//! Contention counters
//!
//! Strategies that take shortcuts (optimistic reads) or retry (polling) count
//! how often each path runs. Counters are relaxed atomics; they are
//! statistics, not synchronization.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by a ledger
#[derive(Debug, Default)]
pub struct LockStats {
    fast_path: AtomicU64,
    fallbacks: AtomicU64,
    retries: AtomicU64,
    timeouts: AtomicU64,
}

impl LockStats {
    pub fn record_fast_path(&self) {
        self.fast_path.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> LockStatsSnapshot {
        LockStatsSnapshot {
            fast_path: self.fast_path.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
        }
    }
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LockStatsSnapshot {
    /// Optimistic reads that validated without taking a guard
    pub fast_path: u64,
    /// Optimistic reads that fell back to the guarded path
    pub fallbacks: u64,
    /// Failed non-blocking acquisition attempts
    pub retries: u64,
    /// Operations aborted with `LockTimeout`
    pub timeouts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_recorded_events() {
        let stats = LockStats::default();
        stats.record_fast_path();
        stats.record_fast_path();
        stats.record_fallback();
        stats.record_retry();
        stats.record_timeout();

        assert_eq!(
            stats.snapshot(),
            LockStatsSnapshot {
                fast_path: 2,
                fallbacks: 1,
                retries: 1,
                timeouts: 1,
            }
        );
    }
}
