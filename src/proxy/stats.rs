//! Proxy Statistics Module
//!
//! Counts how each proxied request ended.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Proxy Stats ==
/// Lock-free outcome counters shared by all request handlers.
#[derive(Debug, Default)]
pub struct ProxyStats {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    rejected: AtomicU64,
    failures: AtomicU64,
    disabled: AtomicU64,
}

/// Point-in-time copy of [`ProxyStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    /// Requests served from the cache
    pub hits: u64,
    /// Cache lookups that found nothing (or failed)
    pub misses: u64,
    /// Upstream requests that returned a cacheable body
    pub fetches: u64,
    /// Requests refused before reaching upstream
    pub rejected: u64,
    /// Upstream transport or parse failures
    pub failures: u64,
    /// Requests answered with the disabled envelope
    pub disabled: u64,
}

impl StatsSnapshot {
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl ProxyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_disabled(&self) {
        self.disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            disabled: self.disabled.load(Ordering::Relaxed),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        assert_eq!(ProxyStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = ProxyStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert_eq!(stats.snapshot().hit_rate(), 0.75);
    }

    #[test]
    fn test_outcome_counters() {
        let stats = ProxyStats::new();
        stats.record_fetch();
        stats.record_rejected();
        stats.record_rejected();
        stats.record_failure();
        stats.record_disabled();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.fetches, 1);
        assert_eq!(snapshot.rejected, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.disabled, 1);
    }
}
