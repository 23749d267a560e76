//! Cache Statistics Module
//!
//! Tracks how calls were answered: from cache, by joining a request in
//! flight, or by launching a new one.

use serde::Serialize;

// == Cache Stats ==
/// Store performance counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls answered from a valid cache entry
    pub hits: u64,
    /// Calls that consulted the cache and found nothing valid
    pub misses: u64,
    /// Calls that joined a request already in flight
    pub aggregated: u64,
    /// Requests launched through the request callback
    pub requests: u64,
    /// Launched requests that failed or aborted
    pub failures: u64,
    /// Entries removed by `clean()`
    pub cleaned: u64,
    /// Current number of stored entries, valid or not
    pub total_entries: usize,
    /// Current number of requests in flight
    pub pending_requests: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if the cache was never consulted.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Counts a call answered from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Counts a cache lookup that found nothing valid.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts a call that joined a request in flight.
    pub fn record_aggregated(&mut self) {
        self.aggregated += 1;
    }

    /// Counts a launched request.
    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    /// Counts a launched request that failed or aborted.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Adds `count` entries removed by a cleanup sweep.
    pub fn record_cleaned(&mut self, count: usize) {
        self.cleaned += count as u64;
    }
}
