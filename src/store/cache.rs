//! Cache Module
//!
//! TTL rules applied on top of a [`StateBackend`]: serving valid entries,
//! stamping new ones and sweeping expired ones.

use crate::store::backend::StateBackend;
use crate::store::entry::CacheEntry;

// == TTL Policy ==
/// Time-to-live policy of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// Default TTL in seconds. `Some(0)` disables caching, `None` never expires.
    cache_duration: Option<u64>,
}

impl TtlPolicy {
    // == Constructor ==
    /// Creates a policy with the given default TTL in seconds.
    pub fn new(cache_duration: Option<u64>) -> Self {
        Self { cache_duration }
    }

    /// Default TTL in seconds.
    pub fn cache_duration(&self) -> Option<u64> {
        self.cache_duration
    }

    /// Returns false when writes are no-ops (`cache_duration == Some(0)`).
    pub fn is_enabled(&self) -> bool {
        self.cache_duration != Some(0)
    }

    /// Absolute expiry for an entry written at `now_ms`.
    pub fn expires_at(&self, now_ms: u64) -> Option<u64> {
        self.cache_duration
            .map(|secs| now_ms.saturating_add(secs.saturating_mul(1000)))
    }

    // == Read ==
    /// Returns the cached payload for `key` if it is still valid at `now_ms`.
    ///
    /// Stale entries are left in place for [`clean`](Self::clean).
    pub fn read<T, E, B>(&self, backend: &B, key: &str, now_ms: u64) -> Option<T>
    where
        T: Clone,
        B: StateBackend<T, E> + ?Sized,
    {
        backend
            .entry(key)
            .filter(|entry| entry.is_valid(now_ms))
            .map(|entry| entry.data.clone())
    }

    // == Write ==
    /// Stores `data` under `key`, replacing any previous entry wholesale.
    ///
    /// Returns false without touching the backend when caching is disabled.
    pub fn write<T, E, B>(&self, backend: &mut B, key: &str, data: T, now_ms: u64) -> bool
    where
        B: StateBackend<T, E> + ?Sized,
    {
        if !self.is_enabled() {
            return false;
        }

        backend.insert_entry(key, CacheEntry::new(data, self.expires_at(now_ms)));
        true
    }

    // == Clean ==
    /// Removes every entry that is no longer valid at `now_ms`.
    ///
    /// Returns the number of entries removed.
    pub fn clean<T, E, B>(&self, backend: &mut B, now_ms: u64) -> usize
    where
        B: StateBackend<T, E> + ?Sized,
    {
        let expired_keys = backend.entry_keys_where(&|entry| !entry.is_valid(now_ms));

        let mut count = 0;
        for key in expired_keys {
            if backend.remove_entry(&key) {
                count += 1;
            }
        }
        count
    }
}
