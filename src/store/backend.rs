//! State Backend Module
//!
//! Storage interface holding the two maps a store works on (key to cached
//! entry, key to in-flight request) and the plain in-memory implementation.

use std::collections::HashMap;

use crate::store::entry::{CacheEntry, PendingRequest};

// == State Backend ==
/// Key-value plus key-request storage used by [`Store`](crate::store::Store).
///
/// Backends only hold state. Expiry rules and the request life cycle live in
/// the store, which calls these methods inside short synchronous critical
/// sections.
pub trait StateBackend<T, E>: Send + 'static {
    /// Returns the stored entry for `key`, valid or not.
    fn entry(&self, key: &str) -> Option<&CacheEntry<T>>;

    /// Stores `entry` under `key`, replacing any previous one.
    fn insert_entry(&mut self, key: &str, entry: CacheEntry<T>);

    /// Removes the entry under `key`, returning whether one existed.
    fn remove_entry(&mut self, key: &str) -> bool;

    /// Returns the keys of every stored entry matching `predicate`.
    fn entry_keys_where(&self, predicate: &dyn Fn(&CacheEntry<T>) -> bool) -> Vec<String>;

    /// Number of stored entries, valid or not.
    fn entry_count(&self) -> usize;

    /// Returns the in-flight request registered for `key`.
    fn pending(&self, key: &str) -> Option<&PendingRequest<T, E>>;

    /// Registers `request` for `key`, replacing any previous one.
    fn insert_pending(&mut self, key: &str, request: PendingRequest<T, E>);

    /// Removes the in-flight request for `key`.
    fn remove_pending(&mut self, key: &str) -> Option<PendingRequest<T, E>>;

    /// Number of in-flight requests.
    fn pending_count(&self) -> usize;

    /// Empties both maps.
    fn clear(&mut self);
}

// == Memory Backend ==
/// Plain in-memory backend built on two `HashMap`s.
#[derive(Debug)]
pub struct MemoryBackend<T, E> {
    entries: HashMap<String, CacheEntry<T>>,
    pending: HashMap<String, PendingRequest<T, E>>,
}

impl<T, E> MemoryBackend<T, E> {
    // == Constructor ==
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashMap::new(),
        }
    }
}

impl<T, E> Default for MemoryBackend<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> StateBackend<T, E> for MemoryBackend<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn entry(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    fn insert_entry(&mut self, key: &str, entry: CacheEntry<T>) {
        self.entries.insert(key.to_string(), entry);
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn entry_keys_where(&self, predicate: &dyn Fn(&CacheEntry<T>) -> bool) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| predicate(entry))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn pending(&self, key: &str) -> Option<&PendingRequest<T, E>> {
        self.pending.get(key)
    }

    fn insert_pending(&mut self, key: &str, request: PendingRequest<T, E>) {
        self.pending.insert(key.to_string(), request);
    }

    fn remove_pending(&mut self, key: &str) -> Option<PendingRequest<T, E>> {
        self.pending.remove(key)
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
    }
}
