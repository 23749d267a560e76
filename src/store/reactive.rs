//! Reactive Backend Module
//!
//! A backend that publishes every map update as a [`Mutation`] so observers
//! (UI bindings, devtools, loggers) can follow the store without touching it.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::store::backend::{MemoryBackend, StateBackend};
use crate::store::entry::{CacheEntry, PendingRequest};

/// Default capacity of the mutation channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

// == Mutation ==
/// A single committed update to one of the store maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mutation {
    /// A cache entry was written or replaced
    EntryWritten {
        key: String,
        expires_at: Option<u64>,
    },
    /// A cache entry was removed
    EntryRemoved { key: String },
    /// A request was registered as in flight
    RequestRegistered { key: String, id: u64 },
    /// An in-flight request was released
    RequestReleased { key: String, id: u64 },
    /// Both maps were emptied
    Cleared,
}

// == Reactive Backend ==
/// In-memory state with a broadcast of every committed mutation.
///
/// Each map update produces exactly one [`Mutation`], sent after the update is
/// applied and in commit order. Sends never block; when nobody subscribes the
/// mutation is dropped, and slow subscribers observe `RecvError::Lagged`.
#[derive(Debug)]
pub struct ReactiveBackend<T, E> {
    state: MemoryBackend<T, E>,
    mutations: broadcast::Sender<Mutation>,
}

impl<T, E> ReactiveBackend<T, E> {
    /// Creates a backend whose channel buffers up to `capacity` mutations.
    pub fn new(capacity: usize) -> Self {
        let (mutations, _) = broadcast::channel(capacity.max(1));
        Self {
            state: MemoryBackend::new(),
            mutations,
        }
    }

    /// Subscribes to mutations committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Mutation> {
        self.mutations.subscribe()
    }

    /// Returns a sender handle, for subscribing after the backend has been
    /// moved into a store.
    pub fn sender(&self) -> broadcast::Sender<Mutation> {
        self.mutations.clone()
    }

    fn commit(&self, mutation: Mutation) {
        // No receivers is fine
        let _ = self.mutations.send(mutation);
    }
}

impl<T, E> Default for ReactiveBackend<T, E> {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl<T, E> StateBackend<T, E> for ReactiveBackend<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn entry(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.state.entry(key)
    }

    fn insert_entry(&mut self, key: &str, entry: CacheEntry<T>) {
        let expires_at = entry.expires_at;
        self.state.insert_entry(key, entry);
        self.commit(Mutation::EntryWritten {
            key: key.to_string(),
            expires_at,
        });
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.state.remove_entry(key);
        if removed {
            self.commit(Mutation::EntryRemoved {
                key: key.to_string(),
            });
        }
        removed
    }

    fn entry_keys_where(&self, predicate: &dyn Fn(&CacheEntry<T>) -> bool) -> Vec<String> {
        self.state.entry_keys_where(predicate)
    }

    fn entry_count(&self) -> usize {
        self.state.entry_count()
    }

    fn pending(&self, key: &str) -> Option<&PendingRequest<T, E>> {
        self.state.pending(key)
    }

    fn insert_pending(&mut self, key: &str, request: PendingRequest<T, E>) {
        let id = request.id;
        self.state.insert_pending(key, request);
        self.commit(Mutation::RequestRegistered {
            key: key.to_string(),
            id,
        });
    }

    fn remove_pending(&mut self, key: &str) -> Option<PendingRequest<T, E>> {
        let removed = self.state.remove_pending(key);
        if let Some(request) = &removed {
            self.commit(Mutation::RequestReleased {
                key: key.to_string(),
                id: request.id,
            });
        }
        removed
    }

    fn pending_count(&self) -> usize {
        self.state.pending_count()
    }

    fn clear(&mut self) {
        self.state.clear();
        self.commit(Mutation::Cleared);
    }
}
