//! Request Aggregator Module
//!
//! Tracks in-flight requests per key so concurrent callers share one call.

use crate::store::backend::StateBackend;
use crate::store::entry::{InFlight, PendingRequest};

// == Request Aggregator ==
/// Hands out registration ids and manages the in-flight slots of a backend.
#[derive(Debug, Default)]
pub struct RequestAggregator {
    next_id: u64,
}

impl RequestAggregator {
    // == Constructor ==
    /// Creates an aggregator whose first registration gets id 1.
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    // == Attach ==
    /// Returns the request in flight for `key`, if any.
    pub fn attach<T, E, B>(&self, backend: &B, key: &str) -> Option<InFlight<T, E>>
    where
        B: StateBackend<T, E> + ?Sized,
    {
        backend.pending(key).map(|pending| pending.request.clone())
    }

    // == Register ==
    /// Records `request` as the in-flight request for `key`.
    ///
    /// Overwrites any previous registration. Returns the id to release with.
    pub fn register<T, E, B>(&mut self, backend: &mut B, key: &str, request: InFlight<T, E>) -> u64
    where
        B: StateBackend<T, E> + ?Sized,
    {
        self.next_id += 1;
        let id = self.next_id;
        backend.insert_pending(key, PendingRequest { id, request });
        id
    }

    // == Release ==
    /// Removes the in-flight slot for `key` if it still belongs to `id`.
    ///
    /// A slot replaced after [`Store::clear`](crate::store::Store::clear) is
    /// left alone. Returns whether a slot was removed.
    pub fn release<T, E, B>(&self, backend: &mut B, key: &str, id: u64) -> bool
    where
        B: StateBackend<T, E> + ?Sized,
    {
        match backend.pending(key) {
            Some(pending) if pending.id == id => backend.remove_pending(key).is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::backend::MemoryBackend;
    use futures::FutureExt;

    type Backend = MemoryBackend<u32, String>;

    fn request(value: u32) -> InFlight<u32, String> {
        futures::future::ready(Ok(value)).boxed().shared()
    }

    #[tokio::test]
    async fn test_attach_returns_registered_request() {
        let mut aggregator = RequestAggregator::new();
        let mut backend = Backend::new();

        assert!(aggregator.attach(&backend, "a").is_none());

        aggregator.register(&mut backend, "a", request(7));

        let attached = aggregator.attach(&backend, "a").unwrap();
        assert_eq!(attached.await, Ok(7));
    }

    #[test]
    fn test_release_removes_slot() {
        let mut aggregator = RequestAggregator::new();
        let mut backend = Backend::new();
        let id = aggregator.register(&mut backend, "a", request(1));

        assert!(aggregator.release(&mut backend, "a", id));
        assert!(aggregator.attach(&backend, "a").is_none());
        assert!(!aggregator.release(&mut backend, "a", id));
    }

    #[test]
    fn test_release_ignores_newer_registration() {
        let mut aggregator = RequestAggregator::new();
        let mut backend = Backend::new();
        let old_id = aggregator.register(&mut backend, "a", request(1));
        let new_id = aggregator.register(&mut backend, "a", request(2));

        assert_ne!(old_id, new_id);
        assert!(!aggregator.release(&mut backend, "a", old_id));
        assert_eq!(backend.pending("a").map(|p| p.id), Some(new_id));
    }
}
