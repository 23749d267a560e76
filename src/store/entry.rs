//! Cache Entry Module
//!
//! Defines cached payloads with their expiry and the in-flight request slots.

use futures::future::{BoxFuture, Shared};

use crate::error::StoreError;

/// Cloneable handle on a request that has been launched but not yet settled.
///
/// Every caller attached to the same key awaits a clone of this future and
/// observes the identical outcome.
pub type InFlight<T, E> = Shared<BoxFuture<'static, Result<T, StoreError<E>>>>;

// == Cache Entry ==
/// A cached payload with its absolute expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The cached payload, opaque to the store
    pub data: T,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry expiring at `expires_at`.
    pub fn new(data: T, expires_at: Option<u64>) -> Self {
        Self { data, expires_at }
    }

    // == Is Valid ==
    /// Checks whether the entry may still be served at `now_ms`.
    ///
    /// An entry expiring exactly at `now_ms` is already stale.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms < expires,
            None => true,
        }
    }
}

// == Pending Request ==
/// An in-flight request registered for a key.
pub struct PendingRequest<T, E> {
    /// Registration identity, used to release only the slot this request owns
    pub id: u64,
    /// Shared handle every attached caller awaits
    pub request: InFlight<T, E>,
}

impl<T, E> Clone for PendingRequest<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            request: self.request.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for PendingRequest<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
