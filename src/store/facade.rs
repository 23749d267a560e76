//! Store Module
//!
//! Single entry point combining the TTL cache and the request aggregator over
//! a pluggable [`StateBackend`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::aggregator::RequestAggregator;
use crate::store::backend::{MemoryBackend, StateBackend};
use crate::store::cache::TtlPolicy;
use crate::store::clock::{Clock, SystemClock};
use crate::store::options::RequestOptions;
use crate::store::stats::CacheStats;

/// Future returned by [`Store::get_data`].
pub type DataFuture<T, E> = BoxFuture<'static, Result<T, StoreError<E>>>;

/// Everything guarded by the store lock.
#[derive(Debug)]
struct State<B> {
    backend: B,
    aggregator: RequestAggregator,
    stats: CacheStats,
}

// == Store ==
/// Response cache with request aggregation.
///
/// One store is meant per resource type. Cloning is cheap and clones share
/// state. The lock is only held for short synchronous sections and never
/// across an `.await` or a call into user code.
pub struct Store<T, E, B = MemoryBackend<T, E>> {
    state: Arc<Mutex<State<B>>>,
    ttl: TtlPolicy,
    clock: Arc<dyn Clock>,
    _payload: PhantomData<fn() -> (T, E)>,
}

impl<T, E, B> Clone for Store<T, E, B> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
            _payload: PhantomData,
        }
    }
}

impl<T, E, B> std::fmt::Debug for Store<T, E, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("cache_duration", &self.ttl.cache_duration())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<T, E, B> Store<T, E, B> {
    fn lock(&self) -> MutexGuard<'_, State<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Default TTL in seconds (`Some(0)` disables caching, `None` never expires).
    pub fn cache_duration(&self) -> Option<u64> {
        self.ttl.cache_duration()
    }
}

impl<T, E> Store<T, E, MemoryBackend<T, E>>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an in-memory store.
    ///
    /// # Arguments
    /// * `cache_duration` - TTL in seconds; `Some(0)` disables caching,
    ///   `None` keeps entries forever
    pub fn new(cache_duration: Option<u64>) -> Self {
        Self::with_backend(cache_duration, MemoryBackend::new())
    }
}

impl<T, E, B> Store<T, E, B>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    B: StateBackend<T, E>,
{
    /// Creates a store keeping its state in `backend`.
    pub fn with_backend(cache_duration: Option<u64>, backend: B) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                backend,
                aggregator: RequestAggregator::new(),
                stats: CacheStats::new(),
            })),
            ttl: TtlPolicy::new(cache_duration),
            clock: Arc::new(SystemClock),
            _payload: PhantomData,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    // == Get Data ==
    /// Returns the value for `options.key`, from cache, from a request already
    /// in flight, or by calling `send_request`.
    ///
    /// The lookup and the in-flight registration happen now, before this
    /// returns, so two back-to-back calls for one key always share a request.
    /// A launched request runs on its own tokio task and settles even if every
    /// caller drops its future; it must therefore be called inside a tokio
    /// runtime.
    ///
    /// On success the result is cached (unless `no_cache`); on failure nothing
    /// is cached and every attached caller receives
    /// [`StoreError::Request`] with the original error.
    pub fn get_data<F, Fut>(&self, options: RequestOptions, send_request: F) -> DataFuture<T, E>
    where
        F: FnOnce(&RequestOptions) -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let outcome: DataFuture<T, E> = receiver
            .map(|received| received.unwrap_or_else(|_| Err(StoreError::Aborted)))
            .boxed();

        let (waiter, registration) = {
            let mut guard = self.lock();
            let state = &mut *guard;

            if options.reads_cache() {
                let now = self.clock.now_ms();
                if let Some(data) = self.ttl.read(&state.backend, &options.key, now) {
                    state.stats.record_hit();
                    debug!(key = %options.key, "cache hit");
                    return future::ready(Ok(data)).boxed();
                }
                state.stats.record_miss();
            }

            if options.aggregates() {
                if let Some(request) = state.aggregator.attach(&state.backend, &options.key) {
                    state.stats.record_aggregated();
                    debug!(key = %options.key, "joined request in flight");
                    return request.boxed();
                }
            }

            state.stats.record_request();
            if options.aggregates() {
                let shared = outcome.shared();
                let id = state
                    .aggregator
                    .register(&mut state.backend, &options.key, shared.clone());
                (shared.boxed(), Some(id))
            } else {
                (outcome, None)
            }
        };

        debug!(
            key = %options.key,
            aggregated = registration.is_some(),
            "launching request"
        );

        let settlement = Settlement {
            store: self.clone(),
            key: options.key.clone(),
            registration,
            write_cache: options.writes_cache(),
            sender: Some(sender),
            settled: false,
        };

        // A panic here drops the settlement, which releases the slot
        let request = send_request(&options);
        tokio::spawn(async move {
            let result = request.await;
            settlement.settle(result);
        });

        waiter
    }

    // == Clean ==
    /// Removes expired cache entries. In-flight requests are untouched.
    ///
    /// Returns the number of entries removed.
    pub fn clean(&self) -> usize {
        let now = self.clock.now_ms();
        let mut guard = self.lock();
        let state = &mut *guard;

        let removed = self.ttl.clean(&mut state.backend, now);
        state.stats.record_cleaned(removed);
        removed
    }

    // == Clear ==
    /// Empties both the cache and the in-flight map.
    ///
    /// Requests still running are not aborted; their callers still receive the
    /// result, and a successful one is still written to the cache.
    pub fn clear(&self) {
        self.lock().backend.clear();
        debug!("store cleared");
    }

    // == Invalidate ==
    /// Drops the cached entry for `key`, returning whether one existed.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().backend.remove_entry(key)
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.backend.entry_count();
        stats.pending_requests = state.backend.pending_count();
        stats
    }

    /// Number of stored entries, valid or not.
    pub fn cached_len(&self) -> usize {
        self.lock().backend.entry_count()
    }

    /// Number of requests in flight.
    pub fn pending_len(&self) -> usize {
        self.lock().backend.pending_count()
    }
}

// == Settlement ==
/// Completes a launched request: cache write, slot release, delivery.
///
/// If dropped before [`settle`](Self::settle) runs (the request panicked),
/// the slot is still released and waiters observe [`StoreError::Aborted`].
struct Settlement<T, E, B>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    B: StateBackend<T, E>,
{
    store: Store<T, E, B>,
    key: String,
    registration: Option<u64>,
    write_cache: bool,
    sender: Option<oneshot::Sender<Result<T, StoreError<E>>>>,
    settled: bool,
}

impl<T, E, B> Settlement<T, E, B>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    B: StateBackend<T, E>,
{
    fn settle(mut self, result: Result<T, E>) {
        let outcome = result.map_err(StoreError::Request);
        {
            let mut guard = self.store.lock();
            let state = &mut *guard;

            match &outcome {
                Ok(data) if self.write_cache => {
                    let now = self.store.clock.now_ms();
                    self.store
                        .ttl
                        .write(&mut state.backend, &self.key, data.clone(), now);
                }
                Ok(_) => {}
                Err(_) => state.stats.record_failure(),
            }

            if let Some(id) = self.registration {
                state.aggregator.release(&mut state.backend, &self.key, id);
            }
        }
        self.settled = true;

        match &outcome {
            Ok(_) => debug!(key = %self.key, "request settled"),
            Err(_) => warn!(key = %self.key, "request failed"),
        }

        if let Some(sender) = self.sender.take() {
            // Every waiter may have gone away
            let _ = sender.send(outcome);
        }
    }
}

impl<T, E, B> Drop for Settlement<T, E, B>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    B: StateBackend<T, E>,
{
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        {
            let mut guard = self.store.lock();
            let state = &mut *guard;
            state.stats.record_failure();
            if let Some(id) = self.registration {
                state.aggregator.release(&mut state.backend, &self.key, id);
            }
        }
        warn!(key = %self.key, "request aborted before settling");
        // Dropping the sender now resolves waiters with `StoreError::Aborted`
        drop(self.sender.take());
    }
}
