//! Store Module
//!
//! Response cache with TTL expiry and request aggregation over a pluggable
//! state backend.

mod aggregator;
mod backend;
mod cache;
mod clock;
mod entry;
mod facade;
mod options;
mod reactive;
mod stats;


// Re-export public types
pub use aggregator::RequestAggregator;
pub use backend::{MemoryBackend, StateBackend};
pub use cache::TtlPolicy;
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, InFlight, PendingRequest};
pub use facade::{DataFuture, Store};
pub use options::RequestOptions;
pub use reactive::{Mutation, ReactiveBackend, DEFAULT_CHANNEL_CAPACITY};
pub use stats::CacheStats;
