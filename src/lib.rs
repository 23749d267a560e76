//! Resource Cache - client-side data access for REST resources
//!
//! Caches fetched responses with a TTL and collapses concurrent requests for
//! the same key into a single call.

pub mod config;
pub mod error;
pub mod keys;
pub mod resource;
pub mod store;
pub mod tasks;
pub mod transport;

pub use config::Config;
pub use error::{FetchError, StoreError};
pub use resource::ResourceClient;
pub use store::{RequestOptions, Store};
pub use tasks::spawn_cleanup_task;
