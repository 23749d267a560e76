//! Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::{StateBackend, Store};

/// Spawns a background task that periodically calls [`Store::clean`].
///
/// The store itself never sweeps on read or write; expired entries are only
/// dropped here or by explicit `clean()` calls.
///
/// # Arguments
/// * `store` - Handle on the store to sweep
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let store: Store<Value, FetchError> = Store::new(Some(60));
/// let cleanup_handle = spawn_cleanup_task(store.clone(), 30);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<T, E, B>(store: Store<T, E, B>, cleanup_interval_secs: u64) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    B: StateBackend<T, E>,
{
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.clean();
            if removed > 0 {
                info!("Cache cleanup: removed {} expired entries", removed);
            } else {
                debug!("Cache cleanup: no expired entries found");
            }
        }
    })
}
