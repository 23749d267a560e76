//! Resource Cache - fetch REST resources through a shared cache
//!
//! Usage: `resource_cache <path>...`
//!
//! Every path is fetched concurrently through one store, so repeated paths are
//! served by a single request. Bodies are printed as JSON followed by the
//! store statistics.

use anyhow::{bail, Context};
use futures::future::join_all;
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resource_cache::{spawn_cleanup_task, Config, ResourceClient};

/// Main entry point for the resource cache client.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the resource client and its store
/// 4. Start background cache cleanup task
/// 5. Fetch every requested path and print the results
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resource_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        bail!("usage: resource_cache <path>...");
    }

    let config = Config::from_env();
    info!(
        "Configuration loaded: base_url={}, cache_duration={:?}, cleanup_interval={}s, request_timeout={}s",
        config.base_url, config.cache_duration, config.cleanup_interval, config.request_timeout
    );

    let client = ResourceClient::from_config(&config).context("failed to build HTTP client")?;
    let cleanup_handle = spawn_cleanup_task(client.store().clone(), config.cleanup_interval);

    let requests: Vec<_> = paths
        .iter()
        .map(|path| client.fetch(path, &Value::Null))
        .collect();
    let results = join_all(requests).await;

    let mut failures = 0;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(body) => {
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Err(err) => {
                failures += 1;
                warn!("{}: {}", path, err);
            }
        }
    }

    cleanup_handle.abort();

    let stats = client.store().stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    if failures > 0 {
        bail!("{} of {} requests failed", failures, paths.len());
    }
    Ok(())
}
