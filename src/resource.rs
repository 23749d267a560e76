//! Resource Client Module
//!
//! Owns the store of one REST resource and turns paths plus filters into
//! cached, aggregated GET requests.

use serde_json::Value;

use crate::config::Config;
use crate::error::FetchError;
use crate::keys::request_key;
use crate::store::{DataFuture, RequestOptions, Store};
use crate::transport::HttpTransport;

// == Resource Client ==
/// Cached access to the resources under one base URL.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: String,
    transport: HttpTransport,
    store: Store<Value, FetchError>,
}

impl ResourceClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: HttpTransport,
        store: Store<Value, FetchError>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
            store,
        }
    }

    /// Creates a client with an in-memory store configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(
            config.base_url.clone(),
            transport,
            Store::new(config.cache_duration),
        ))
    }

    /// The store backing this client.
    pub fn store(&self) -> &Store<Value, FetchError> {
        &self.store
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    // == Fetch ==
    /// Fetches `path`, served from cache while fresh.
    pub fn fetch(&self, path: &str, filters: &Value) -> DataFuture<Value, FetchError> {
        self.request(path, filters, |options| options)
    }

    /// Fetches `path` live and replaces the cached value.
    pub fn refresh(&self, path: &str, filters: &Value) -> DataFuture<Value, FetchError> {
        self.request(path, filters, |options| options.refresh_cache(true))
    }

    /// Fetches `path` live without touching the cache.
    pub fn fetch_uncached(&self, path: &str, filters: &Value) -> DataFuture<Value, FetchError> {
        self.request(path, filters, |options| options.no_cache(true))
    }

    fn request(
        &self,
        path: &str,
        filters: &Value,
        configure: impl FnOnce(RequestOptions) -> RequestOptions,
    ) -> DataFuture<Value, FetchError> {
        let url = self.url(path);
        let options = configure(RequestOptions::new(request_key(&url, filters)));
        let transport = self.transport.clone();
        let filters = filters.clone();

        self.store.get_data(options, move |_| async move {
            transport.get_json(&url, &filters).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base_url: &str) -> ResourceClient {
        ResourceClient::new(
            base_url,
            HttpTransport::new(Duration::from_secs(1)).unwrap(),
            Store::new(Some(60)),
        )
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let client = client("http://localhost:3000/api/");

        assert_eq!(client.url("/users/"), "http://localhost:3000/api/users/");
        assert_eq!(client.url("users/1"), "http://localhost:3000/api/users/1");
    }

    #[test]
    fn test_absolute_url_passes_through() {
        let client = client("http://localhost:3000");

        assert_eq!(
            client.url("https://example.com/items"),
            "https://example.com/items"
        );
    }

    #[test]
    fn test_from_config_uses_cache_duration() {
        let config = Config {
            cache_duration: Some(5),
            ..Config::default()
        };

        let client = ResourceClient::from_config(&config).unwrap();
        assert_eq!(client.store().cache_duration(), Some(5));
    }
}
