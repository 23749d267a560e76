//! Per-call options for [`Store::get_data`](crate::store::Store::get_data).

use serde::{Deserialize, Serialize};

/// Identity and cache behavior of one `get_data` call.
///
/// The key is compared by exact string equality. Callers must encode every
/// parameter affecting the result into it, see [`crate::keys::request_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Cache and aggregation identity
    pub key: String,
    /// Skip both reading and writing the cache (aggregation still applies)
    #[serde(default)]
    pub no_cache: bool,
    /// Always issue a fresh call instead of joining one in flight
    #[serde(default)]
    pub no_request_aggregation: bool,
    /// Skip reading the cache but still write the fresh result
    #[serde(default)]
    pub refresh_cache: bool,
}

impl RequestOptions {
    // == Constructor ==
    /// Creates options for `key` with caching and aggregation enabled.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    // == Builders ==
    /// Sets [`no_cache`](Self::no_cache).
    pub fn no_cache(mut self, enabled: bool) -> Self {
        self.no_cache = enabled;
        self
    }

    /// Sets [`no_request_aggregation`](Self::no_request_aggregation).
    pub fn no_request_aggregation(mut self, enabled: bool) -> Self {
        self.no_request_aggregation = enabled;
        self
    }

    /// Sets [`refresh_cache`](Self::refresh_cache).
    pub fn refresh_cache(mut self, enabled: bool) -> Self {
        self.refresh_cache = enabled;
        self
    }

    // == Derived Flags ==
    /// Whether a valid cached value may answer this call.
    pub fn reads_cache(&self) -> bool {
        !self.no_cache && !self.refresh_cache
    }

    /// Whether the fresh result is stored.
    pub fn writes_cache(&self) -> bool {
        !self.no_cache
    }

    /// Whether this call joins, and registers, in-flight requests.
    pub fn aggregates(&self) -> bool {
        !self.no_request_aggregation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_read_write_and_aggregate() {
        let options = RequestOptions::new("a");

        assert_eq!(options.key, "a");
        assert!(options.reads_cache());
        assert!(options.writes_cache());
        assert!(options.aggregates());
    }

    #[test]
    fn test_refresh_skips_read_only() {
        let options = RequestOptions::new("a").refresh_cache(true);

        assert!(!options.reads_cache());
        assert!(options.writes_cache());
    }

    #[test]
    fn test_no_cache_skips_read_and_write() {
        let options = RequestOptions::new("a").no_cache(true);

        assert!(!options.reads_cache());
        assert!(!options.writes_cache());
        assert!(options.aggregates());
    }

    #[test]
    fn test_deserialize_with_missing_flags() {
        let options: RequestOptions =
            serde_json::from_str(r#"{"key":"a","refresh_cache":true}"#).unwrap();

        assert_eq!(options, RequestOptions::new("a").refresh_cache(true));
    }
}
