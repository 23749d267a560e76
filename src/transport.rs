//! HTTP Transport Module
//!
//! JSON GET requests over reqwest, usable as a request callback for the store.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

// == HTTP Transport ==
/// Issues GET requests and decodes JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    // == Get JSON ==
    /// Fetches `url` with `filters` encoded as query parameters.
    ///
    /// Non-success statuses are reported as [`FetchError::Status`].
    pub async fn get_json(&self, url: &str, filters: &Value) -> Result<Value, FetchError> {
        let query = query_pairs(filters);
        debug!(url, params = query.len(), "GET");

        let response = self.client.get(url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Flattens a filter object into query parameters.
///
/// Strings are sent as-is, other scalars in their JSON form, and arrays as one
/// parameter per item. Nested objects are sent as JSON text. Anything other
/// than an object produces no parameters.
pub fn query_pairs(filters: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = filters else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for (name, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    pairs.push((name.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((name.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
