//! Error types for the resource cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error ==
/// Error delivered by [`Store::get_data`](crate::store::Store::get_data).
///
/// Every caller attached to the same in-flight request receives a clone of the
/// same error, so the request error type must be `Clone`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError<E> {
    /// The request callback failed; the error is passed through untouched.
    ///
    /// The wrapper only exists to add [`Aborted`](Self::Aborted). Callers that
    /// want their own error type back use
    /// [`into_request_error`](Self::into_request_error).
    #[error("request failed: {0}")]
    Request(E),

    /// The request task ended without producing a result (it panicked)
    #[error("request aborted before settling")]
    Aborted,
}

impl<E> StoreError<E> {
    /// Returns the callback error, if this is one.
    pub fn request_error(&self) -> Option<&E> {
        match self {
            StoreError::Request(err) => Some(err),
            StoreError::Aborted => None,
        }
    }

    /// Consumes the error and returns the callback error, if this is one.
    pub fn into_request_error(self) -> Option<E> {
        match self {
            StoreError::Request(err) => Some(err),
            StoreError::Aborted => None,
        }
    }
}

// == Fetch Error ==
/// Errors raised by the HTTP transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, timeout or request building failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Response body was not valid JSON
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for resource fetches.
pub type Result<T> = std::result::Result<T, StoreError<FetchError>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_passes_through() {
        let err: StoreError<&str> = StoreError::Request("boom");
        assert_eq!(err.request_error(), Some(&"boom"));
        assert_eq!(err.to_string(), "request failed: boom");
        assert_eq!(err.into_request_error(), Some("boom"));
    }

    #[test]
    fn test_caller_recovers_own_error_type() {
        #[derive(Debug, Clone, PartialEq)]
        struct ApiError {
            code: u16,
        }

        let err: StoreError<ApiError> = StoreError::Request(ApiError { code: 503 });
        let recovered: Option<ApiError> = err.into_request_error();

        assert_eq!(recovered, Some(ApiError { code: 503 }));
    }

    #[test]
    fn test_aborted_has_no_request_error() {
        let err: StoreError<String> = StoreError::Aborted;
        assert!(err.request_error().is_none());
        assert!(err.into_request_error().is_none());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            status: 404,
            url: "http://localhost/items".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected status 404 from http://localhost/items"
        );
    }
}
