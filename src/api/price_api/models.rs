use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body some backend routes send alongside a failure status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}

/// Comprehensive error type for backend and geolocation calls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// 400 Bad Request
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// 404 Not Found
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited. Retry after {retry_after:?} s")]
    RateLimited { retry_after: Option<u64> },
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Other HTTP errors
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// No response within the configured timeout
    #[error("Timed out after {0} ms")]
    Timeout(u64),
    /// Deserialization error
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
    /// The capability is not available in this environment
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Whether a second attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited { .. }
                | ApiError::ServerError(..)
                | ApiError::RequestError(_)
                | ApiError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiError::ServerError(502, "bad gateway".into()).is_retryable());
        assert!(ApiError::Timeout(100).is_retryable());
        assert!(!ApiError::NotFound("no such barcode".into()).is_retryable());
        assert!(!ApiError::DeserializationError("eof".into()).is_retryable());
    }
}
