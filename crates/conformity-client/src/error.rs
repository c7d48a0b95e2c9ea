//! Error types for Conformity API operations.

use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiClientError>;

/// Errors from Conformity API operations.
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Resource conflict (409), e.g. duplicate create.
    #[error("Resource conflict: {0}")]
    Conflict(String),

    /// Rate limited by the API (429).
    #[error("Rate limited by API{}", .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Authentication failure (401/403).
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Any other API-level error, carrying the HTTP status.
    #[error("API error (HTTP {status}): {detail}")]
    ApiError { status: u16, detail: String },

    /// Request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Endpoint unreachable (DNS, connect, TLS).
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    /// Underlying HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Client misconfiguration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// All retry attempts exhausted.
    #[error("Max retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

impl ApiClientError {
    /// Whether this error is transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Unreachable(_) | Self::Http(_)
        )
    }

    /// Whether this is a server-side (5xx) error.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

impl From<conformity_api::ModelError> for ApiClientError {
    fn from(error: conformity_api::ModelError) -> Self {
        Self::ParseError(error.to_string())
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::Unreachable(error.to_string())
        } else {
            Self::Http(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ApiClientError::RateLimited {
            retry_after_secs: Some(5)
        }
        .is_retryable());
        assert!(ApiClientError::Timeout("t".into()).is_retryable());
        assert!(ApiClientError::Unreachable("u".into()).is_retryable());
        assert!(!ApiClientError::NotFound("x".into()).is_retryable());
        assert!(!ApiClientError::AuthError("denied".into()).is_retryable());
    }

    #[test]
    fn test_server_error_classification() {
        let e503 = ApiClientError::ApiError {
            status: 503,
            detail: "unavailable".into(),
        };
        let e400 = ApiClientError::ApiError {
            status: 400,
            detail: "bad".into(),
        };
        assert!(e503.is_server_error());
        assert!(!e400.is_server_error());
        assert!(!e503.is_retryable()); // retried via is_server_error, not is_retryable
    }
}
