//! Error taxonomy for the dispatch core.
//!
//! # Design
//! Every failure a caller can observe is one `ApiError` variant, and each
//! variant carries enough context (endpoint name, status code, raw body,
//! underlying cause) for a retry policy or UI layer to decide what to do.
//! The dispatcher itself never retries; [`ApiError::is_retryable`] is the
//! single place that encodes which classes a caller may reattempt.

use std::time::Duration;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors delivered through a [`crate::CallHandle`] or raised while loading
/// the endpoint catalogue.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A descriptor or the client configuration is unusable. Detected before
    /// any request is sent.
    #[error("invalid configuration for '{endpoint}': {message}")]
    Configuration { endpoint: String, message: String },

    /// A call-site argument is missing, unknown, or of the wrong kind.
    #[error("cannot encode request for '{endpoint}': {message}")]
    Encoding { endpoint: String, message: String },

    /// The authentication hook could not produce headers.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network-level failure reported by the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No response arrived within the per-call timeout.
    #[error("'{endpoint}' timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },

    /// 4xx response. The request itself is at fault.
    #[error("HTTP {status}: {body}")]
    Client { status: u16, body: String },

    /// 5xx response.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body does not match the declared shape.
    #[error("cannot decode response of '{endpoint}': {message}")]
    Decoding { endpoint: String, message: String },

    /// The handle was polled after its call had been cancelled.
    #[error("call was cancelled")]
    Cancelled,
}

impl ApiError {
    pub(crate) fn encoding(endpoint: &str, message: impl Into<String>) -> Self {
        ApiError::Encoding {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn decoding(endpoint: &str, message: impl Into<String>) -> Self {
        ApiError::Decoding {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn configuration(endpoint: &str, message: impl Into<String>) -> Self {
        ApiError::Configuration {
            endpoint: endpoint.to_string(),
            message: message.into(),
        }
    }

    /// Whether a caller-side retry policy may reattempt the call.
    ///
    /// Transport failures, timeouts and 5xx responses are transient; every
    /// other class indicates a fault that repeating the request cannot fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::Timeout { .. } | ApiError::Server { .. }
        )
    }

    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;

    #[test]
    fn retry_classes_follow_taxonomy() {
        let transport = ApiError::from(TransportError::new(TransportErrorKind::Connect, "refused"));
        let timeout = ApiError::Timeout {
            endpoint: "get_event".to_string(),
            after: Duration::from_secs(1),
        };
        let server = ApiError::Server {
            status: 503,
            body: String::new(),
        };
        assert!(transport.is_retryable());
        assert!(timeout.is_retryable());
        assert!(server.is_retryable());

        let client = ApiError::Client {
            status: 400,
            body: String::new(),
        };
        assert!(!client.is_retryable());
        assert!(!ApiError::Auth("no token".to_string()).is_retryable());
        assert!(!ApiError::decoding("get_event", "empty body").is_retryable());
        assert!(!ApiError::encoding("get_event", "missing id").is_retryable());
    }

    #[test]
    fn not_found_is_a_client_error() {
        let err = ApiError::Client {
            status: 404,
            body: "{}".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: {}");
    }
}
