//! Error types for Imgur API calls.

use thiserror::Error;

use crate::download::{
    FailureType, RetryableError, classify_http_status, classify_network_error,
};

/// Errors returned by [`AlbumSource`](super::AlbumSource) implementations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The client could not be configured (empty client id, bad base URL, TLS init).
    #[error("invalid API client configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// Transport failure before an HTTP status was received.
    #[error("network error calling {url}: {source}")]
    Network {
        /// Request URL.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out.
    #[error("timeout calling {url}")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} from {url}{}", message_suffix(.message.as_deref()))]
    HttpStatus {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error text from the response body, when present.
        message: Option<String>,
        /// `Retry-After` header value, when present.
        retry_after: Option<String>,
    },

    /// 2xx response whose envelope reports `success: false` or a non-200 status.
    #[error("request to {url} rejected by the service (status {status})")]
    Rejected {
        /// Request URL.
        url: String,
        /// Status reported inside the envelope.
        status: u16,
    },

    /// Body did not match the expected JSON shape.
    #[error("unexpected response from {url}: {source}")]
    Decode {
        /// Request URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

fn message_suffix(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

impl ApiError {
    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a network error, promoting reqwest timeouts to [`ApiError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Returns the HTTP or envelope status, when the error carries one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns whether the service refused the client id.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        self.failure_type() == FailureType::NeedsAuth
    }
}

impl RetryableError for ApiError {
    fn failure_type(&self) -> FailureType {
        match self {
            Self::HttpStatus { status, .. } => classify_http_status(*status),
            Self::Timeout { .. } => FailureType::Transient,
            Self::Network { source, .. } => classify_network_error(source),
            // An envelope failure inside a 2xx response is treated like the status it reports.
            Self::Rejected { status, .. } => match classify_http_status(*status) {
                FailureType::NeedsAuth => FailureType::NeedsAuth,
                _ => FailureType::Permanent,
            },
            Self::InvalidConfig { .. } | Self::Decode { .. } => FailureType::Permanent,
        }
    }

    fn retry_after(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { retry_after, .. } => retry_after.as_deref(),
            _ => None,
        }
    }
}
