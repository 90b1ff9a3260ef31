//! `FetchError` - failures surfaced by the TMDB gateway.

use thiserror::Error;

/// HTTP status TMDB returns for a missing or invalid credential.
const UNAUTHORIZED: u16 = 401;

/// Error returned by every gateway call.
///
/// The gateway never retries; callers decide how to present the failure.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum FetchError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("request to TMDB failed: {path}")]
    Network {
        /// Endpoint path relative to the API base URL.
        path: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// TMDB answered with a non-2xx status, or with a 2xx body that does not
    /// have the expected shape (`status` is `None` in that case).
    #[error("TMDB API error: {message}")]
    Upstream {
        /// HTTP status code, when the failure came from a non-2xx response.
        status: Option<u16>,
        /// Human-readable description including TMDB's own status message.
        message: String,
    },

    /// The endpoint path could not be joined onto the base URL.
    #[error("invalid TMDB endpoint path: {path}")]
    InvalidUrl {
        /// Endpoint path relative to the API base URL.
        path: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    /// Builds an upstream error for a non-2xx response.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Builds an upstream error for a body that could not be normalized.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::Network { .. } | Self::InvalidUrl { .. } => None,
        }
    }

    /// Whether TMDB rejected the credential (HTTP 401).
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_detected() {
        // Arrange
        let err = FetchError::http(401, "HTTP 401 Unauthorized: code=7, message=Invalid API key");

        // Act & Assert
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_other_status_is_not_unauthorized() {
        // Arrange
        let err = FetchError::http(404, "HTTP 404 Not Found");

        // Act & Assert
        assert!(!err.is_unauthorized());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_malformed_has_no_status() {
        // Arrange
        let err = FetchError::malformed("response has no results array");

        // Act & Assert
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
        assert!(err.to_string().contains("no results array"));
    }
}
