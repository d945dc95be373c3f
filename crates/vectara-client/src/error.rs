//! Error types for the client library.

use reqwest_retry::RetryError;
use thiserror::Error;

use vectara_common::ConfigError;

/// Errors that can occur while talking to the Vectara API.
///
/// Each phase of a session fails with its own variant: token exchange
/// ([`AuthenticationError`](Self::AuthenticationError)), corpus resolution
/// ([`AmbiguousCorpusError`](Self::AmbiguousCorpusError)), any non-success
/// HTTP status ([`RemoteError`](Self::RemoteError)) and rejected documents
/// ([`IndexError`](Self::IndexError)).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Network or HTTP request failure.
    ///
    /// Indicates issues like DNS resolution, connection failures, or socket errors.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Middleware layer error.
    ///
    /// Errors raised by the middleware stack that are not client errors.
    #[error("Middleware error: {0}")]
    MiddlewareError(reqwest_middleware::Error),

    /// JSON serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The identity exchange failed or did not return a usable token.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// More than one remote corpus carries the configured name.
    #[error("Multiple corpora exist with name {corpus_name} ({matches} matches)")]
    AmbiguousCorpusError {
        /// The duplicated corpus name.
        corpus_name: String,
        /// Number of corpora found with that name.
        matches: usize,
    },

    /// An API endpoint answered with a non-success HTTP status.
    #[error("Remote error from {endpoint}: HTTP {status}: {body}")]
    RemoteError {
        /// The API endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The corpus acknowledged a document but did not accept it.
    #[error("Failed to index document {document_id}: {code}: {detail}")]
    IndexError {
        /// Id of the rejected document.
        document_id: String,
        /// Status code reported by the corpus.
        code: String,
        /// Status detail reported by the corpus.
        detail: String,
    },

    /// Client configuration issue.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Unexpected or malformed API response.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for ClientError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => Self::NetworkError(err),
            reqwest_middleware::Error::Middleware(inner) => {
                // The retry layer wraps whatever the inner attempt returned
                let inner = match inner.downcast::<RetryError>() {
                    Ok(RetryError::WithRetries { err, .. } | RetryError::Error(err)) => {
                        return err.into();
                    }
                    Err(inner) => inner,
                };
                match inner.downcast::<Self>() {
                    Ok(client_error) => client_error,
                    Err(inner) => {
                        Self::MiddlewareError(reqwest_middleware::Error::Middleware(inner))
                    }
                }
            }
        }
    }
}

impl ClientError {
    /// Check if this error is potentially retryable.
    ///
    /// Returns `true` for network errors and for 429 or 5xx statuses.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::MiddlewareError(_) => true,
            Self::RemoteError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Check if this is an authentication error.
    pub const fn is_authentication_error(&self) -> bool {
        matches!(self, Self::AuthenticationError(_))
    }

    /// The HTTP status carried by a [`RemoteError`](Self::RemoteError).
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16) -> ClientError {
        ClientError::RemoteError {
            endpoint: "index".to_string(),
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(remote(429).is_retryable());
        assert!(remote(503).is_retryable());
        assert!(!remote(400).is_retryable());
        assert!(!remote(404).is_retryable());
        assert!(!ClientError::AuthenticationError("nope".to_string()).is_retryable());
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(remote(404).status(), Some(404));
        assert_eq!(ClientError::InvalidResponse("x".to_string()).status(), None);
    }

    #[test]
    fn test_middleware_error_keeps_client_variant() {
        let err: ClientError = reqwest_middleware::Error::middleware(
            ClientError::AuthenticationError("expired".to_string()),
        )
        .into();
        assert!(err.is_authentication_error());

        let retried = RetryError::WithRetries {
            retries: 2,
            err: reqwest_middleware::Error::middleware(ClientError::AuthenticationError(
                "expired".to_string(),
            )),
        };
        let err: ClientError = reqwest_middleware::Error::middleware(retried).into();
        assert!(err.is_authentication_error());

        let err: ClientError =
            reqwest_middleware::Error::middleware(std::io::Error::other("boom")).into();
        assert!(matches!(err, ClientError::MiddlewareError(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_ambiguous_message_names_corpus() {
        let err = ClientError::AmbiguousCorpusError {
            corpus_name: "docs".to_string(),
            matches: 2,
        };
        assert!(err.to_string().contains("docs"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: ClientError = ConfigError::MissingField("customer_id").into();
        assert!(matches!(err, ClientError::ConfigurationError(msg) if msg.contains("customer_id")));
    }
}
