use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL of the Vectara REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.vectara.io/v1";

/// Request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Errors raised while validating a [`Config`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required field is empty.
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    /// An endpoint override is not a valid absolute URL.
    #[error("{field} is not a valid URL: {message}")]
    InvalidUrl {
        /// The offending configuration field.
        field: &'static str,
        /// Parser message.
        message: String,
    },
}

/// OAuth2 client-credentials used to obtain bearer tokens.
///
/// The secret is held in a [`SecretString`] so it is redacted from `Debug`
/// output and never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Credentials {
    /// OAuth2 application client id.
    pub client_id: String,
    /// OAuth2 application client secret.
    #[serde(skip_serializing)]
    pub client_secret: SecretString,
}

impl OAuth2Credentials {
    /// Creates a credential pair.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into().into()),
        }
    }
}

/// Configuration for retry behavior with exponential backoff.
///
/// Applied to every API call made through the gateway. Token exchanges are
/// never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts before failing.
    pub max_retries: u32,
    /// Initial delay before the first retry attempt.
    pub initial_delay: Duration,
    /// Maximum delay between retry attempts (caps exponential growth).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    /// A policy that attempts every call exactly once.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Session configuration for one client instance.
///
/// Re-derived on every construction; nothing here is persisted by the client.
///
/// # Examples
///
/// ```
/// use vectara_common::Config;
///
/// let config = Config::new("1234567", "airbyte-docs", "client-id", "client-secret")
///     .with_timeout(10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vectara customer (tenant) identifier.
    pub customer_id: String,
    /// Name of the corpus to resolve or create.
    pub corpus_name: String,
    /// Client-credentials for the identity endpoint.
    pub oauth2: OAuth2Credentials,
    /// Override for the API base URL.
    pub api_base_url: Option<String>,
    /// Override for the OAuth2 token endpoint.
    pub auth_url: Option<String>,
    /// Request timeout in seconds. `None` disables the timeout.
    pub timeout_seconds: Option<u64>,
    /// Retry policy for API calls.
    #[serde(skip)]
    pub retry_config: RetryConfig,
}

impl Config {
    /// Creates a configuration with default endpoints, timeout and retry policy.
    pub fn new(
        customer_id: impl Into<String>,
        corpus_name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            corpus_name: corpus_name.into(),
            oauth2: OAuth2Credentials::new(client_id, client_secret),
            api_base_url: None,
            auth_url: None,
            timeout_seconds: Some(DEFAULT_TIMEOUT_SECONDS),
            retry_config: RetryConfig::default(),
        }
    }

    /// Sets a custom API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(api_base_url.into());
        self
    }

    /// Sets a custom OAuth2 token endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Disables the request timeout.
    #[must_use]
    pub const fn without_timeout(mut self) -> Self {
        self.timeout_seconds = None;
        self
    }

    /// Sets the retry configuration.
    #[must_use]
    pub const fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// The API base URL without a trailing slash.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// The per-tenant OAuth2 token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.auth_url.clone().unwrap_or_else(|| {
            format!(
                "https://vectara-prod-{}.auth.us-west-2.amazoncognito.com/oauth2/token",
                self.customer_id
            )
        })
    }

    /// Validates required fields and endpoint overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if any identifier or the client secret is empty, or
    /// if an endpoint override cannot be parsed as a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.customer_id.trim().is_empty() {
            return Err(ConfigError::MissingField("customer_id"));
        }
        if self.corpus_name.trim().is_empty() {
            return Err(ConfigError::MissingField("corpus_name"));
        }
        if self.oauth2.client_id.trim().is_empty() {
            return Err(ConfigError::MissingField("oauth2.client_id"));
        }
        if self.oauth2.client_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingField("oauth2.client_secret"));
        }

        for (field, value) in [
            ("api_base_url", self.api_base_url.as_deref()),
            ("auth_url", self.auth_url.as_deref()),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                    field,
                    message: e.to_string(),
                })?;
            }
        }

        Ok(())
    }
}
