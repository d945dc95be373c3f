//! Bearer token acquisition and caching.
//!
//! Tokens come from an OAuth2 client-credentials exchange against the
//! tenant's identity endpoint. The [`AuthTokenManager`] caches the current
//! [`Credential`] and refreshes it once its remaining lifetime drops to
//! [`TOKEN_REFRESH_MARGIN_SECS`] or below.
//!
//! The cache sits behind an async mutex that is held for the duration of a
//! refresh, so concurrent callers that observe expiry at the same time
//! trigger a single exchange and never see a half-updated credential.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, error};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use vectara_common::{Config, OAuth2Credentials};

use crate::error::ClientError;

/// Remaining lifetime, in seconds, at or below which a token is refreshed.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Source of the current time.
///
/// Injected into [`AuthTokenManager`] so expiry can be driven from tests.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A bearer token and the instant it expires.
#[derive(Clone)]
pub struct Credential {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    /// Creates a credential.
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: SecretString::new(token.into().into()),
            expires_at,
        }
    }

    /// The bearer token value.
    ///
    /// Only expose this when building the `Authorization` header.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// When the token stops being accepted.
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Lifetime left at `now`.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        self.expires_at - now
    }

    /// Whether a request sent at `now` must use a fresh token instead.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) <= TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS)
    }
}

/// Supplies a valid bearer credential for every API call.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a credential with more than the refresh margin left.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationError`] if no valid token can be
    /// obtained.
    async fn ensure_valid_token(&self) -> Result<Credential, ClientError>;

    /// Drops any cached credential so the next call obtains a new one.
    async fn invalidate(&self) {}
}

/// Body returned by the identity endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Obtains and caches client-credentials bearer tokens.
pub struct AuthTokenManager {
    http: reqwest::Client,
    token_endpoint: String,
    credentials: OAuth2Credentials,
    clock: Arc<dyn Clock>,
    cached: Mutex<Option<Credential>>,
}

impl fmt::Debug for AuthTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokenManager")
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.credentials.client_id)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl AuthTokenManager {
    /// Creates a manager for the tenant described by `config`.
    ///
    /// No exchange happens until the first call to
    /// [`ensure_valid_token`](TokenProvider::ensure_valid_token).
    pub fn new(http: reqwest::Client, config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            http,
            token_endpoint: config.token_endpoint(),
            credentials: config.oauth2.clone(),
            clock,
            cached: Mutex::new(None),
        }
    }

    /// The identity endpoint used for exchanges.
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    async fn exchange(&self) -> Result<Credential, ClientError> {
        let requested_at = self.clock.now();
        debug!("Requesting bearer token from {}", self.token_endpoint);

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret(),
            ),
        ];

        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ClientError::AuthenticationError(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ClientError::AuthenticationError(format!("failed to read token response: {e}"))
        })?;

        if !status.is_success() {
            error!("Token exchange failed with status {}", status.as_u16());
            return Err(ClientError::AuthenticationError(format!(
                "token endpoint returned HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ClientError::AuthenticationError(format!("malformed token response: {e}"))
        })?;

        let (Some(token), Some(expires_in)) = (parsed.access_token, parsed.expires_in) else {
            return Err(ClientError::AuthenticationError(
                "token response is missing access_token or expires_in. \
                 Confirm the client id and secret"
                    .to_string(),
            ));
        };

        let expires_at = TimeDelta::try_seconds(expires_in)
            .and_then(|lifetime| requested_at.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ClientError::AuthenticationError(format!("invalid expires_in: {expires_in}"))
            })?;
        debug!("Obtained bearer token expiring at {expires_at}");

        Ok(Credential::new(token, expires_at))
    }
}

#[async_trait]
impl TokenProvider for AuthTokenManager {
    async fn ensure_valid_token(&self) -> Result<Credential, ClientError> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref()
            && !credential.needs_refresh(self.clock.now())
        {
            return Ok(credential.clone());
        }

        let credential = self.exchange().await?;
        *cached = Some(credential.clone());
        Ok(credential)
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
