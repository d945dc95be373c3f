//! Shared fixtures for the crate's unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vectara_common::{Config, RetryConfig};

use crate::auth::{Clock, Credential, TokenProvider};
use crate::error::ClientError;
use crate::gateway::{HttpGateway, build_http_client};

/// Config pointing both the API and the token endpoint at `server`.
pub fn test_config(server: &MockServer) -> Config {
    Config::new("1234567", "docs", "test-client", "test-secret")
        .with_api_base_url(format!("{}/v1", server.uri()))
        .with_auth_url(format!("{}/oauth2/token", server.uri()))
        .with_retry_config(RetryConfig::none())
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += TimeDelta::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Serves `test-token` from the token endpoint.
pub async fn mount_token(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "expires_in": expires_in,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

/// Token provider handing out a fixed, long-lived credential.
#[derive(Debug)]
pub struct StaticTokens {
    token: String,
}

impl StaticTokens {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn ensure_valid_token(&self) -> Result<Credential, ClientError> {
        Ok(Credential::new(
            self.token.clone(),
            Utc::now() + TimeDelta::days(1),
        ))
    }
}

/// Token provider whose exchange always fails.
#[derive(Debug)]
pub struct FailingTokens;

#[async_trait]
impl TokenProvider for FailingTokens {
    async fn ensure_valid_token(&self) -> Result<Credential, ClientError> {
        Err(ClientError::AuthenticationError(
            "token endpoint returned HTTP 401".to_string(),
        ))
    }
}

/// Gateway authenticating with [`StaticTokens`].
pub fn static_gateway(config: &Config) -> HttpGateway {
    let http = build_http_client(config).unwrap();
    HttpGateway::new(http, config, Arc::new(StaticTokens::new("static-token")))
}
