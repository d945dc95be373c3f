//! Authenticated HTTP access to the Vectara API.
//!
//! [`HttpGateway`] is the only component that touches the network for API
//! calls. Every attempt, retries included, asks the [`TokenProvider`] for a
//! valid bearer credential before it is sent. The gateway attaches the tenant
//! and client-identification headers and turns any non-success status into
//! [`ClientError::RemoteError`].
//!
//! Retries are a single policy applied here, in middleware, rather than per
//! endpoint: `Retry-After` headers are honored first, then transient failures
//! back off exponentially up to [`RetryConfig::max_retries`] attempts.
//! Writes that are not idempotent go through [`HttpGateway::post_once`],
//! which is never retried.
//!
//! [`RetryConfig::max_retries`]: vectara_common::RetryConfig::max_retries

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::Extensions;
use log::{debug, error};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, Request, Response};
use reqwest_middleware::{ClientWithMiddleware, Middleware, Next};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use reqwest_retry_after::RetryAfterMiddleware;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use vectara_common::Config;

use crate::auth::TokenProvider;
use crate::error::ClientError;

/// Header carrying the tenant identifier.
pub const CUSTOMER_ID_HEADER: &str = "customer-id";
/// Header identifying this client to the API.
pub const SOURCE_HEADER: &str = "X-source";
/// Value sent in [`SOURCE_HEADER`].
pub const SOURCE_HEADER_VALUE: &str = "vectara-sync";

/// Builds the plain HTTP client shared by the gateway and token exchange.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, ClientError> {
    // None means no timeout
    let client = match config.timeout_seconds {
        Some(timeout) => reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?,
        None => reqwest::Client::builder().build()?,
    };
    Ok(client)
}

/// Sets `Authorization` from the token provider on each attempt.
///
/// Sits below the retry layers so a retried request never reuses a
/// credential that has since entered the refresh margin.
#[derive(Clone)]
struct BearerAuth {
    tokens: Arc<dyn TokenProvider>,
}

#[async_trait]
impl Middleware for BearerAuth {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let credential = self
            .tokens
            .ensure_valid_token()
            .await
            .map_err(reqwest_middleware::Error::middleware)?;

        let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.token()))
            .map_err(|e| {
                reqwest_middleware::Error::middleware(ClientError::AuthenticationError(format!(
                    "bearer token is not a valid header value: {e}"
                )))
            })?;
        value.set_sensitive(true);
        req.headers_mut().insert(AUTHORIZATION, value);

        next.run(req, extensions).await
    }
}

/// Single chokepoint for authenticated API calls.
#[derive(Clone)]
pub struct HttpGateway {
    client: ClientWithMiddleware,
    single_attempt: ClientWithMiddleware,
    base_url: String,
    customer_id: String,
}

impl fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("customer_id", &self.customer_id)
            .finish_non_exhaustive()
    }
}

impl HttpGateway {
    /// Wraps `http` with the retry policy from `config`.
    pub fn new(http: reqwest::Client, config: &Config, tokens: Arc<dyn TokenProvider>) -> Self {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(
                config.retry_config.initial_delay,
                config.retry_config.max_delay,
            )
            .build_with_max_retries(config.retry_config.max_retries);

        let auth = BearerAuth { tokens };

        // RetryAfterMiddleware goes first so Retry-After is respected before
        // falling back to exponential backoff
        let client = reqwest_middleware::ClientBuilder::new(http.clone())
            .with(RetryAfterMiddleware::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(auth.clone())
            .build();

        let single_attempt = reqwest_middleware::ClientBuilder::new(http)
            .with(auth)
            .build();

        Self {
            client,
            single_attempt,
            base_url: config.api_base_url(),
            customer_id: config.customer_id.clone(),
        }
    }

    /// The tenant every request is sent for.
    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    /// Sends an authenticated request and returns the parsed JSON body.
    ///
    /// Transient failures are retried under the configured policy. An empty
    /// response body parses as [`Value::Null`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationError`] if no token can be
    /// obtained, [`ClientError::RemoteError`] on a non-success status, and a
    /// transport or serialization error otherwise.
    pub async fn request<B>(
        &self,
        endpoint: &str,
        method: Method,
        params: Option<&[(&str, &str)]>,
        body: Option<&B>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.execute(&self.client, endpoint, method, params, body)
            .await
    }

    /// POSTs `body` to `endpoint` and decodes the response into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request), plus a serialization error if the
    /// response does not match `T`.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let value = self
            .request(endpoint, Method::POST, None, Some(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POSTs `body` exactly once, without retries.
    ///
    /// For writes where a lost response does not mean the write was lost.
    ///
    /// # Errors
    ///
    /// Same as [`post`](Self::post).
    pub async fn post_once<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let value = self
            .execute(&self.single_attempt, endpoint, Method::POST, None, Some(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn execute<B>(
        &self,
        client: &ClientWithMiddleware,
        endpoint: &str,
        method: Method,
        params: Option<&[(&str, &str)]>,
        body: Option<&B>,
    ) -> Result<Value, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, endpoint);

        reqwest::Url::parse(&url)
            .map_err(|e| ClientError::ConfigurationError(format!("Invalid URL '{url}': {e}")))?;

        let mut request_builder = client
            .request(method.clone(), &url)
            .header(CUSTOMER_ID_HEADER, &self.customer_id)
            .header(SOURCE_HEADER, SOURCE_HEADER_VALUE)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if let Some(params) = params {
            request_builder = request_builder.query(params);
        }

        if let Some(body) = body {
            request_builder = request_builder.body(serde_json::to_string(body)?);
        }

        debug!("{method} {url}");
        let response = request_builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!(
                "API request to {endpoint} failed with status {}: {text}",
                status.as_u16()
            );
            return Err(ClientError::RemoteError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        debug!("{endpoint} responded with status {}", status.as_u16());

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}
