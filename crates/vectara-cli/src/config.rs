//! Sync tool configuration.
//!
//! Configuration is loaded from `~/.config/vectara-sync/config.toml` unless a
//! path is given with `--config`.
//!
//! ## Example Configuration
//!
//! ```toml
//! customer_id = "1234567"
//! corpus_name = "airbyte-docs"
//!
//! [oauth2]
//! client_id = "5d7e1b2c"
//! client_secret_env = "VECTARA_CLIENT_SECRET"
//!
//! [settings]
//! timeout_seconds = 30
//! max_retries = 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use vectara_common::{Config, DEFAULT_TIMEOUT_SECONDS, RetryConfig};

use crate::error::{Result, SyncError};

/// Tool configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Vectara customer id
    pub customer_id: String,

    /// Corpus to resolve or create
    pub corpus_name: String,

    /// Override for the API base URL
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Override for the token endpoint
    #[serde(default)]
    pub auth_url: Option<String>,

    /// Client credentials
    pub oauth2: OAuth2Section,

    /// Optional request settings
    #[serde(default)]
    pub settings: Settings,
}

/// Client credentials. The secret comes from exactly one of
/// `client_secret_env` or `client_secret`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuth2Section {
    pub client_id: String,

    /// Environment variable holding the client secret
    #[serde(default)]
    pub client_secret_env: Option<String>,

    /// Inline client secret
    #[serde(default)]
    pub client_secret: Option<SecretString>,
}

/// Optional request settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Request timeout in seconds, 0 disables it (default: 30)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries for transient API failures (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
        }
    }
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

const fn default_max_retries() -> u32 {
    3
}

impl SyncConfig {
    /// Loads and validates configuration from `path`, or from the default
    /// location when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config directory cannot be determined
    /// - The file doesn't exist or cannot be read
    /// - Deserialization or validation fails
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            return Err(SyncError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Failed to determine config directory".to_string()))?
            .join("vectara-sync");

        Ok(config_dir.join("config.toml"))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Both or neither of `client_secret_env` and `client_secret` are set
    /// - The client settings are rejected by [`Config::validate`]
    pub fn validate(&self) -> Result<()> {
        match (&self.oauth2.client_secret_env, &self.oauth2.client_secret) {
            (Some(_), Some(_)) => {
                return Err(SyncError::Config(
                    "Set only one of oauth2.client_secret_env and oauth2.client_secret"
                        .to_string(),
                ));
            }
            (None, None) => {
                return Err(SyncError::Config(
                    "One of oauth2.client_secret_env or oauth2.client_secret is required"
                        .to_string(),
                ));
            }
            _ => {}
        }

        // Placeholder secret; the real one may live in an unset variable
        self.client_config_with_secret("placeholder")
            .validate()
            .map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Resolves the client secret, reading the environment if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the referenced variable is unset or empty.
    pub fn resolve_secret(&self) -> Result<SecretString> {
        self.resolve_secret_with(|name| std::env::var(name).ok())
    }

    fn resolve_secret_with<F>(&self, lookup: F) -> Result<SecretString>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = &self.oauth2.client_secret {
            return Ok(secret.clone());
        }

        let name = self.oauth2.client_secret_env.as_deref().ok_or_else(|| {
            SyncError::Config("No client secret source configured".to_string())
        })?;

        match lookup(name) {
            Some(value) if !value.is_empty() => Ok(SecretString::new(value.into())),
            _ => Err(SyncError::Config(format!(
                "Environment variable {name} is not set"
            ))),
        }
    }

    /// Builds the client configuration, resolving the secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret cannot be resolved.
    pub fn client_config(&self) -> Result<Config> {
        let secret = self.resolve_secret()?;
        Ok(self.client_config_with_secret(secret.expose_secret()))
    }

    fn client_config_with_secret(&self, secret: &str) -> Config {
        let mut config = Config::new(
            &self.customer_id,
            &self.corpus_name,
            &self.oauth2.client_id,
            secret,
        )
        .with_retry_config(RetryConfig {
            max_retries: self.settings.max_retries,
            ..RetryConfig::default()
        });

        if let Some(url) = &self.api_base_url {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = &self.auth_url {
            config = config.with_auth_url(url);
        }

        match self.settings.timeout_seconds {
            0 => config.without_timeout(),
            secs => config.with_timeout(secs),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    fn sample_config_toml() -> &'static str {
        r#"
customer_id = "1234567"
corpus_name = "airbyte-docs"
api_base_url = "http://localhost:8080/v1"

[oauth2]
client_id = "abc"
client_secret_env = "VECTARA_TEST_SECRET"

[settings]
timeout_seconds = 10
max_retries = 1
        "#
    }

    #[test]
    fn test_parse_config() {
        let config = SyncConfig::parse(sample_config_toml()).unwrap();

        assert_eq!(config.customer_id, "1234567");
        assert_eq!(config.corpus_name, "airbyte-docs");
        assert_eq!(
            config.oauth2.client_secret_env.as_deref(),
            Some("VECTARA_TEST_SECRET")
        );
        assert_eq!(config.settings.timeout_seconds, 10);
        assert_eq!(config.settings.max_retries, 1);
    }

    #[test]
    fn test_default_settings() {
        let toml = r#"
customer_id = "1"
corpus_name = "docs"

[oauth2]
client_id = "abc"
client_secret = "inline"
        "#;

        let config = SyncConfig::parse(toml).unwrap();
        assert_eq!(config.settings.timeout_seconds, 30);
        assert_eq!(config.settings.max_retries, 3);
    }

    #[test]
    fn test_validate_secret_sources() {
        let both = r#"
customer_id = "1"
corpus_name = "docs"

[oauth2]
client_id = "abc"
client_secret = "inline"
client_secret_env = "VAR"
        "#;
        assert!(SyncConfig::parse(both).is_err());

        let neither = r#"
customer_id = "1"
corpus_name = "docs"

[oauth2]
client_id = "abc"
        "#;
        assert!(SyncConfig::parse(neither).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_corpus_name() {
        let toml = r#"
customer_id = "1"
corpus_name = ""

[oauth2]
client_id = "abc"
client_secret = "inline"
        "#;
        assert!(SyncConfig::parse(toml).is_err());
    }

    #[test]
    fn test_resolve_secret_from_env() {
        let config = SyncConfig::parse(sample_config_toml()).unwrap();

        let lookup = |name: &str| (name == "VECTARA_TEST_SECRET").then(|| "s3cret".to_string());
        let secret = config.resolve_secret_with(lookup).unwrap();
        assert_eq!(secret.expose_secret(), "s3cret");

        assert!(config.resolve_secret_with(|_| None).is_err());
        assert!(config.resolve_secret_with(|_| Some(String::new())).is_err());
    }

    #[test]
    fn test_client_config() {
        let config = SyncConfig::parse(sample_config_toml()).unwrap();
        let client = config.client_config_with_secret("s3cret");

        assert_eq!(client.api_base_url(), "http://localhost:8080/v1");
        assert_eq!(client.timeout_seconds, Some(10));
        assert_eq!(client.retry_config.max_retries, 1);
        assert_eq!(client.oauth2.client_secret.expose_secret(), "s3cret");
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let toml = r#"
customer_id = "1"
corpus_name = "docs"

[oauth2]
client_id = "abc"
client_secret = "inline"

[settings]
timeout_seconds = 0
        "#;

        let config = SyncConfig::parse(toml).unwrap();
        assert_eq!(config.client_config().unwrap().timeout_seconds, None);
    }
}
