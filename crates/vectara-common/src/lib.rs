//! # vectara-common
//!
//! Configuration and document types shared by the Vectara sync client and CLI.
//!
//! This crate holds plain data with no network access:
//! - Session configuration with secret-safe OAuth2 credentials
//! - Retry policy settings
//! - Documents, sections and metadata normalization
//!
//! ## Example
//!
//! ```
//! use vectara_common::{Config, Document, RetryConfig};
//!
//! let config = Config::new("1234567", "airbyte-docs", "client-id", "client-secret")
//!     .with_retry_config(RetryConfig::none());
//!
//! let doc = Document::new("orders_1")
//!     .with_section("status", "shipped")
//!     .with_metadata("_ab_stream", "orders")
//!     .with_metadata("tags", serde_json::json!(["a", "b"]));
//!
//! let metadata = doc.submitted_metadata();
//! assert_eq!(metadata["tags"], "[\"a\",\"b\"]");
//! # assert!(config.validate().is_ok());
//! ```

/// Session configuration and retry policy.
pub mod config;
/// Documents, sections and metadata normalization.
pub mod document;

pub use config::{
    Config, ConfigError, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT_SECONDS, OAuth2Credentials,
    RetryConfig,
};
pub use document::{
    Document, METADATA_STREAM_FIELD, Section, normalize_metadata, normalize_value,
};
