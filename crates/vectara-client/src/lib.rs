//! # vectara-client
//!
//! Client library that keeps a Vectara corpus in sync with a stream of
//! documents.
//!
//! A [`VectaraClient`] session is built from these parts:
//! - [`AuthTokenManager`] exchanges client credentials for bearer tokens and
//!   refreshes them before they expire
//! - [`HttpGateway`] sends every API call with the tenant headers and a shared
//!   retry policy
//! - [`CorpusResolver`] finds or creates exactly one corpus with the
//!   configured name
//! - [`DocumentIngestor`] indexes documents as rendered sections plus
//!   normalized metadata
//! - [`DocumentPruner`] deletes documents by id or by metadata value
//!
//! ## Example
//!
//! ```no_run
//! use vectara_client::VectaraClient;
//! use vectara_common::Config;
//!
//! # async fn example() -> Result<(), vectara_client::ClientError> {
//! let config = Config::new("1234567", "airbyte-docs", "client-id", "client-secret");
//! let client = VectaraClient::connect(config).await?;
//! println!("Using corpus {}", client.corpus_id());
//!
//! let not_deleted = client.delete_by_id(&["orders_1", "orders_2"]).await?;
//! if !not_deleted.is_empty() {
//!     eprintln!("Could not delete: {not_deleted:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod corpus;
pub mod error;
pub mod gateway;
pub mod ingest;
pub mod prune;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use auth::{
    AuthTokenManager, Clock, Credential, SystemClock, TOKEN_REFRESH_MARGIN_SECS, TokenProvider,
};
pub use client::VectaraClient;
pub use corpus::{CorpusKey, CorpusResolver, LIST_CORPORA_PAGE_SIZE};
pub use error::ClientError;
pub use gateway::{HttpGateway, build_http_client};
pub use ingest::DocumentIngestor;
pub use prune::{DocumentPruner, QUERY_PAGE_SIZE, metadata_filter};
pub use wire::CorpusId;
