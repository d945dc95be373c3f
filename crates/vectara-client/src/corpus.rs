//! Find-or-create resolution of the session's corpus.
//!
//! Resolution lists corpora whose name matches the configured one and
//! requires an exact, unique match. Zero matches creates the corpus; more
//! than one is a configuration ambiguity and fails.
//!
//! # Limitations
//!
//! - Only the first [`LIST_CORPORA_PAGE_SIZE`] results are inspected, so
//!   duplicates beyond that page go undetected.
//! - Find-then-create is not atomic. Two processes resolving the same name
//!   against an empty backend can both create a corpus.

use std::sync::Arc;

use log::{debug, info};

use crate::error::ClientError;
use crate::gateway::HttpGateway;
use crate::wire::{
    CorpusId, CorpusSummary, CreateCorpusRequest, CreateCorpusResponse, FilterAttribute,
    ListCorporaRequest, ListCorporaResponse, NewCorpus,
};

/// Maximum number of corpora fetched when listing.
pub const LIST_CORPORA_PAGE_SIZE: u32 = 100;

/// A resolved corpus within a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusKey {
    /// Tenant owning the corpus.
    pub customer_id: String,
    /// The corpus identifier.
    pub corpus_id: CorpusId,
}

/// Resolves or provisions the named corpus.
#[derive(Debug, Clone)]
pub struct CorpusResolver {
    gateway: Arc<HttpGateway>,
}

impl CorpusResolver {
    /// Creates a resolver sending requests through `gateway`.
    pub const fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// Lists corpora matching `filter`, bounded to one page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    pub async fn list_corpora(&self, filter: &str) -> Result<Vec<CorpusSummary>, ClientError> {
        let response: ListCorporaResponse = self
            .gateway
            .post(
                "list-corpora",
                &ListCorporaRequest {
                    num_results: LIST_CORPORA_PAGE_SIZE,
                    filter,
                },
            )
            .await?;
        Ok(response.corpus)
    }

    /// Finds the unique corpus named exactly `corpus_name`.
    ///
    /// Entries repeating the same id count once.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AmbiguousCorpusError`] if more than one corpus
    /// carries the name.
    pub async fn find(&self, corpus_name: &str) -> Result<Option<CorpusId>, ClientError> {
        let mut matches: Vec<CorpusId> = Vec::new();
        for corpus in self.list_corpora(corpus_name).await? {
            if corpus.name.as_deref() == Some(corpus_name) && !matches.contains(&corpus.id) {
                matches.push(corpus.id);
            }
        }

        debug!("Found {} corpora named '{corpus_name}'", matches.len());

        if matches.len() > 1 {
            return Err(ClientError::AmbiguousCorpusError {
                corpus_name: corpus_name.to_string(),
                matches: matches.len(),
            });
        }

        Ok(matches.pop())
    }

    /// Creates a corpus with the stream provenance filter attribute.
    ///
    /// Sent once: a retry after a lost response would create a second corpus
    /// with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidResponse`] if the response carries no
    /// corpus id.
    pub async fn create(&self, corpus_name: &str) -> Result<CorpusId, ClientError> {
        let request = CreateCorpusRequest {
            corpus: NewCorpus {
                name: corpus_name.to_string(),
                filter_attributes: vec![FilterAttribute::stream_provenance()],
            },
        };

        let response: CreateCorpusResponse =
            self.gateway.post_once("create-corpus", &request).await?;

        response.corpus_id.ok_or_else(|| {
            let detail = response
                .status
                .and_then(|s| s.status_detail.or(s.code))
                .unwrap_or_default();
            ClientError::InvalidResponse(format!(
                "create-corpus returned no corpusId for '{corpus_name}' {detail}"
            ))
        })
    }

    /// Adopts the existing corpus named `corpus_name`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AmbiguousCorpusError`] when the name is not
    /// unique, without creating anything.
    pub async fn resolve(&self, corpus_name: &str) -> Result<CorpusKey, ClientError> {
        let corpus_id = match self.find(corpus_name).await? {
            Some(id) => {
                info!("Using existing corpus '{corpus_name}' ({id})");
                id
            }
            None => {
                let id = self.create(corpus_name).await?;
                info!("Created corpus '{corpus_name}' ({id})");
                id
            }
        };

        Ok(CorpusKey {
            customer_id: self.gateway.customer_id().to_string(),
            corpus_id,
        })
    }
}
