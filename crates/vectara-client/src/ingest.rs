//! Document indexing.
//!
//! Each document is sent with its own `index` call. A batch stops at the
//! first document the corpus does not acknowledge with `OK`; documents
//! indexed before it stay indexed.

use std::sync::Arc;

use log::{debug, info};

use vectara_common::Document;

use crate::corpus::CorpusKey;
use crate::error::ClientError;
use crate::gateway::HttpGateway;
use crate::wire::{IndexDocument, IndexRequest, IndexResponse, SectionText};

/// Transforms documents into `index` requests and submits them.
#[derive(Debug, Clone)]
pub struct DocumentIngestor {
    gateway: Arc<HttpGateway>,
    corpus: CorpusKey,
}

impl DocumentIngestor {
    /// Creates an ingestor writing into `corpus`.
    pub const fn new(gateway: Arc<HttpGateway>, corpus: CorpusKey) -> Self {
        Self { gateway, corpus }
    }

    /// Builds the wire body for `document`.
    ///
    /// Provenance sections are left out of the section list; metadata is
    /// normalized to scalars and JSON-encoded.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the metadata cannot be encoded.
    pub fn build_request(&self, document: &Document) -> Result<IndexRequest, ClientError> {
        let metadata_json = serde_json::to_string(&document.submitted_metadata())?;

        Ok(IndexRequest {
            customer_id: self.corpus.customer_id.clone(),
            corpus_id: self.corpus.corpus_id.clone(),
            document: IndexDocument {
                document_id: document.id.clone(),
                metadata_json,
                section: document
                    .rendered_sections()
                    .into_iter()
                    .map(|text| SectionText { text })
                    .collect(),
            },
        })
    }

    /// Indexes a single document.
    ///
    /// The request is not retried, since a write whose response was lost
    /// would be rejected as a duplicate on the second attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::IndexError`] if the corpus answers with a
    /// status other than `OK`, or any gateway error.
    pub async fn index_document(&self, document: &Document) -> Result<(), ClientError> {
        let request = self.build_request(document)?;
        let response: IndexResponse = self.gateway.post_once("index", &request).await?;

        let status = response.status.unwrap_or_default();
        if !status.is_ok() {
            return Err(ClientError::IndexError {
                document_id: document.id.clone(),
                code: status.code.unwrap_or_else(|| "MISSING_STATUS".to_string()),
                detail: status.status_detail.unwrap_or_default(),
            });
        }

        debug!("Indexed document {}", document.id);
        Ok(())
    }

    /// Indexes documents in order, stopping at the first failure.
    ///
    /// Returns the number of documents indexed.
    ///
    /// # Errors
    ///
    /// Returns the first [`ClientError::IndexError`] or gateway error; later
    /// documents are not attempted.
    pub async fn index<'a, I>(&self, documents: I) -> Result<usize, ClientError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut indexed = 0usize;
        for document in documents {
            self.index_document(document).await?;
            indexed += 1;
        }

        info!(
            "Indexed {indexed} documents into corpus {}",
            self.corpus.corpus_id
        );
        Ok(indexed)
    }
}
