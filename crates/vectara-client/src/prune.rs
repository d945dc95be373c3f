//! Deletion of documents by id or by metadata predicate.
//!
//! The `delete-doc` endpoint signals an incomplete deletion by returning a
//! non-empty body; an empty or falsy body means the document is gone. Ids are
//! deleted one call at a time and a failed id never stops the rest of the
//! list.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::corpus::CorpusKey;
use crate::error::ClientError;
use crate::gateway::HttpGateway;
use crate::wire::{CorpusKeyFilter, DeleteDocRequest, QueryItem, QueryRequest, QueryResponse};

/// Maximum number of documents matched per metadata value.
pub const QUERY_PAGE_SIZE: u32 = 100;

/// Builds the predicate `doc.<field> = '<value>'`.
///
/// Single quotes inside `value` are escaped.
pub fn metadata_filter(field: &str, value: &str) -> String {
    format!("doc.{field} = '{}'", value.replace('\'', "\\'"))
}

/// Whether a deletion response reports that something was left behind.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Resolves documents from metadata and deletes them.
#[derive(Debug, Clone)]
pub struct DocumentPruner {
    gateway: Arc<HttpGateway>,
    corpus: CorpusKey,
}

impl DocumentPruner {
    /// Creates a pruner operating on `corpus`.
    pub const fn new(gateway: Arc<HttpGateway>, corpus: CorpusKey) -> Self {
        Self { gateway, corpus }
    }

    /// Ids of the documents whose metadata `field` equals `value`.
    ///
    /// At most [`QUERY_PAGE_SIZE`] ids are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_document_ids(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Vec<String>, ClientError> {
        let request = QueryRequest {
            query: vec![QueryItem {
                query: String::new(),
                num_results: QUERY_PAGE_SIZE,
                corpus_key: vec![CorpusKeyFilter {
                    customer_id: self.corpus.customer_id.clone(),
                    corpus_id: self.corpus.corpus_id.clone(),
                    metadata_filter: metadata_filter(field, value),
                }],
            }],
        };

        let response: QueryResponse = self.gateway.post("query", &request).await?;
        let ids: Vec<String> = response
            .response_set
            .into_iter()
            .next()
            .map(|set| set.document.into_iter().map(|doc| doc.id).collect())
            .unwrap_or_default();

        debug!("{} documents match {field} = '{value}'", ids.len());
        Ok(ids)
    }

    /// Deletes every document whose `field` matches one of `values`.
    ///
    /// Returns the ids that could not be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails; nothing is deleted in that case.
    pub async fn delete_by_metadata<S>(
        &self,
        field: &str,
        values: &[S],
    ) -> Result<Vec<String>, ClientError>
    where
        S: AsRef<str> + Sync,
    {
        let mut ids = Vec::new();
        for value in values {
            ids.extend(self.find_document_ids(field, value.as_ref()).await?);
        }

        info!(
            "Deleting {} documents matching {field} over {} values",
            ids.len(),
            values.len()
        );
        self.delete_by_id(&ids).await
    }

    /// Deletes documents one by one, returning the ids that were not deleted.
    ///
    /// An id fails when the response body is truthy or its call fails for any
    /// reason other than authentication, including timeouts and non-success
    /// statuses.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationError`] if no token can be
    /// obtained, since no later call could succeed either.
    pub async fn delete_by_id<S>(&self, ids: &[S]) -> Result<Vec<String>, ClientError>
    where
        S: AsRef<str> + Sync,
    {
        let mut failed = Vec::new();

        for id in ids {
            let id = id.as_ref();
            let request = DeleteDocRequest {
                customer_id: &self.corpus.customer_id,
                corpus_id: &self.corpus.corpus_id,
                document_id: id,
            };

            match self.gateway.post::<Value, _>("delete-doc", &request).await {
                Ok(response) if is_truthy(&response) => {
                    warn!("Document {id} was not fully deleted: {response}");
                    failed.push(id.to_string());
                }
                Ok(_) => debug!("Deleted document {id}"),
                Err(err) if err.is_authentication_error() => return Err(err),
                Err(err) => {
                    warn!("Failed to delete document {id}: {err}");
                    failed.push(id.to_string());
                }
            }
        }

        if !failed.is_empty() {
            warn!("{} of {} documents were not deleted", failed.len(), ids.len());
        }
        Ok(failed)
    }
}
