//! Request and response bodies of the Vectara v1 REST API.
//!
//! Field names and nesting follow the remote contract exactly; only the
//! fields this client reads are modelled on responses.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vectara_common::METADATA_STREAM_FIELD;

/// Opaque corpus identifier, echoed back exactly as the API returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorpusId(Value);

impl CorpusId {
    /// Wraps a raw identifier value.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The raw identifier value.
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for CorpusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}

/// Body of `list-corpora`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCorporaRequest<'a> {
    pub num_results: u32,
    pub filter: &'a str,
}

/// Response of `list-corpora`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCorporaResponse {
    #[serde(default)]
    pub corpus: Vec<CorpusSummary>,
}

/// One entry of a `list-corpora` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusSummary {
    pub id: CorpusId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Value type of a filter attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterAttributeType {
    #[serde(rename = "FILTER_ATTRIBUTE_TYPE__TEXT")]
    Text,
    #[serde(rename = "FILTER_ATTRIBUTE_TYPE__INTEGER")]
    Integer,
    #[serde(rename = "FILTER_ATTRIBUTE_TYPE__REAL")]
    Real,
    #[serde(rename = "FILTER_ATTRIBUTE_TYPE__BOOLEAN")]
    Boolean,
}

/// Whether a filter attribute applies to whole documents or to parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterAttributeLevel {
    #[serde(rename = "FILTER_ATTRIBUTE_LEVEL__DOCUMENT")]
    Document,
    #[serde(rename = "FILTER_ATTRIBUTE_LEVEL__DOCUMENT_PART")]
    DocumentPart,
}

/// A metadata field the corpus can filter on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterAttribute {
    pub name: String,
    pub indexed: bool,
    #[serde(rename = "type")]
    pub attribute_type: FilterAttributeType,
    pub level: FilterAttributeLevel,
}

impl FilterAttribute {
    /// The indexed, document-level text attribute recording stream provenance.
    pub fn stream_provenance() -> Self {
        Self {
            name: METADATA_STREAM_FIELD.to_string(),
            indexed: true,
            attribute_type: FilterAttributeType::Text,
            level: FilterAttributeLevel::Document,
        }
    }
}

/// Corpus definition inside a `create-corpus` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCorpus {
    pub name: String,
    pub filter_attributes: Vec<FilterAttribute>,
}

/// Body of `create-corpus`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCorpusRequest {
    pub corpus: NewCorpus,
}

/// Response of `create-corpus`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCorpusResponse {
    #[serde(default)]
    pub corpus_id: Option<CorpusId>,
    #[serde(default)]
    pub status: Option<Status>,
}

/// Corpus selector with a metadata predicate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusKeyFilter {
    pub customer_id: String,
    pub corpus_id: CorpusId,
    pub metadata_filter: String,
}

/// One query of a `query` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryItem {
    pub query: String,
    pub num_results: u32,
    pub corpus_key: Vec<CorpusKeyFilter>,
}

/// Body of `query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: Vec<QueryItem>,
}

/// Response of `query`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub response_set: Vec<ResponseSet>,
}

/// Result set for one query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseSet {
    #[serde(default)]
    pub document: Vec<DocumentRef>,
}

/// A matched document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentRef {
    pub id: String,
}

/// Body of `delete-doc`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDocRequest<'a> {
    pub customer_id: &'a str,
    pub corpus_id: &'a CorpusId,
    pub document_id: &'a str,
}

/// A rendered text block of an indexed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionText {
    pub text: String,
}

/// Document inside an `index` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    pub document_id: String,
    pub metadata_json: String,
    pub section: Vec<SectionText>,
}

/// Body of `index`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub customer_id: String,
    pub corpus_id: CorpusId,
    pub document: IndexDocument,
}

/// Acknowledgment status returned by write endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub status_detail: Option<String>,
}

impl Status {
    /// Code reported for accepted writes.
    pub const OK: &'static str = "OK";

    /// Whether the write was accepted.
    pub fn is_ok(&self) -> bool {
        self.code.as_deref() == Some(Self::OK)
    }
}

/// Response of `index`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexResponse {
    #[serde(default)]
    pub status: Option<Status>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_corpus_shape() {
        let request = CreateCorpusRequest {
            corpus: NewCorpus {
                name: "docs".to_string(),
                filter_attributes: vec![FilterAttribute::stream_provenance()],
            },
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "corpus": {
                    "name": "docs",
                    "filterAttributes": [{
                        "name": "_ab_stream",
                        "indexed": true,
                        "type": "FILTER_ATTRIBUTE_TYPE__TEXT",
                        "level": "FILTER_ATTRIBUTE_LEVEL__DOCUMENT"
                    }]
                }
            })
        );
    }

    #[test]
    fn test_query_shape() {
        let request = QueryRequest {
            query: vec![QueryItem {
                query: String::new(),
                num_results: 100,
                corpus_key: vec![CorpusKeyFilter {
                    customer_id: "42".to_string(),
                    corpus_id: CorpusId::new(7),
                    metadata_filter: "doc._ab_stream = 'users'".to_string(),
                }],
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": [{
                    "query": "",
                    "numResults": 100,
                    "corpusKey": [{
                        "customerId": "42",
                        "corpusId": 7,
                        "metadataFilter": "doc._ab_stream = 'users'"
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_corpus_id_is_echoed_verbatim() {
        let numeric: CorpusId = serde_json::from_value(json!(12)).unwrap();
        let textual: CorpusId = serde_json::from_value(json!("abc")).unwrap();

        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(12));
        assert_eq!(numeric.to_string(), "12");
        assert_eq!(textual.to_string(), "abc");
    }

    #[test]
    fn test_status_is_ok() {
        let response: IndexResponse =
            serde_json::from_value(json!({"status": {"code": "OK", "statusDetail": ""}})).unwrap();
        assert!(response.status.unwrap().is_ok());

        let response: IndexResponse = serde_json::from_value(
            json!({"status": {"code": "ALREADY_EXISTS", "statusDetail": "dup"}}),
        )
        .unwrap();
        let status = response.status.unwrap();
        assert!(!status.is_ok());
        assert_eq!(status.status_detail.as_deref(), Some("dup"));
    }

    #[test]
    fn test_list_corpora_tolerates_missing_fields() {
        let response: ListCorporaResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.corpus.is_empty());

        let response: ListCorporaResponse =
            serde_json::from_value(json!({"corpus": [{"id": 1}]})).unwrap();
        assert_eq!(response.corpus[0].name, None);
    }
}
