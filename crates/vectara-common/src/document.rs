//! Documents as submitted to the corpus.
//!
//! A [`Document`] is a caller-identified set of ordered sections plus a
//! metadata map. Sections render to `"key: value"` text blocks; metadata is
//! normalized so every submitted value is scalar.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use typed_builder::TypedBuilder;

/// Reserved key recording which stream a record came from.
///
/// Sections with this key are metadata-only and never rendered as text.
pub const METADATA_STREAM_FIELD: &str = "_ab_stream";

/// One key/value pair of a document's structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: Value,
}

impl Section {
    /// Creates a section from a key and any JSON-convertible value.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this section carries stream provenance rather than content.
    #[must_use]
    pub fn is_provenance(&self) -> bool {
        self.key == METADATA_STREAM_FIELD
    }

    /// Renders the section as a `"key: value"` text block.
    ///
    /// String values are written raw; every other value is written as
    /// compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.value {
            Value::String(s) => format!("{}: {s}", self.key),
            other => format!("{}: {other}", self.key),
        }
    }
}

/// A document to index.
///
/// The `id` is supplied by the caller and must be stable across runs so that
/// re-indexing replaces rather than duplicates.
///
/// # Examples
///
/// ```
/// use vectara_common::Document;
///
/// let doc = Document::new("users_42")
///     .with_section("name", "Ada")
///     .with_section("_ab_stream", "users")
///     .with_metadata("_ab_stream", "users");
///
/// assert_eq!(doc.rendered_sections(), vec!["name: Ada".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Document {
    /// Caller-supplied, stable document identifier.
    #[builder(setter(into))]
    pub id: String,
    /// Ordered structured data.
    #[builder(default)]
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Metadata attached to the document.
    #[builder(default)]
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Creates an empty document with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sections: Vec::new(),
            metadata: Map::new(),
        }
    }

    /// Appends a section.
    #[must_use]
    pub fn with_section(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sections.push(Section::new(key, value));
        self
    }

    /// Inserts a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Section text blocks in order, excluding provenance sections.
    #[must_use]
    pub fn rendered_sections(&self) -> Vec<String> {
        self.sections
            .iter()
            .filter(|section| !section.is_provenance())
            .map(Section::render)
            .collect()
    }

    /// The metadata object as it is submitted to the corpus.
    ///
    /// A provenance section missing from the metadata is copied into it, then
    /// every value is normalized with [`normalize_metadata`].
    #[must_use]
    pub fn submitted_metadata(&self) -> Map<String, Value> {
        let mut metadata = self.metadata.clone();
        if !metadata.contains_key(METADATA_STREAM_FIELD)
            && let Some(section) = self.sections.iter().find(|s| s.is_provenance())
        {
            metadata.insert(METADATA_STREAM_FIELD.to_string(), section.value.clone());
        }
        normalize_metadata(&metadata)
    }
}

/// Normalizes a single metadata value.
///
/// Strings, numbers and booleans pass through unchanged. Everything else,
/// including `null`, is replaced by its JSON encoding as a string.
#[must_use]
pub fn normalize_value(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => value.clone(),
        other => Value::String(other.to_string()),
    }
}

/// Normalizes every value of a metadata map so the remote schema stays scalar.
#[must_use]
pub fn normalize_metadata(metadata: &Map<String, Value>) -> Map<String, Value> {
    metadata
        .iter()
        .map(|(key, value)| (key.clone(), normalize_value(value)))
        .collect()
}
