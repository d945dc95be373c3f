//! JSON Lines input for the `index` command.
//!
//! Each non-blank line is one record:
//!
//! ```json
//! {"id": "users_1", "sections": {"name": "Ada", "_ab_stream": "users"}, "metadata": {"_ab_stream": "users"}}
//! ```
//!
//! `sections` may also be a list of `[key, value]` pairs when the order or
//! repeated keys matter.

use std::io::BufRead;

use serde::Deserialize;
use serde_json::{Map, Value};

use vectara_common::{Document, Section};

use crate::error::{Result, SyncError};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Sections {
    Pairs(Vec<(String, Value)>),
    Object(Map<String, Value>),
}

impl Default for Sections {
    fn default() -> Self {
        Self::Pairs(Vec::new())
    }
}

impl Sections {
    fn into_sections(self) -> Vec<Section> {
        match self {
            Self::Pairs(pairs) => pairs
                .into_iter()
                .map(|(key, value)| Section::new(key, value))
                .collect(),
            Self::Object(map) => map
                .into_iter()
                .map(|(key, value)| Section::new(key, value))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Record {
    id: String,
    #[serde(default)]
    sections: Sections,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl From<Record> for Document {
    fn from(record: Record) -> Self {
        Self::builder()
            .id(record.id)
            .sections(record.sections.into_sections())
            .metadata(record.metadata)
            .build()
    }
}

/// Parses one record.
///
/// # Errors
///
/// Returns the JSON error if the line is not a valid record.
pub fn parse_record(line: &str) -> serde_json::Result<Document> {
    serde_json::from_str::<Record>(line).map(Document::from)
}

/// Reads every record from `reader`, skipping blank lines.
///
/// # Errors
///
/// Returns [`SyncError::Record`] with the line number of the first invalid
/// record, or an I/O error.
pub fn read_documents<R: BufRead>(reader: R) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let document = parse_record(&line).map_err(|source| SyncError::Record {
            line: index + 1,
            source,
        })?;
        documents.push(document);
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_sections_keep_order() {
        let document = parse_record(
            r#"{"id": "users_1", "sections": {"name": "Ada", "_ab_stream": "users", "age": 36}}"#,
        )
        .unwrap();

        assert_eq!(document.id, "users_1");
        assert_eq!(
            document.rendered_sections(),
            vec!["name: Ada".to_string(), "age: 36".to_string()]
        );
        assert_eq!(document.submitted_metadata()["_ab_stream"], "users");
    }

    #[test]
    fn test_pair_sections() {
        let document = parse_record(
            r#"{"id": "1", "sections": [["b", "x"], ["a", [1, 2]]], "metadata": {"k": {"v": 1}}}"#,
        )
        .unwrap();

        assert_eq!(
            document.rendered_sections(),
            vec!["b: x".to_string(), "a: [1,2]".to_string()]
        );
        assert_eq!(document.metadata["k"], json!({"v": 1}));
    }

    #[test]
    fn test_sections_and_metadata_optional() {
        let document = parse_record(r#"{"id": "bare"}"#).unwrap();
        assert!(document.sections.is_empty());
        assert!(document.metadata.is_empty());
    }

    #[test]
    fn test_read_documents_reports_line() {
        let input = "{\"id\": \"1\"}\n\n{\"sections\": {}}\n";

        match read_documents(input.as_bytes()) {
            Err(SyncError::Record { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_documents_skips_blank_lines() {
        let input = "{\"id\": \"1\"}\n   \n{\"id\": \"2\"}\n";
        let documents = read_documents(input.as_bytes()).unwrap();

        let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
