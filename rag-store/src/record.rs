//! Core data models used by the library.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Metadata attached to every stored document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Ranked keywords, most relevant first.
    ///
    /// Older collections stored them as one `"a, b, c"` string; both shapes load.
    #[serde(default, deserialize_with = "keywords_from_list_or_csv")]
    pub keywords: Vec<String>,
    /// Origin of the document (usually the knowledge-base file name).
    #[serde(default)]
    pub source: String,
}

impl DocumentMetadata {
    pub fn new(keywords: Vec<String>, source: impl Into<String>) -> Self {
        Self {
            keywords,
            source: source.into(),
        }
    }
}

/// Canonical record persisted by a collection.
///
/// `id` is `doc_<index>`; insertion order equals id order. The embedding is
/// never rewritten once stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: DocumentMetadata,
}

/// One row of a similarity search.
///
/// Every field is optional: rows whose stored content or metadata could not
/// be decoded still keep their slot in the result.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RetrievedDocument {
    pub content: Option<String>,
    pub metadata: Option<DocumentMetadata>,
    pub distance: Option<f32>,
}

/// Column-oriented search output, one entry per hit in each column.
#[derive(Clone, Debug, Default)]
pub struct QueryColumns {
    pub documents: Vec<Option<String>>,
    pub metadatas: Vec<Option<DocumentMetadata>>,
    pub distances: Vec<Option<f32>>,
}

impl QueryColumns {
    /// Zips the columns into rows, padding short `metadatas`/`distances` with `None`.
    ///
    /// The `documents` column defines the row count.
    pub fn into_rows(self) -> Vec<RetrievedDocument> {
        let mut metadatas = self.metadatas.into_iter();
        let mut distances = self.distances.into_iter();

        self.documents
            .into_iter()
            .map(|content| RetrievedDocument {
                content,
                metadata: metadatas.next().flatten(),
                distance: distances.next().flatten(),
            })
            .collect()
    }
}

fn keywords_from_list_or_csv<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(de)?;
    Ok(match raw {
        Value::String(s) => split_keywords(&s),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "keywords must be a list or a comma-separated string, got {other}"
            )));
        }
    })
}

/// Splits a `"a, b,c"` keyword string into trimmed, non-empty items.
pub fn split_keywords(s: &str) -> Vec<String> {
    s.split([',', '，'])
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
