//! Vector store for Jarvis.
//!
//! Layers, bottom up:
//! - [`RecordStore`] keeps embedded records per named collection
//!   (SQLite on disk, or memory).
//! - [`VectorClient`] pairs a record store with an [`Embedder`](crate::embedding::Embedder)
//!   and hands out [`Collection`] handles, which implement the [`IndexBackend`]
//!   upsert/query boundary.
//! - [`VectorCollection`] wraps an [`IndexBackend`] with a retry policy and
//!   speaks in [`Document`]s.

mod client;
mod collection;
mod memory;
mod sqlite;

pub use client::{Collection, VectorClient};
pub use collection::{VectorCollection, DEFAULT_SEARCH_LIMIT};
pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary JSON attributes attached to a document.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Stable document identifier. Integer ids are stored in decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! document_id_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for DocumentId {
                fn from(id: $t) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

document_id_from_int!(i32, i64, u32, u64, usize);

/// A document to be embedded and indexed.
///
/// The id and attributes are fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    attributes: Attributes,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<DocumentId>, attributes: Attributes) -> Self {
        Self {
            id: id.into(),
            attributes,
        }
    }

    /// The document id.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// The attribute mapping stored as the document's metadata.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Canonical JSON serialization of the attributes; this is the text
    /// that gets embedded.
    ///
    /// Keys are emitted in sorted order, so the output is stable.
    pub fn to_embed_str(&self) -> String {
        serde_json::Value::Object(self.attributes.clone()).to_string()
    }
}

/// An embedded record as held by a [`RecordStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    /// The text that was embedded.
    pub document: String,
    pub metadata: Attributes,
    pub embedding: Vec<f32>,
}

/// A single nearest-neighbour match returned by [`IndexBackend::query`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub id: String,
    pub metadata: Attributes,
    /// Cosine distance to the query (lower is closer).
    pub distance: f32,
}

/// Storage for embedded records, partitioned into named collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the collection if it does not exist yet.
    async fn ensure_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace records by id. Returns the number written.
    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize>;

    /// All records in a collection.
    async fn records(&self, collection: &str) -> Result<Vec<Record>>;

    /// Names of all collections.
    async fn collections(&self) -> Result<Vec<String>>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Embedding length of the first stored record, or `None` when empty.
    async fn dimensions(&self, collection: &str) -> Result<Option<usize>>;
}

/// Upsert/query boundary of one collection in the embedding index.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Embed `documents` and store them with their ids and metadata.
    ///
    /// The three slices are parallel and must have equal length.
    async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[Attributes],
    ) -> Result<()>;

    /// Embed `query_text` and return up to `n_results` matches, closest first.
    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<QueryMatch>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_integer_id_is_stringified() {
        let doc = Document::new(123, attrs(json!({"text": "Hello, world!"})));
        assert_eq!(doc.id(), "123");

        let doc = Document::new(7u64, Attributes::new());
        assert_eq!(doc.id(), "7");
    }

    #[test]
    fn test_string_id_passes_through() {
        let doc = Document::new("taco-palenque", Attributes::new());
        assert_eq!(doc.id(), "taco-palenque");

        let doc = Document::new(String::from("007"), Attributes::new());
        assert_eq!(doc.id(), "007");
    }

    #[test]
    fn test_attributes_are_kept() {
        let data = attrs(json!({"text": "Hello, world!"}));
        let doc = Document::new("1", data.clone());
        assert_eq!(doc.attributes(), &data);
    }

    #[test]
    fn test_to_embed_str() {
        let doc = Document::new("1", attrs(json!({"text": "Hello, world!"})));
        assert_eq!(doc.to_embed_str(), r#"{"text":"Hello, world!"}"#);
    }

    #[test]
    fn test_to_embed_str_is_canonical() {
        let doc = Document::new(
            "1",
            attrs(json!({"name": "Taco Palenque", "city": "Edinburg", "rating": 4.5})),
        );
        let first = doc.to_embed_str();
        assert_eq!(first, doc.to_embed_str());
        assert_eq!(
            first,
            r#"{"city":"Edinburg","name":"Taco Palenque","rating":4.5}"#
        );
    }
}
