//! Process-wide vector client and its collection handles.

use super::{
    cosine_similarity, Attributes, IndexBackend, MemoryRecordStore, QueryMatch, Record,
    RecordStore, SqliteRecordStore,
};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{JarvisError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Owns the record store and embedder, and caches collection handles.
///
/// Create one per process and share it.
pub struct VectorClient {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn Embedder>,
    collections: Mutex<HashMap<String, Arc<Collection>>>,
}

impl VectorClient {
    /// Create a client over an existing store and embedder.
    pub fn new(store: Arc<dyn RecordStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Build the client described by `settings`: a persistent SQLite index
    /// when a path is configured, otherwise an in-memory one.
    pub fn open(settings: &Settings) -> Result<Self> {
        let embedder = Arc::new(OpenAIEmbedder::new(&settings.openai, &settings.embedding)?);

        let store: Arc<dyn RecordStore> = match settings.sqlite_path() {
            Some(path) => Arc::new(SqliteRecordStore::new(&path)?),
            None => {
                info!("Using in-memory vector index");
                Arc::new(MemoryRecordStore::new())
            }
        };

        Ok(Self::new(store, embedder))
    }

    /// Return the named collection, creating it on first use.
    ///
    /// Repeated calls with the same name return the same handle.
    pub async fn get_or_create_collection(&self, name: &str) -> Result<Arc<Collection>> {
        if name.trim().is_empty() {
            return Err(JarvisError::InvalidInput(
                "Collection name must not be empty".to_string(),
            ));
        }

        let mut collections = self.collections.lock().await;
        if let Some(collection) = collections.get(name) {
            return Ok(Arc::clone(collection));
        }

        self.store.ensure_collection(name).await?;

        let collection = Arc::new(Collection {
            name: name.to_string(),
            store: Arc::clone(&self.store),
            embedder: Arc::clone(&self.embedder),
        });
        collections.insert(name.to_string(), Arc::clone(&collection));

        debug!("Opened collection {}", name);
        Ok(collection)
    }

    /// Names of all collections in the underlying store.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.store.collections().await
    }
}

/// Handle to one named collection of the index.
pub struct Collection {
    name: String,
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn Embedder>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of records in the collection.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.name).await
    }

    fn dimension_mismatch(&self, what: &str, expected: usize, actual: usize) -> JarvisError {
        JarvisError::VectorStore(format!(
            "embedding dimension mismatch in {}: expected {}, {} has {}",
            self.name, expected, what, actual
        ))
    }
}

#[async_trait]
impl IndexBackend for Collection {
    #[instrument(skip_all, fields(collection = %self.name, count = ids.len()))]
    async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[Attributes],
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != metadatas.len() {
            return Err(JarvisError::InvalidInput(format!(
                "Mismatched upsert batch: {} ids, {} documents, {} metadatas",
                ids.len(),
                documents.len(),
                metadatas.len()
            )));
        }

        let embeddings = self.embedder.embed_batch(documents).await?;

        let stored = self.store.dimensions(&self.name).await?;
        for (id, embedding) in ids.iter().zip(&embeddings) {
            for expected in [self.embedder.dimensions(), stored].into_iter().flatten() {
                if embedding.len() != expected {
                    return Err(self.dimension_mismatch(
                        &format!("record {}", id),
                        expected,
                        embedding.len(),
                    ));
                }
            }
        }

        let records: Vec<Record> = ids
            .iter()
            .zip(documents)
            .zip(metadatas)
            .zip(embeddings)
            .map(|(((id, document), metadata), embedding)| Record {
                id: id.clone(),
                document: document.clone(),
                metadata: metadata.clone(),
                embedding,
            })
            .collect();

        self.store.upsert(&self.name, &records).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.name))]
    async fn query(&self, query_text: &str, n_results: usize) -> Result<Vec<QueryMatch>> {
        let query_embedding = self.embedder.embed(query_text).await?;
        let records = self.store.records(&self.name).await?;

        if let Some(record) = records
            .iter()
            .find(|r| r.embedding.len() != query_embedding.len())
        {
            return Err(self.dimension_mismatch(
                &format!("stored record {}", record.id),
                query_embedding.len(),
                record.embedding.len(),
            ));
        }

        let mut matches: Vec<QueryMatch> = records
            .into_iter()
            .map(|record| QueryMatch {
                distance: 1.0 - cosine_similarity(&query_embedding, &record.embedding),
                id: record.id,
                metadata: record.metadata,
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(n_results);

        debug!("Found {} matches", matches.len());
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::WordEmbedder;
    use serde_json::json;

    fn client() -> VectorClient {
        VectorClient::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(WordEmbedder::default()),
        )
    }

    fn meta(text: &str) -> Attributes {
        json!({ "text": text }).as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let client = client();
        let first = client.get_or_create_collection("test").await.unwrap();
        let second = client.get_or_create_collection("test").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "test");
        assert_eq!(client.list_collections().await.unwrap(), vec!["test"]);
    }

    #[tokio::test]
    async fn test_empty_collection_name_rejected() {
        let client = client();
        assert!(matches!(
            client.get_or_create_collection(" ").await,
            Err(JarvisError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_query_orders_by_distance() {
        let client = client();
        let collection = client.get_or_create_collection("food").await.unwrap();

        collection
            .upsert(
                &["1".to_string(), "2".to_string()],
                &["sushi rolls and ramen".to_string(), "tacos al pastor".to_string()],
                &[meta("sushi"), meta("tacos")],
            )
            .await
            .unwrap();

        let matches = collection.query("tacos", 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "2");
        assert!(matches[0].distance < matches[1].distance);

        let top = collection.query("tacos", 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].metadata, meta("tacos"));
    }

    #[tokio::test]
    async fn test_mismatched_batch_rejected() {
        let client = client();
        let collection = client.get_or_create_collection("food").await.unwrap();

        let result = collection
            .upsert(&["1".to_string()], &[], &[meta("x")])
            .await;
        assert!(matches!(result, Err(JarvisError::InvalidInput(_))));
        assert_eq!(collection.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_rejects_stored_dimension_mismatch() {
        let store = Arc::new(MemoryRecordStore::new());
        let client = VectorClient::new(store.clone(), Arc::new(WordEmbedder::default()));
        let collection = client.get_or_create_collection("food").await.unwrap();

        store
            .upsert(
                "food",
                &[Record {
                    id: "legacy".to_string(),
                    document: "tacos".to_string(),
                    metadata: meta("tacos"),
                    embedding: vec![1.0, 0.0, 0.0],
                }],
            )
            .await
            .unwrap();

        let err = collection.query("tacos", 1).await.unwrap_err();
        assert!(
            matches!(&err, JarvisError::VectorStore(msg) if msg.contains("dimension mismatch")),
            "unexpected error: {}",
            err
        );

        let err = collection
            .upsert(&["1".to_string()], &["tacos".to_string()], &[meta("tacos")])
            .await
            .unwrap_err();
        assert!(matches!(&err, JarvisError::VectorStore(msg) if msg.contains("dimension mismatch")));
        assert_eq!(collection.count().await.unwrap(), 1);
    }
}
