//! Document-level add/search over one collection, with retries.

use super::{Attributes, Document, IndexBackend, VectorClient};
use crate::error::{JarvisError, Result};
use crate::retry::RetryPolicy;
use std::sync::Arc;
use tracing::instrument;

/// Number of results returned by a search when the caller has no preference.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Retrying document store bound to a single collection.
///
/// Every backend call goes through the same [`RetryPolicy`]; when the
/// attempts run out the backend's own error is returned.
#[derive(Clone)]
pub struct VectorCollection {
    name: String,
    backend: Arc<dyn IndexBackend>,
    retry: RetryPolicy,
}

impl VectorCollection {
    /// Wrap an existing backend.
    pub fn new(name: impl Into<String>, backend: Arc<dyn IndexBackend>, retry: RetryPolicy) -> Self {
        Self {
            name: name.into(),
            backend,
            retry,
        }
    }

    /// Open (creating if needed) the named collection of `client`.
    pub async fn open(client: &VectorClient, name: &str, retry: RetryPolicy) -> Result<Self> {
        let collection = client.get_or_create_collection(name).await?;
        Ok(Self::new(name, collection, retry))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Embed and index a document.
    ///
    /// Re-adding an existing id replaces the stored record.
    #[instrument(skip(self, document), fields(collection = %self.name, id = %document.id()))]
    pub async fn add(&self, document: &Document) -> Result<()> {
        let ids = [document.id().to_string()];
        let documents = [document.to_embed_str()];
        let metadatas = [document.attributes().clone()];

        self.retry
            .run("vector add", || self.backend.upsert(&ids, &documents, &metadatas))
            .await
    }

    /// Return the attributes of the `limit` documents closest to `query`,
    /// best match first.
    #[instrument(skip(self), fields(collection = %self.name))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Attributes>> {
        if limit == 0 {
            return Err(JarvisError::InvalidInput(
                "Search limit must be at least 1".to_string(),
            ));
        }

        let matches = self
            .retry
            .run("vector search", || self.backend.query(query, limit))
            .await?;

        Ok(matches.into_iter().map(|m| m.metadata).collect())
    }
}
