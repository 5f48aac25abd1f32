//! In-memory record store.
//!
//! Useful for testing and for sessions that don't need a persistent index.

use super::{Record, RecordStore};
use crate::error::{JarvisError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Collections = HashMap<String, Vec<Record>>;

/// In-memory record store. Records keep insertion order within a collection.
#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<Collections>,
}

impl MemoryRecordStore {
    /// Create a new in-memory record store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| JarvisError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| JarvisError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }
}

fn missing(collection: &str) -> JarvisError {
    JarvisError::VectorStore(format!("Collection does not exist: {}", collection))
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        self.write()?.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize> {
        let mut collections = self.write()?;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| missing(collection))?;

        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record.clone(),
                None => stored.push(record.clone()),
            }
        }
        Ok(records.len())
    }

    async fn records(&self, collection: &str) -> Result<Vec<Record>> {
        self.read()?
            .get(collection)
            .cloned()
            .ok_or_else(|| missing(collection))
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.read()?
            .get(collection)
            .map(Vec::len)
            .ok_or_else(|| missing(collection))
    }

    async fn dimensions(&self, collection: &str) -> Result<Option<usize>> {
        self.read()?
            .get(collection)
            .map(|stored| stored.first().map(|r| r.embedding.len()))
            .ok_or_else(|| missing(collection))
    }
}
