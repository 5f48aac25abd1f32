//! SQLite-based record store.
//!
//! Embeddings are stored as little-endian f32 blobs and ranked in Rust.

use super::{Attributes, Record, RecordStore};
use crate::error::{JarvisError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS records (
        collection TEXT NOT NULL REFERENCES collections(name),
        id TEXT NOT NULL,
        document TEXT NOT NULL,
        metadata TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL,
        PRIMARY KEY (collection, id)
    );
"#;

/// SQLite-based record store.
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) a persistent store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite record store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| JarvisError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn require_collection(conn: &Connection, name: &str) -> Result<()> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM collections WHERE name = ?1",
                params![name],
                |_| Ok(()),
            )
            .optional()?;

        exists.ok_or_else(|| {
            JarvisError::VectorStore(format!("Collection does not exist: {}", name))
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self))]
    async fn ensure_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;
        let created = conn.execute(
            "INSERT OR IGNORE INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;

        if created > 0 {
            info!("Created collection {}", name);
        }
        Ok(())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, collection: &str, records: &[Record]) -> Result<usize> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let tx = conn.unchecked_transaction()?;
        let indexed_at = Utc::now().to_rfc3339();

        for record in records {
            let metadata = serde_json::to_string(&record.metadata)?;
            tx.execute(
                r#"
                INSERT INTO records
                (collection, id, document, metadata, embedding, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(collection, id) DO UPDATE SET
                    document = excluded.document,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding,
                    indexed_at = excluded.indexed_at
                "#,
                params![
                    collection,
                    record.id,
                    record.document,
                    metadata,
                    Self::embedding_to_bytes(&record.embedding),
                    indexed_at,
                ],
            )?;
        }

        tx.commit()?;
        debug!("Upserted {} records into {}", records.len(), collection);
        Ok(records.len())
    }

    #[instrument(skip(self))]
    async fn records(&self, collection: &str) -> Result<Vec<Record>> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, document, metadata, embedding
            FROM records
            WHERE collection = ?1
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let embedding: Vec<u8> = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                embedding,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, document, metadata, embedding) = row?;
            let metadata: Attributes = serde_json::from_str(&metadata)?;
            records.push(Record {
                id,
                document,
                metadata,
                embedding: Self::bytes_to_embedding(&embedding),
            });
        }

        debug!("Loaded {} records from {}", records.len(), collection);
        Ok(records)
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT name FROM collections ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn dimensions(&self, collection: &str) -> Result<Option<usize>> {
        let conn = self.lock()?;
        Self::require_collection(&conn, collection)?;

        let bytes: Option<i64> = conn
            .query_row(
                "SELECT length(embedding) FROM records WHERE collection = ?1 ORDER BY rowid LIMIT 1",
                params![collection],
                |row| row.get(0),
            )
            .optional()?;
        Ok(bytes.map(|b| b as usize / std::mem::size_of::<f32>()))
    }
}
