//! In-process fakes shared by unit tests.

use crate::agent::HistorySink;
use crate::embedding::Embedder;
use crate::error::{JarvisError, Result};
use crate::llm::{ChatMessage, ChatModel, Role};
use crate::vector_store::{Attributes, IndexBackend, QueryMatch};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

const WORD_DIMENSIONS: usize = 1024;

/// Deterministic bag-of-words embedder: one hashed bucket per lowercase word.
#[derive(Debug, Default)]
pub struct WordEmbedder;

impl WordEmbedder {
    fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; WORD_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) % WORD_DIMENSIONS as u64;
            vector[bucket as usize] += 1.0;
        }
        vector
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

#[async_trait]
impl Embedder for WordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(Self::vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> Option<usize> {
        Some(WORD_DIMENSIONS)
    }
}

/// Index backend that fails a set number of calls before succeeding.
#[derive(Debug)]
pub struct FlakyBackend {
    failures_left: AtomicU32,
    upsert_calls: AtomicU32,
    query_calls: AtomicU32,
    upserted: Mutex<Vec<(String, String, Attributes)>>,
}

impl FlakyBackend {
    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            upsert_calls: AtomicU32::new(0),
            query_calls: AtomicU32::new(0),
            upserted: Mutex::new(Vec::new()),
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first(u32::MAX)
    }

    pub fn upsert_calls(&self) -> u32 {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> u32 {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn upserted(&self) -> Vec<(String, String, Attributes)> {
        self.upserted.lock().unwrap().clone()
    }

    fn check(&self, call: u32) -> Result<()> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                (left > 0).then(|| left - 1)
            })
            .is_ok();

        if failing {
            Err(JarvisError::VectorStore(format!(
                "backend unavailable (call {})",
                call
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IndexBackend for FlakyBackend {
    async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[Attributes],
    ) -> Result<()> {
        let call = self.upsert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check(call)?;

        let mut upserted = self.upserted.lock().unwrap();
        for ((id, document), metadata) in ids.iter().zip(documents).zip(metadatas) {
            upserted.push((id.clone(), document.clone(), metadata.clone()));
        }
        Ok(())
    }

    async fn query(&self, _query_text: &str, _n_results: usize) -> Result<Vec<QueryMatch>> {
        let call = self.query_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.check(call)?;
        Ok(Vec::new())
    }
}

/// Chat model that replays canned replies and records every request.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    fallback: Option<String>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// A model that gives the same reply forever.
    pub fn repeating(reply: &str) -> Self {
        Self {
            fallback: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| JarvisError::OpenAI("script exhausted".to_string()))
    }
}

/// History sink that keeps every recorded turn in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    turns: Mutex<Vec<(String, Role, String)>>,
    failing: bool,
}

impl RecordingSink {
    /// A sink whose writes always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn turns(&self) -> Vec<(String, Role, String)> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistorySink for RecordingSink {
    async fn record_turn(&self, thread_id: &str, role: Role, content: &str) -> Result<()> {
        if self.failing {
            return Err(JarvisError::Database(rusqlite::Error::InvalidQuery));
        }
        self.turns
            .lock()
            .unwrap()
            .push((thread_id.to_string(), role, content.to_string()));
        Ok(())
    }
}
