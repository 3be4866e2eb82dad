//! Mock embedders and generators for testing.
//!
//! These stand in for the Ollama backends so the retrieval service and the
//! HTTP layer can be exercised without network access.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ragline::llm::{GenerationBackend, RecordStream};
use ragline::rag::embeddings::Embedder;
use ragline::types::{AppError, Result, StreamRecord};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Dimension of [`MockEmbedder`] vectors.
pub const MOCK_DIMENSIONS: usize = 64;

/// Bag-of-words embedder.
///
/// Every lowercase word is hashed into one of [`MOCK_DIMENSIONS`] buckets and
/// the counts are L2-normalized, so texts sharing words land close together.
/// Deterministic across runs.
pub struct MockEmbedder {
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of `encode` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed_one(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let word = word.to_lowercase();
            // FNV-1a
            let hash = word.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });
            vector[(hash % MOCK_DIMENSIONS as u64) as usize] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-bow"
    }
}

/// Embedder that succeeds for the first `healthy_calls` calls, then fails.
///
/// With `healthy_calls = 0` the index build itself fails.
pub struct FailingEmbedder {
    healthy_calls: usize,
    calls: AtomicUsize,
}

impl FailingEmbedder {
    pub fn new(healthy_calls: usize) -> Arc<Self> {
        Arc::new(Self {
            healthy_calls,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n >= self.healthy_calls {
            return Err(AppError::Embedding("Mock embedder failure".to_string()));
        }
        Ok(texts.iter().map(|t| MockEmbedder::embed_one(t)).collect())
    }

    fn model_name(&self) -> &str {
        "mock-failing"
    }
}

/// Embedder whose first call (the index build) returns `build_dimensions`
/// wide vectors and every later call `query_dimensions` wide ones.
pub struct DriftingEmbedder {
    build_dimensions: usize,
    query_dimensions: usize,
    calls: AtomicUsize,
}

impl DriftingEmbedder {
    pub fn new(build_dimensions: usize, query_dimensions: usize) -> Arc<Self> {
        Arc::new(Self {
            build_dimensions,
            query_dimensions,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for DriftingEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let dimensions = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.build_dimensions
        } else {
            self.query_dimensions
        };
        Ok(texts
            .iter()
            .map(|t| {
                let mut vector = vec![0.0f32; dimensions];
                vector[0] = t.len() as f32;
                vector
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-drifting"
    }
}

/// Generator that replays fixed records and remembers every prompt it got.
#[derive(Clone)]
pub struct MockGenerator {
    records: Vec<StreamRecord>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    /// Streams `fragments` as chunks, the last one marked `done`.
    pub fn new(fragments: &[&str]) -> Self {
        let last = fragments.len().saturating_sub(1);
        let records = fragments
            .iter()
            .enumerate()
            .map(|(i, f)| StreamRecord::chunk(*f, i == last))
            .collect();
        Self::with_records(records)
    }

    pub fn with_records(records: Vec<StreamRecord>) -> Self {
        Self {
            records,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A backend that could not be reached.
    pub fn unreachable() -> Self {
        Self::with_records(vec![StreamRecord::error(
            "Could not connect to the generation backend. Is it running?",
        )])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl GenerationBackend for MockGenerator {
    fn generate(&self, prompt: String) -> RecordStream {
        self.prompts.lock().unwrap().push(prompt);
        stream::iter(self.records.clone()).boxed()
    }

    fn model_name(&self) -> &str {
        "mock-generator"
    }
}
