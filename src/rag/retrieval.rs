//! Retrieval service: builds the index once, answers nearest-chunk queries.
//!
//! Retrieval never fails its caller. Missing corpus, embedder outages and
//! index errors are logged and turned into an empty result, so generation
//! can still answer (ungrounded) instead of erroring.

use crate::rag::chunker::{Chunk, TextChunker};
use crate::rag::embeddings::{encode_batched, Embedder};
use crate::types::{AppError, Result};
use crate::utils::toml_config::RagConfig;
use chrono::{DateTime, Utc};
use ragline_vector::{DistanceMetric, FlatIndex};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A chunk together with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Ranked retrieval output, closest first, at most `k` long.
pub type RetrievalResult = Vec<RetrievedChunk>;

/// Index build settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub metric: DistanceMetric,
    pub max_chunk_chars: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            metric: DistanceMetric::default(),
            max_chunk_chars: 0,
            chunk_overlap: 0,
            embed_batch_size: 32,
        }
    }
}

impl From<&RagConfig> for IndexOptions {
    fn from(config: &RagConfig) -> Self {
        Self {
            metric: config.distance_metric,
            max_chunk_chars: config.max_chunk_chars,
            chunk_overlap: config.chunk_overlap,
            embed_batch_size: config.embed_batch_size,
        }
    }
}

/// Everything a successful build produces. Never mutated afterwards.
struct ReadyIndex {
    corpus: Vec<Chunk>,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
    built_at: DateTime<Utc>,
}

pub struct RetrievalService {
    ready: Option<ReadyIndex>,
    degraded_reason: Option<String>,
    metric: DistanceMetric,
}

impl RetrievalService {
    /// A service that never returns context.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            ready: None,
            degraded_reason: Some(reason.into()),
            metric: DistanceMetric::default(),
        }
    }

    /// Read the corpus file, chunk, embed and index it.
    ///
    /// Always returns a service; any failure leaves it degraded.
    #[instrument(skip(embedder, options), fields(model = embedder.model_name()))]
    pub async fn initialize(
        corpus_path: &Path,
        embedder: Arc<dyn Embedder>,
        options: IndexOptions,
    ) -> Self {
        info!("Initializing retrieval index");

        match tokio::fs::read_to_string(corpus_path).await {
            Ok(text) => Self::from_corpus_text(&text, embedder, options).await,
            Err(e) => {
                warn!(
                    "Corpus source {:?} unreadable ({}), retrieval disabled",
                    corpus_path, e
                );
                Self::degraded(format!("corpus unreadable: {}", e))
            }
        }
    }

    /// Build from corpus text already in memory.
    pub async fn from_corpus_text(
        text: &str,
        embedder: Arc<dyn Embedder>,
        options: IndexOptions,
    ) -> Self {
        match Self::build(text, embedder, options).await {
            Ok(ready) => {
                info!(
                    chunks = ready.corpus.len(),
                    dimension = ?ready.index.dimensions(),
                    "Retrieval index ready"
                );
                Self {
                    ready: Some(ready),
                    degraded_reason: None,
                    metric: options.metric,
                }
            }
            Err(e) => {
                warn!("Retrieval index build failed ({}), retrieval disabled", e);
                let mut service = Self::degraded(e.to_string());
                service.metric = options.metric;
                service
            }
        }
    }

    async fn build(
        text: &str,
        embedder: Arc<dyn Embedder>,
        options: IndexOptions,
    ) -> Result<ReadyIndex> {
        let corpus = TextChunker::new(options.max_chunk_chars, options.chunk_overlap).chunk(text);
        debug!(chunks = corpus.len(), "Chunked corpus");

        let texts: Vec<String> = corpus.iter().map(|c| c.text.clone()).collect();
        let vectors = encode_batched(embedder.as_ref(), &texts, options.embed_batch_size).await?;

        if vectors.len() != corpus.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} vectors, got {}",
                corpus.len(),
                vectors.len()
            )));
        }

        let index = FlatIndex::build_with_metric(&vectors, options.metric)?;

        Ok(ReadyIndex {
            corpus,
            index,
            embedder,
            built_at: Utc::now(),
        })
    }

    /// Return up to `k` chunks closest to `query`, closest first.
    ///
    /// Degraded services return immediately without embedding. Embedding and
    /// search failures are logged and yield an empty result.
    pub async fn retrieve(&self, query: &str, k: usize) -> RetrievalResult {
        let Some(ready) = &self.ready else {
            return Vec::new();
        };

        if ready.index.is_empty() || query.trim().is_empty() || k == 0 {
            return Vec::new();
        }

        let query_vector = match ready.embedder.encode(&[query.to_string()]).await {
            Ok(mut vectors) if vectors.len() == 1 => vectors.remove(0),
            Ok(vectors) => {
                warn!(
                    returned = vectors.len(),
                    "Embedder returned wrong vector count for query, answering without context"
                );
                return Vec::new();
            }
            Err(e) => {
                warn!("Query embedding failed ({}), answering without context", e);
                return Vec::new();
            }
        };

        let neighbors = match ready.index.search(&query_vector, k) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!("Index search failed ({}), answering without context", e);
                return Vec::new();
            }
        };

        debug!(
            ids = ?neighbors.iter().map(|n| n.id).collect::<Vec<_>>(),
            distances = ?neighbors.iter().map(|n| n.distance).collect::<Vec<_>>(),
            "Retrieved chunks"
        );

        neighbors
            .into_iter()
            .filter_map(|n| {
                ready.corpus.get(n.id).map(|chunk| RetrievedChunk {
                    chunk: chunk.clone(),
                    distance: n.distance,
                })
            })
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        self.ready.is_none()
    }

    /// Why retrieval is disabled, if it is.
    pub fn degraded_reason(&self) -> Option<&str> {
        self.degraded_reason.as_deref()
    }

    pub fn chunks(&self) -> &[Chunk] {
        self.ready.as_ref().map(|r| r.corpus.as_slice()).unwrap_or(&[])
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().len()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.ready.as_ref().and_then(|r| r.index.dimensions())
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn embedding_model(&self) -> Option<&str> {
        self.ready.as_ref().map(|r| r.embedder.model_name())
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.ready.as_ref().map(|r| r.built_at)
    }
}
