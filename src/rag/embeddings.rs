//! Text embedding backends.
//!
//! The retrieval service only depends on the [`Embedder`] trait: a batch of
//! strings in, one fixed-length vector per string out, in the same order.

use crate::types::{AppError, Result};
use crate::utils::toml_config::EmbeddingsConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text, returning vectors in input order.
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}

/// Embed `texts` in batches of at most `batch_size`, preserving order.
///
/// Fails if any batch comes back with the wrong number of vectors.
pub async fn encode_batched(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let batch_size = batch_size.max(1);
    let mut vectors = Vec::with_capacity(texts.len());

    for (n, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = embedder.encode(batch).await?;
        if embedded.len() != batch.len() {
            return Err(AppError::Embedding(format!(
                "Embedder returned {} vectors for {} texts",
                embedded.len(),
                batch.len()
            )));
        }
        debug!(batch = n, size = batch.len(), "Embedded batch");
        vectors.extend(embedded);
    }

    Ok(vectors)
}

/// Create the embedder selected by configuration.
pub fn from_config(config: &EmbeddingsConfig) -> Result<Arc<dyn Embedder>> {
    match config {
        EmbeddingsConfig::Ollama { base_url, model } => {
            Ok(Arc::new(OllamaEmbedder::new(base_url.clone(), model.clone())))
        }
        #[cfg(feature = "local-embeddings")]
        EmbeddingsConfig::Local { model } => Ok(Arc::new(LocalEmbedder::new(model)?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingsConfig::Local { model } => Err(AppError::Config(format!(
            "Local embedding model '{}' requested but ragline was built without the \
             `local-embeddings` feature",
            model
        ))),
    }
}

// ============================================================================
// Ollama
// ============================================================================

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Embeddings served by an Ollama instance (`POST /api/embed`).
pub struct OllamaEmbedder {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: String, model: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, model)
    }

    pub fn with_client(http: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Ollama embed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Ollama embed failed ({}): {}",
                status, text
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Invalid embed response: {}", e)))?;

        if body.embeddings.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Ollama returned {} embeddings for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }

        Ok(body.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// fastembed (local ONNX)
// ============================================================================

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;

#[cfg(feature = "local-embeddings")]
mod local {
    use super::Embedder;
    use crate::types::{AppError, Result};
    use async_trait::async_trait;
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// In-process sentence embeddings. Inference runs on the blocking pool.
    pub struct LocalEmbedder {
        model: Arc<Mutex<TextEmbedding>>,
        name: String,
    }

    fn resolve_model(name: &str) -> Result<EmbeddingModel> {
        match name {
            "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
                Ok(EmbeddingModel::AllMiniLML6V2)
            }
            "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            other => Err(AppError::Config(format!(
                "Unsupported local embedding model: {}",
                other
            ))),
        }
    }

    impl LocalEmbedder {
        pub fn new(model_name: &str) -> Result<Self> {
            let model = TextEmbedding::try_new(
                InitOptions::new(resolve_model(model_name)?).with_show_download_progress(true),
            )
            .map_err(|e| AppError::Embedding(e.to_string()))?;

            Ok(Self {
                model: Arc::new(Mutex::new(model)),
                name: model_name.to_string(),
            })
        }
    }

    #[async_trait]
    impl Embedder for LocalEmbedder {
        async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let model = Arc::clone(&self.model);
            let texts = texts.to_vec();

            tokio::task::spawn_blocking(move || model.lock().embed(texts, None))
                .await
                .map_err(|e| AppError::Internal(format!("Embedding task failed: {}", e)))?
                .map_err(|e| AppError::Embedding(e.to_string()))
        }

        fn model_name(&self) -> &str {
            &self.name
        }
    }
}
