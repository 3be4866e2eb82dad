//! # ragline - retrieval-augmented question answering server
//!
//! ragline answers natural-language questions about a fixed text corpus. At
//! startup the corpus is split into paragraphs, every paragraph is embedded
//! and held in an exact nearest-neighbor index. Each question is embedded, the
//! closest paragraphs are placed into a prompt, and the answer produced by an
//! Ollama-compatible backend is relayed to the caller as newline-delimited
//! JSON while it is being generated.
//!
//! ## Overview
//!
//! ragline can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `ragline-server` binary
//! 2. **As a library** - Build an [`AppState`] and mount [`api::routes::create_router`]
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use ragline::{AppState, RaglineConfig, api::routes::create_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RaglineConfig::load_or_default("ragline.toml")?;
//!     let state = AppState::initialize(config).await?;
//!
//!     let app = create_router().with_state(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Degraded mode
//!
//! If the corpus cannot be read or embedded, the server still starts. Every
//! question is then answered without retrieved context and `/health`
//! reports `"degraded"`.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `local-embeddings` | In-process embeddings via fastembed (ONNX) |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`cli`] - Command-line parsing and terminal output
//! - [`llm`] - Generation backend clients
//! - [`rag`] - Chunking, embedding, retrieval and prompt assembly
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Generation backend clients.
pub mod llm;
/// Retrieval Augmented Generation (RAG) components.
pub mod rag;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use llm::{GenerationBackend, OllamaGenerator, RecordStream};
pub use rag::embeddings::Embedder;
pub use rag::retrieval::{IndexOptions, RetrievalService, RetrievedChunk};
pub use types::{AppError, Result, StreamRecord};
pub use utils::toml_config::RaglineConfig;

use std::sync::Arc;

/// Application state shared across handlers
///
/// Everything in here is read-only once the server starts.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration (file, then environment overrides)
    pub config: Arc<RaglineConfig>,
    /// Corpus index, built once at startup
    pub retrieval: Arc<RetrievalService>,
    /// Streaming text generator
    pub generator: Arc<dyn GenerationBackend>,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn new(
        config: RaglineConfig,
        retrieval: RetrievalService,
        generator: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            retrieval: Arc::new(retrieval),
            generator,
        }
    }

    /// Build the retrieval index and generation client described by `config`.
    ///
    /// Corpus and embedder problems leave retrieval degraded rather than
    /// failing; only an unusable HTTP client configuration is an error.
    pub async fn initialize(config: RaglineConfig) -> Result<Self> {
        let retrieval = match rag::embeddings::from_config(&config.embeddings) {
            Ok(embedder) => {
                RetrievalService::initialize(
                    &config.rag.corpus_path,
                    embedder,
                    IndexOptions::from(&config.rag),
                )
                .await
            }
            Err(e) => {
                tracing::warn!("Embedder unavailable ({}), retrieval disabled", e);
                RetrievalService::degraded(e.to_string())
            }
        };
        let generator = Arc::new(OllamaGenerator::from_config(&config.generation)?);

        Ok(Self::new(config, retrieval, generator))
    }
}
