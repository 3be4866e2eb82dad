//! Retrieval Augmented Generation (RAG) pipeline
//!
//! The corpus is loaded once at startup and never changes while the
//! service runs.
//!
//! # Module Structure
//!
//! - [`rag::chunker`](crate::rag::chunker) - Paragraph chunking with optional size caps
//! - [`rag::embeddings`](crate::rag::embeddings) - The [`Embedder`](crate::rag::embeddings::Embedder) trait and its backends
//! - [`rag::retrieval`](crate::rag::retrieval) - Index build and nearest-chunk lookup
//! - [`rag::prompt`](crate::rag::prompt) - Context assembly and the generation prompt
//!
//! # Pipeline
//!
//! 1. **Chunking** - Corpus text is split on blank lines
//! 2. **Indexing** - Every chunk is embedded and stored in a flat index
//! 3. **Retrieval** - The question is embedded and the closest chunks returned
//! 4. **Prompting** - Chunk texts are joined into the prompt's context block
//!
//! # Example
//!
//! ```ignore
//! use ragline::rag::{embeddings, prompt, retrieval::{IndexOptions, RetrievalService}};
//!
//! let embedder = embeddings::from_config(&config.embeddings)?;
//! let service = RetrievalService::initialize(path, embedder, IndexOptions::from(&config.rag)).await;
//!
//! let hits = service.retrieve("Is there power backup?", 5).await;
//! let prompt = prompt::build_prompt(&prompt::assemble_context(&hits), "Is there power backup?");
//! ```

pub mod chunker;
pub mod embeddings;
pub mod prompt;
pub mod retrieval;
