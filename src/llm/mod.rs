//! Generation backend clients
//!
//! Handlers talk to a [`GenerationBackend`], which turns a prompt into a
//! stream of [`StreamRecord`](crate::types::StreamRecord)s. The only shipped
//! backend is [`OllamaGenerator`].
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use ragline::llm::{GenerationBackend, OllamaGenerator};
//!
//! let generator = OllamaGenerator::new("http://localhost:11434", "mistral")?;
//! let mut records = generator.generate("What is 2+2?".to_string());
//! while let Some(record) = records.next().await {
//!     print!("{}", record.to_ndjson_line());
//! }
//! ```

/// Backend trait and stream type.
pub mod client;
/// Ollama `/api/generate` relay.
pub mod ollama;

pub use client::{GenerationBackend, RecordStream};
pub use ollama::OllamaGenerator;
