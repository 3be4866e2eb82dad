//! Ollama generation client (`POST /api/generate`, streamed NDJSON).

use crate::llm::client::{GenerationBackend, RecordStream};
use crate::types::{AppError, Result, StreamRecord};
use crate::utils::toml_config::GenerationConfig;
use async_stream::stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Emitted when the backend cannot be reached at all.
pub const CONNECT_ERROR_MESSAGE: &str =
    "Could not connect to the generation backend. Is it running?";

/// Longest backend line accepted before the stream is abandoned.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// One NDJSON line from the backend. Unknown fields are ignored.
///
/// Ollama reports failures after the status line (model unloaded, out of
/// memory) as `{"error": "..."}`.
#[derive(Deserialize)]
struct GenerateLine {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

pub struct OllamaGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    max_line_bytes: usize,
}

impl OllamaGenerator {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_connect_timeout(base_url, model, Duration::from_secs(10))
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        Self::with_connect_timeout(
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.connect_timeout_secs),
        )
    }

    fn with_connect_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // One connection per request; nothing is kept idle between requests
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AppError::Generation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_line_bytes: MAX_LINE_BYTES,
        })
    }
}

/// Parse one backend line. Blank and malformed lines yield `None`.
fn parse_line(line: &[u8]) -> Option<StreamRecord> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<GenerateLine>(line) {
        Ok(GenerateLine {
            error: Some(message),
            ..
        }) => {
            warn!("Generation backend reported an error: {}", message);
            Some(StreamRecord::error(format!(
                "Error from generation backend: {}",
                message
            )))
        }
        Ok(parsed) => Some(StreamRecord::chunk(parsed.response, parsed.done)),
        Err(e) => {
            debug!("Skipping malformed backend line: {}", e);
            None
        }
    }
}

impl GenerationBackend for OllamaGenerator {
    fn generate(&self, prompt: String) -> RecordStream {
        let request = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&GenerateRequest {
                model: self.model.clone(),
                prompt,
                stream: true,
            });
        let max_line_bytes = self.max_line_bytes;

        let output_stream = stream! {
            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    error!("Generation backend unreachable: {}", e);
                    yield StreamRecord::error(CONNECT_ERROR_MESSAGE);
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                warn!(%status, "Generation backend returned an error status");
                yield StreamRecord::error(format!(
                    "Error from generation backend: {}",
                    status.as_u16()
                ));
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            // Bytes before this offset are known to contain no newline
            let mut scanned = 0;

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        error!("Generation stream interrupted: {}", e);
                        yield StreamRecord::error(format!("Generation stream interrupted: {}", e));
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                while let Some(offset) = buffer[scanned..].iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=scanned + offset).collect();
                    scanned = 0;
                    if let Some(record) = parse_line(&line) {
                        let terminal = record.is_terminal();
                        yield record;
                        if terminal {
                            return;
                        }
                    }
                }
                scanned = buffer.len();

                if buffer.len() > max_line_bytes {
                    error!(
                        buffered = buffer.len(),
                        "Generation backend line exceeds {} bytes", max_line_bytes
                    );
                    yield StreamRecord::error(format!(
                        "Generation backend line exceeded {} bytes",
                        max_line_bytes
                    ));
                    return;
                }
            }

            // Final line without a trailing newline
            if let Some(record) = parse_line(&buffer) {
                yield record;
            }
        };

        Box::pin(output_stream)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
