//! TOML-based configuration for Ragline
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. The TOML file (`ragline.toml` unless `--config` says otherwise)
//! 3. `RAGLINE_*` environment variables (a `.env` file is loaded first)
//!
//! A missing file is not fatal; the server runs on defaults. A file that
//! exists but does not parse or validate is.

use ragline_vector::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `server.host`
pub const ENV_HOST: &str = "RAGLINE_HOST";
/// Environment variable overriding `server.port`
pub const ENV_PORT: &str = "RAGLINE_PORT";
/// Environment variable overriding `server.log_level`
pub const ENV_LOG_LEVEL: &str = "RAGLINE_LOG_LEVEL";
/// Environment variable overriding `rag.corpus_path`
pub const ENV_CORPUS_PATH: &str = "RAGLINE_CORPUS_PATH";
/// Environment variable overriding `generation.base_url`
pub const ENV_OLLAMA_URL: &str = "RAGLINE_OLLAMA_URL";
/// Environment variable overriding `generation.model`
pub const ENV_MODEL: &str = "RAGLINE_MODEL";

/// Root configuration structure loaded from ragline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaglineConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub rag: RagConfig,

    #[serde(default)]
    pub embeddings: EmbeddingsConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

// ============= Generation Backend Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Ollama server root, without the `/api/generate` path
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Bound on establishing the connection only; streaming is not time-limited
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_generation_model() -> String {
    "mistral".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: default_generation_model(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// ============= RAG Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    #[serde(default = "default_corpus_path")]
    pub corpus_path: PathBuf,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub distance_metric: DistanceMetric,

    /// Split paragraphs longer than this many characters; 0 disables capping
    #[serde(default)]
    pub max_chunk_chars: usize,

    /// Characters shared between neighboring windows of a capped paragraph
    #[serde(default)]
    pub chunk_overlap: usize,

    #[serde(default = "default_embed_batch_size")]
    pub embed_batch_size: usize,
}

fn default_corpus_path() -> PathBuf {
    PathBuf::from("data").join("source.txt")
}

fn default_top_k() -> usize {
    5
}

fn default_embed_batch_size() -> usize {
    32
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            corpus_path: default_corpus_path(),
            top_k: default_top_k(),
            distance_metric: DistanceMetric::default(),
            max_chunk_chars: 0,
            chunk_overlap: 0,
            embed_batch_size: default_embed_batch_size(),
        }
    }
}

// ============= Embeddings Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingsConfig {
    /// Remote embeddings through Ollama's `/api/embed`
    Ollama {
        #[serde(default = "default_ollama_url")]
        base_url: String,
        #[serde(default = "default_ollama_embedding_model")]
        model: String,
    },
    /// In-process ONNX embeddings (feature `local-embeddings`)
    Local {
        #[serde(default = "default_local_embedding_model")]
        model: String,
    },
}

fn default_ollama_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_local_embedding_model() -> String {
    "all-MiniLM-L6-v2".to_string()
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        EmbeddingsConfig::Ollama {
            base_url: default_ollama_url(),
            model: default_ollama_embedding_model(),
        }
    }
}

impl EmbeddingsConfig {
    pub fn model(&self) -> &str {
        match self {
            EmbeddingsConfig::Ollama { model, .. } => model,
            EmbeddingsConfig::Local { model } => model,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to render TOML: {0}")]
    RenderError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{name}' has invalid value '{value}'")]
    InvalidEnvVar { name: String, value: String },
}

impl RaglineConfig {
    /// Load configuration from a TOML file that must exist, then apply
    /// environment overrides and validate the result
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: RaglineConfig = toml::from_str(&content)?;

        config.finish()
    }

    /// Like [`RaglineConfig::load`], but a missing file means defaults.
    ///
    /// Runs before logging is set up, so callers report the missing file.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => RaglineConfig::default().finish(),
            other => other,
        }
    }

    fn finish(mut self) -> Result<Self, ConfigError> {
        self.apply_env_overrides()?;
        self.validate()?;
        Ok(self)
    }

    /// Apply `RAGLINE_*` variables from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment, in production)
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidEnvVar {
                name: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.server.log_level = level;
        }
        if let Some(path) = lookup(ENV_CORPUS_PATH) {
            self.rag.corpus_path = PathBuf::from(path);
        }
        if let Some(url) = lookup(ENV_OLLAMA_URL) {
            self.generation.base_url = url;
        }
        if let Some(model) = lookup(ENV_MODEL) {
            self.generation.model = model;
        }
        Ok(())
    }

    /// Validate the configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.rag.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "rag.top_k must be at least 1".to_string(),
            ));
        }

        if self.rag.embed_batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "rag.embed_batch_size must be at least 1".to_string(),
            ));
        }

        if self.rag.max_chunk_chars > 0 && self.rag.chunk_overlap >= self.rag.max_chunk_chars {
            return Err(ConfigError::ValidationError(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.max_chunk_chars ({})",
                self.rag.chunk_overlap, self.rag.max_chunk_chars
            )));
        }

        if self.generation.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "generation.model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Render the effective configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
