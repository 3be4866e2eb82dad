use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= API Request/Response Types =============

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The user's question. Missing and empty are treated alike.
    #[serde(default)]
    pub message: String,
}

/// One line of the `/chat` NDJSON response stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum StreamRecord {
    /// A text fragment relayed from the generation backend.
    Chunk { chunk: String, done: bool },
    /// Terminal failure; nothing follows it.
    Error { error: String },
}

impl StreamRecord {
    pub fn chunk(text: impl Into<String>, done: bool) -> Self {
        StreamRecord::Chunk {
            chunk: text.into(),
            done,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamRecord::Error {
            error: message.into(),
        }
    }

    /// True for the final fragment or an error record.
    pub fn is_terminal(&self) -> bool {
        match self {
            StreamRecord::Chunk { done, .. } => *done,
            StreamRecord::Error { .. } => true,
        }
    }

    /// Serialize as a single newline-terminated JSON line.
    pub fn to_ndjson_line(&self) -> String {
        let mut line = serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"failed to encode record"}"#.to_string());
        line.push('\n');
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Index built; retrieval produces context.
    Ok,
    /// No index; answers are generated without context.
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub chunks: usize,
    pub dimension: Option<usize>,
    pub distance_metric: String,
    pub embedding_model: Option<String>,
    pub generation_model: String,
    pub built_at: Option<DateTime<Utc>>,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index error: {0}")]
    Index(#[from] ragline_vector::Error),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::InvalidInput(_) => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            AppError::InvalidInput(msg) => msg,
            other => other.to_string(),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
