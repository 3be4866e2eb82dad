use crate::{
    AppState,
    rag::prompt::{assemble_context, build_prompt},
    types::{AppError, ChatRequest, Result, StreamRecord},
};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use std::convert::Infallible;
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

/// NDJSON media type of the `/chat` response body.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Answer a question, streaming the generated text
///
/// Retrieval failures never fail the request; the answer is then generated
/// without context. Generation failures arrive as a final `{"error": ...}` line.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "NDJSON stream of answer fragments", body = StreamRecord, content_type = "application/x-ndjson"),
        (status = 400, description = "Empty message")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Response> {
    // Whitespace-only counts as empty, but the question is forwarded verbatim
    let question = payload.message.as_str();
    if question.trim().is_empty() {
        return Err(AppError::InvalidInput("Message cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    let hits = state
        .retrieval
        .retrieve(question, state.config.rag.top_k)
        .instrument(span.clone())
        .await;

    let context = assemble_context(&hits);
    let prompt = build_prompt(&context, question);

    span.in_scope(|| {
        info!(context_chunks = hits.len(), "Starting generation");
        debug!(prompt_len = prompt.len(), "Prompt assembled");
    });

    let records = state
        .generator
        .generate(prompt)
        .map(|record| Ok::<_, Infallible>(record.to_ndjson_line()));

    Ok((
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(records),
    )
        .into_response())
}
