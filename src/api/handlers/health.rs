use crate::{
    AppState,
    types::{HealthResponse, ServiceStatus},
};
use axum::{Json, extract::State};

/// Report index and backend status
///
/// Always 200: a degraded service still answers questions, only without
/// retrieved context.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let retrieval = &state.retrieval;

    let status = if retrieval.is_degraded() {
        ServiceStatus::Degraded
    } else {
        ServiceStatus::Ok
    };

    Json(HealthResponse {
        status,
        chunks: retrieval.chunk_count(),
        dimension: retrieval.dimension(),
        distance_metric: retrieval.metric().to_string(),
        embedding_model: retrieval.embedding_model().map(str::to_string),
        generation_model: state.generator.model_name().to_string(),
        built_at: retrieval.built_at(),
    })
}
