use crate::AppState;
use crate::api::handlers::{chat, health};
use crate::types::{ChatRequest, HealthResponse, ServiceStatus, StreamRecord};
use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// OpenAPI description of the service.
#[derive(OpenApi)]
#[openapi(
    info(title = "ragline", description = "Retrieval-augmented question answering over a fixed corpus"),
    paths(chat::chat, health::health),
    components(schemas(ChatRequest, StreamRecord, HealthResponse, ServiceStatus)),
    tags(
        (name = "chat", description = "Question answering"),
        (name = "health", description = "Service status")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// All service routes, without state.
pub fn create_router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat::chat))
        .route("/health", get(health::health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
