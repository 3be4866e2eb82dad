//! HTTP API tests with mock embedder and generator.

mod common;

use axum_test::TestServer;
use common::mocks::{MockEmbedder, MockGenerator};
use ragline::{
    AppState, IndexOptions, RaglineConfig, RetrievalService, StreamRecord,
    api::routes::create_router, types::HealthResponse,
};
use serde_json::json;
use std::sync::Arc;

const POWER_BACKUP: &str = "Power backup: Yes, diesel generators cover elevators and lighting.";

async fn ready_state(corpus: &str, generator: MockGenerator) -> AppState {
    let retrieval =
        RetrievalService::from_corpus_text(corpus, MockEmbedder::new(), IndexOptions::default())
            .await;
    AppState::new(RaglineConfig::default(), retrieval, Arc::new(generator))
}

fn server(state: AppState) -> TestServer {
    TestServer::new(create_router().with_state(state)).expect("Failed to create test server")
}

fn parse_ndjson(body: &str) -> Vec<StreamRecord> {
    body.lines()
        .map(|line| serde_json::from_str(line).expect("every line is a record"))
        .collect()
}

#[tokio::test]
async fn test_chat_streams_ndjson() {
    let generator = MockGenerator::new(&["Yes", ", diesel", " generators."]);
    let server = server(ready_state(POWER_BACKUP, generator.clone()).await);

    let response = server
        .post("/chat")
        .json(&json!({ "message": "Is there power backup?" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/x-ndjson");

    let body = response.text();
    assert!(body.ends_with('\n'));
    assert_eq!(
        parse_ndjson(&body),
        vec![
            StreamRecord::chunk("Yes", false),
            StreamRecord::chunk(", diesel", false),
            StreamRecord::chunk(" generators.", true),
        ]
    );
}

#[tokio::test]
async fn test_chat_prompt_contains_retrieved_context() {
    let generator = MockGenerator::new(&["ok"]);
    let server = server(ready_state(POWER_BACKUP, generator.clone()).await);

    server
        .post("/chat")
        .json(&json!({ "message": "Is there power backup?" }))
        .await
        .assert_status_ok();

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(&format!("Context:\n{}\n\nQuestion:", POWER_BACKUP)));
    assert!(prompts[0].contains("Question:\nIs there power backup?\n\nAnswer:"));
}

#[tokio::test]
async fn test_question_forwarded_verbatim() {
    let generator = MockGenerator::new(&["ok"]);
    let server = server(ready_state(POWER_BACKUP, generator.clone()).await);

    server
        .post("/chat")
        .json(&json!({ "message": "  Is there power backup?\n" }))
        .await
        .assert_status_ok();

    let prompts = generator.prompts();
    assert!(prompts[0].contains(&format!("Context:\n{}\n\nQuestion:", POWER_BACKUP)));
    assert!(prompts[0].contains("Question:\n  Is there power backup?\n\n\nAnswer:"));
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let generator = MockGenerator::new(&["never"]);
    let server = server(ready_state(POWER_BACKUP, generator.clone()).await);

    for body in [json!({ "message": "" }), json!({ "message": "   \n" }), json!({})] {
        let response = server.post("/chat").json(&body).await;
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert!(error["error"].as_str().unwrap().contains("empty"));
    }

    assert!(generator.prompts().is_empty());
}

#[tokio::test]
async fn test_degraded_mode_still_answers() {
    let generator = MockGenerator::new(&["I don't know."]);
    let state = AppState::new(
        RaglineConfig::default(),
        RetrievalService::degraded("corpus unreadable"),
        Arc::new(generator.clone()),
    );
    let server = server(state);

    let response = server
        .post("/chat")
        .json(&json!({ "message": "Is there a pool?" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        parse_ndjson(&response.text()),
        vec![StreamRecord::chunk("I don't know.", true)]
    );
    assert!(generator.prompts()[0].contains("Context:\n\n\nQuestion:"));
}

#[tokio::test]
async fn test_unreachable_backend_yields_single_error_record() {
    let server = server(ready_state(POWER_BACKUP, MockGenerator::unreachable()).await);

    let response = server
        .post("/chat")
        .json(&json!({ "message": "Is there power backup?" }))
        .await;

    // Headers are already sent when the backend is contacted
    response.assert_status_ok();
    let records = parse_ndjson(&response.text());
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], StreamRecord::Error { .. }));
}

#[tokio::test]
async fn test_health_ready() {
    let server = server(ready_state("one\n\ntwo\n\nthree", MockGenerator::new(&["x"])).await);

    let response = server.get("/health").await;
    response.assert_status_ok();

    let health: serde_json::Value = response.json();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["chunks"], 3);
    assert_eq!(health["dimension"], common::mocks::MOCK_DIMENSIONS);
    assert_eq!(health["distance_metric"], "squared_euclidean");
    assert_eq!(health["embedding_model"], "mock-bow");
    assert_eq!(health["generation_model"], "mock-generator");
}

#[tokio::test]
async fn test_health_degraded() {
    let state = AppState::new(
        RaglineConfig::default(),
        RetrievalService::degraded("no corpus"),
        Arc::new(MockGenerator::new(&["x"])),
    );
    let response = server(state).get("/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, ragline::types::ServiceStatus::Degraded);
    assert_eq!(health.chunks, 0);
    assert_eq!(health.dimension, None);
    assert!(health.built_at.is_none());
}

#[tokio::test]
async fn test_openapi_document() {
    let server = server(ready_state(POWER_BACKUP, MockGenerator::new(&["x"])).await);

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let doc: serde_json::Value = response.json();
    assert!(doc["paths"]["/chat"]["post"].is_object());
    assert!(doc["paths"]["/health"]["get"].is_object());
}
