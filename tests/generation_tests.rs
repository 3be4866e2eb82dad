//! Generation relay tests against mocked Ollama servers.

mod common;

use axum_test::TestServer;
use common::mocks::MockEmbedder;
use futures::StreamExt;
use ragline::llm::ollama::CONNECT_ERROR_MESSAGE;
use ragline::{
    AppState, GenerationBackend, IndexOptions, OllamaGenerator, RaglineConfig, RetrievalService,
    StreamRecord, api::routes::create_router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============= Helper Functions =============

/// One backend NDJSON line
fn backend_line(response: &str, done: bool) -> String {
    format!(
        "{}\n",
        json!({
            "model": "mistral",
            "created_at": "2024-01-01T00:00:00Z",
            "response": response,
            "done": done
        })
    )
}

async fn mock_backend(body: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "mistral", "stream": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-ndjson")
                .set_body_string(body),
        )
        .mount(&server)
        .await;
    server
}

/// Read an HTTP request up to the end of the JSON body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !String::from_utf8_lossy(&request).contains("\"stream\":true}") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&request).into_owned()
}

async fn write_chunk(socket: &mut TcpStream, data: &str) -> std::io::Result<()> {
    socket
        .write_all(format!("{:x}\r\n{}\r\n", data.len(), data).as_bytes())
        .await?;
    socket.flush().await
}

const CHUNKED_HEADER: &str = "HTTP/1.1 200 OK\r\n\
                              content-type: application/x-ndjson\r\n\
                              transfer-encoding: chunked\r\n\r\n";

// ============= Relay Behavior =============

#[tokio::test]
async fn test_relays_until_done() {
    let body = [
        backend_line("Hi", false),
        backend_line("!", true),
        backend_line("never relayed", false),
    ]
    .concat();
    let server = mock_backend(body).await;
    let generator = OllamaGenerator::new(server.uri(), "mistral").unwrap();

    let records: Vec<_> = generator.generate("hello".to_string()).collect().await;

    assert_eq!(
        records,
        vec![StreamRecord::chunk("Hi", false), StreamRecord::chunk("!", true)]
    );
    assert_eq!(
        records
            .iter()
            .map(StreamRecord::to_ndjson_line)
            .collect::<String>(),
        "{\"chunk\":\"Hi\",\"done\":false}\n{\"chunk\":\"!\",\"done\":true}\n"
    );
}

#[tokio::test]
async fn test_unreachable_backend_single_error() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let generator = OllamaGenerator::new(format!("http://127.0.0.1:{}", port), "mistral").unwrap();

    let records: Vec<_> = generator.generate("hello".to_string()).collect().await;

    assert_eq!(records, vec![StreamRecord::error(CONNECT_ERROR_MESSAGE)]);
}

#[tokio::test]
async fn test_lines_split_across_reads() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let backend = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(CHUNKED_HEADER.as_bytes()).await.unwrap();

        let line_one = backend_line("Hel", false);
        let (head, tail) = line_one.split_at(10);
        for piece in [head, tail, "{\"response\":\"lo\",", "\"done\":true}\n"] {
            write_chunk(&mut socket, piece).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        // The client may already have hung up after the done record
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });

    let generator = OllamaGenerator::new(format!("http://{}", addr), "mistral").unwrap();
    let records: Vec<_> = generator.generate("hello".to_string()).collect().await;

    assert_eq!(
        records,
        vec![StreamRecord::chunk("Hel", false), StreamRecord::chunk("lo", true)]
    );
    backend.await.unwrap();
}

#[tokio::test]
async fn test_dropping_stream_closes_backend_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let backend = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request(&mut socket).await;
        socket.write_all(CHUNKED_HEADER.as_bytes()).await.unwrap();
        write_chunk(&mut socket, &backend_line("first", false))
            .await
            .unwrap();

        // Keep streaming until the client goes away
        for _ in 0..200 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            if write_chunk(&mut socket, &backend_line("more", false))
                .await
                .is_err()
            {
                return true;
            }
        }
        false
    });

    let generator = OllamaGenerator::new(format!("http://{}", addr), "mistral").unwrap();
    let mut records = generator.generate("hello".to_string());
    assert_eq!(
        records.next().await,
        Some(StreamRecord::chunk("first", false))
    );
    drop(records);

    let closed = tokio::time::timeout(Duration::from_secs(10), backend)
        .await
        .expect("backend task finished")
        .unwrap();
    assert!(closed, "backend connection should be closed after drop");
}

// ============= Through the HTTP API =============

#[tokio::test]
async fn test_chat_end_to_end() {
    let body = [
        backend_line("Yes", false),
        backend_line(", generators.", true),
    ]
    .concat();
    let backend = mock_backend(body).await;

    let retrieval = RetrievalService::from_corpus_text(
        "Power backup: Yes, diesel generators cover elevators and lighting.",
        MockEmbedder::new(),
        IndexOptions::default(),
    )
    .await;
    let generator = OllamaGenerator::new(backend.uri(), "mistral").unwrap();
    let state = AppState::new(RaglineConfig::default(), retrieval, Arc::new(generator));
    let server = TestServer::new(create_router().with_state(state)).unwrap();

    let response = server
        .post("/chat")
        .json(&json!({ "message": "Is there power backup?" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "{\"chunk\":\"Yes\",\"done\":false}\n{\"chunk\":\", generators.\",\"done\":true}\n"
    );

    let requests = backend.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let sent: serde_json::Value = requests[0].body_json().unwrap();
    assert!(
        sent["prompt"]
            .as_str()
            .unwrap()
            .contains("Power backup: Yes, diesel generators cover elevators and lighting.")
    );
}

#[tokio::test]
async fn test_chat_backend_error_status() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'mistral' not found"))
        .mount(&backend)
        .await;

    let generator = OllamaGenerator::new(backend.uri(), "mistral").unwrap();
    let state = AppState::new(
        RaglineConfig::default(),
        RetrievalService::degraded("no corpus"),
        Arc::new(generator),
    );
    let server = TestServer::new(create_router().with_state(state)).unwrap();

    let response = server
        .post("/chat")
        .json(&json!({ "message": "Hello?" }))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.text(),
        "{\"error\":\"Error from generation backend: 404\"}\n"
    );
}
