//! HTTP API handlers and routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! - `POST /chat` - Ask a question, receive a streamed NDJSON answer
//! - `GET /health` - Index and backend status
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Streaming format
//!
//! `/chat` responds with `Content-Type: application/x-ndjson`. Each line is
//! either `{"chunk": "...", "done": false|true}` or, on failure,
//! `{"error": "..."}`. The stream ends after the first `done: true` or error.

/// Request handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
