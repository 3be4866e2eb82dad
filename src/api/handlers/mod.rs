//! API request handlers.

/// Question answering with streamed output.
pub mod chat;
/// Service status.
pub mod health;
