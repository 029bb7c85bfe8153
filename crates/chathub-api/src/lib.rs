//! # chathub-api
//!
//! HTTP API layer for ChatHub built on Axum.
//!
//! Provides the REST endpoints under `/api`, the `/ws` socket upgrade that
//! hands sessions to the real-time broker, the bearer-token extractor,
//! request DTOs, and the mapping from `AppError` to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
