//! Axum HTTP front end for play analysis.
//!
//! This crate provides:
//! - `POST /analyze` multipart upload, streamed to a staging directory
//! - Health, readiness and Prometheus endpoints
//! - Per-IP rate limiting, request IDs and security headers

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
