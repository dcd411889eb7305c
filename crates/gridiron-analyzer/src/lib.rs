//! Play analysis pipeline.
//!
//! This crate provides:
//! - Asset staging with bounded, cancellable readiness polling
//! - Prompt construction with optional coaching personas
//! - Structured generation with retry on transient failures
//! - Guaranteed cleanup of remote assets and local uploads
//! - A Gemini REST client behind the `MediaService` seam

pub mod config;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod retry;
pub mod service;
pub mod uploader;

#[cfg(test)]
mod gemini_tests;

pub use config::{AnalyzerConfig, PollingConfig};
pub use error::{AnalyzerError, AnalyzerResult};
pub use gemini::{GeminiClient, GeminiConnector};
pub use logging::AnalysisLogger;
pub use orchestrator::{AnalysisRequest, PlayAnalyzer};
pub use prompt::build_prompt;
pub use retry::RetryConfig;
pub use service::{ApiKey, GenerateRequest, GenerateResponse, MediaService, ServiceConnector};
pub use uploader::AssetUploader;
