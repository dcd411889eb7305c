//! Analyzer error types.

use std::time::Duration;

use gridiron_models::{AssetState, ErrorKind, ErrorResult};
use thiserror::Error;

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Longest slice of an upstream error body kept in messages.
const MAX_BODY_IN_MESSAGE: usize = 500;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Asset {asset} finished processing in state {state}")]
    ProcessingFailed { asset: String, state: AssetState },

    #[error("Asset {asset} still processing after {attempts} checks ({waited:?})")]
    ProcessingTimeout {
        asset: String,
        attempts: u32,
        waited: Duration,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Response did not match the analysis schema: {0}")]
    SchemaValidation(String),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzerError {
    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn schema_validation(msg: impl Into<String>) -> Self {
        Self::SchemaValidation(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify a non-success HTTP response from the remote service.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        let message: String = body.trim().chars().take(MAX_BODY_IN_MESSAGE).collect();

        match status {
            401 | 403 => Self::Auth(message),
            400 if message.contains("API_KEY_INVALID") || message.contains("API key not valid") => {
                Self::Auth(message)
            }
            429 => Self::RateLimited(message),
            500..=599 => Self::Upstream { status, message },
            _ => Self::Request(format!("{status}: {message}")),
        }
    }

    /// Check if error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Upstream { .. } => true,
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Fold a transport error raised while staging into an upload failure.
    pub fn in_upload(self) -> Self {
        match self {
            Self::Auth(_)
            | Self::Cancelled
            | Self::Upload(_)
            | Self::ProcessingFailed { .. }
            | Self::ProcessingTimeout { .. } => self,
            other => Self::Upload(other.to_string()),
        }
    }

    /// Fold a transport error raised while generating into a generation failure.
    pub fn in_generation(self) -> Self {
        match self {
            Self::Auth(_) | Self::Cancelled | Self::Generation(_) | Self::SchemaValidation(_) => {
                self
            }
            other => Self::Generation(other.to_string()),
        }
    }

    /// Failure category reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Upload(_) => ErrorKind::Upload,
            Self::ProcessingFailed { .. } => ErrorKind::ProcessingFailed,
            Self::ProcessingTimeout { .. } => ErrorKind::Timeout,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Generation(_)
            | Self::RateLimited(_)
            | Self::Upstream { .. }
            | Self::Request(_)
            | Self::Network(_)
            | Self::Json(_) => ErrorKind::Generation,
            Self::SchemaValidation(_) => ErrorKind::SchemaValidation,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }
}

impl From<&AnalyzerError> for ErrorResult {
    fn from(err: &AnalyzerError) -> Self {
        ErrorResult::new(err.kind(), err.to_string())
    }
}
