//! Remote media/generation service seam.
//!
//! The orchestrator only talks to the remote side through these traits, so
//! the Gemini REST client can be swapped for an in-process fake in tests.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use gridiron_models::RemoteAsset;
use serde_json::Value;

use crate::error::AnalyzerResult;

/// Credential for the remote service. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// One structured-generation call.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Model identifier, e.g. `gemini-2.0-flash`
    pub model: String,
    /// URI of the staged asset
    pub file_uri: String,
    /// MIME type of the staged asset
    pub mime_type: String,
    /// Instruction text
    pub prompt: String,
    /// Output constraint in the service's schema dialect
    pub response_schema: Value,
}

impl GenerateRequest {
    pub fn new(
        model: impl Into<String>,
        asset: &RemoteAsset,
        prompt: impl Into<String>,
        response_schema: Value,
    ) -> Self {
        Self {
            model: model.into(),
            file_uri: asset.uri.clone().unwrap_or_else(|| asset.name.clone()),
            mime_type: asset.mime_type.clone(),
            prompt: prompt.into(),
            response_schema,
        }
    }
}

/// Raw generation result, before schema validation.
#[derive(Debug, Clone, Default)]
pub struct GenerateResponse {
    /// Structured object, when the service already parsed the output
    pub parsed: Option<Value>,
    /// Concatenated text output
    pub text: Option<String>,
    /// Why generation stopped, e.g. `STOP`, `SAFETY`, `MAX_TOKENS`
    pub finish_reason: Option<String>,
    /// Why the prompt was blocked, if it was
    pub block_reason: Option<String>,
}

impl GenerateResponse {
    /// Response carrying only text output.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            finish_reason: Some("STOP".to_string()),
            ..Default::default()
        }
    }

    /// Response carrying an already-parsed structured object.
    pub fn from_parsed(parsed: Value) -> Self {
        Self {
            parsed: Some(parsed),
            finish_reason: Some("STOP".to_string()),
            ..Default::default()
        }
    }
}

/// Asset storage and generation operations of the remote service.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Upload a local file; the returned asset may still be processing.
    async fn upload_file(&self, path: &Path, mime_type: &str) -> AnalyzerResult<RemoteAsset>;

    /// Fetch the current state of an asset.
    async fn get_file(&self, name: &str) -> AnalyzerResult<RemoteAsset>;

    /// Delete an asset.
    async fn delete_file(&self, name: &str) -> AnalyzerResult<()>;

    /// Run one structured-generation request.
    async fn generate_content(&self, request: &GenerateRequest) -> AnalyzerResult<GenerateResponse>;
}

/// Opens a [`MediaService`] session for a credential.
pub trait ServiceConnector: Send + Sync {
    fn connect(&self, credential: &ApiKey) -> AnalyzerResult<Arc<dyn MediaService>>;
}
