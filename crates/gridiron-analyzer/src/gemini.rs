//! Gemini REST client.
//!
//! Implements [`MediaService`] on top of the Gemini File API (resumable
//! upload, get, delete) and the `generateContent` endpoint.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use gridiron_models::{AssetState, RemoteAsset};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::service::{ApiKey, GenerateRequest, GenerateResponse, MediaService, ServiceConnector};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Builds [`GeminiClient`] sessions sharing one HTTP connection pool.
#[derive(Clone)]
pub struct GeminiConnector {
    client: Client,
    api_base: String,
}

impl GeminiConnector {
    /// Create a connector from analyzer configuration.
    pub fn new(config: &AnalyzerConfig) -> AnalyzerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalyzerError::config_error(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

impl ServiceConnector for GeminiConnector {
    fn connect(&self, credential: &ApiKey) -> AnalyzerResult<Arc<dyn MediaService>> {
        if credential.is_blank() {
            return Err(AnalyzerError::auth("API key is empty"));
        }
        if !credential.expose().chars().all(|c| c.is_ascii_graphic()) {
            return Err(AnalyzerError::auth("API key contains invalid characters"));
        }

        Ok(Arc::new(GeminiClient {
            api_key: credential.clone(),
            api_base: self.api_base.clone(),
            client: self.client.clone(),
        }))
    }
}

/// Gemini API client bound to one credential.
pub struct GeminiClient {
    api_key: ApiKey,
    api_base: String,
    client: Client,
}

/// File resource as returned by the File API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: AssetState,
    #[serde(default)]
    error: Option<FileError>,
}

#[derive(Debug, Deserialize)]
struct FileError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

impl FileResource {
    fn into_asset(self, fallback_mime: &str) -> RemoteAsset {
        if let Some(err) = &self.error {
            debug!(file = %self.name, "File API reported error: {}", err.message);
        }
        let mut asset = RemoteAsset::new(
            self.name,
            self.mime_type.unwrap_or_else(|| fallback_mime.to_string()),
            self.state,
        );
        asset.uri = self.uri;
        asset
    }
}

/// Gemini API request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl From<GeminiResponse> for GenerateResponse {
    fn from(response: GeminiResponse) -> Self {
        let candidate = response.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());

        let text: String = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        GenerateResponse {
            parsed: None,
            text: (!text.trim().is_empty()).then_some(text),
            finish_reason,
            block_reason: response.prompt_feedback.and_then(|f| f.block_reason),
        }
    }
}

/// Return the response if successful, otherwise classify the failure.
async fn check_status(response: Response) -> AnalyzerResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AnalyzerError::from_http_status(status.as_u16(), &body))
}

impl GeminiClient {
    fn resource_url(&self, name: &str) -> String {
        format!("{}/v1beta/{}", self.api_base, name.trim_start_matches('/'))
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base,
            model.trim_start_matches("models/")
        )
    }
}

#[async_trait]
impl MediaService for GeminiClient {
    async fn upload_file(&self, path: &Path, mime_type: &str) -> AnalyzerResult<RemoteAsset> {
        let size = tokio::fs::metadata(path).await?.len();
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video");

        info!(
            path = %path.display(),
            size_bytes = size,
            mime_type,
            "Uploading video to Gemini File API"
        );

        // 1. Open a resumable upload session
        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.api_base))
            .header(API_KEY_HEADER, self.api_key.expose())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AnalyzerError::upload("Upload session response carried no upload URL"))?;

        // 2. Stream the bytes and finalize
        let file = tokio::fs::File::open(path).await?;
        let response = self
            .client
            .post(&upload_url)
            .header(API_KEY_HEADER, self.api_key.expose())
            .header(CONTENT_LENGTH, size)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(reqwest::Body::wrap_stream(ReaderStream::new(file)))
            .send()
            .await?;
        let response = check_status(response).await?;

        let uploaded: UploadResponse = response.json().await?;
        let asset = uploaded.file.into_asset(mime_type);
        info!(file = %asset.name, state = %asset.state, "Upload accepted");
        Ok(asset)
    }

    async fn get_file(&self, name: &str) -> AnalyzerResult<RemoteAsset> {
        let response = self
            .client
            .get(self.resource_url(name))
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await?;
        let response = check_status(response).await?;

        let file: FileResource = response.json().await?;
        Ok(file.into_asset("application/octet-stream"))
    }

    async fn delete_file(&self, name: &str) -> AnalyzerResult<()> {
        let response = self
            .client
            .delete(self.resource_url(name))
            .header(API_KEY_HEADER, self.api_key.expose())
            .send()
            .await?;

        // Already gone counts as deleted
        if response.status() == StatusCode::NOT_FOUND {
            debug!(file = %name, "Delete of missing file");
            return Ok(());
        }
        check_status(response).await?;
        Ok(())
    }

    async fn generate_content(&self, request: &GenerateRequest) -> AnalyzerResult<GenerateResponse> {
        let body = GeminiRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        file_data: Some(FileData {
                            mime_type: &request.mime_type,
                            file_uri: &request.file_uri,
                        }),
                        text: None,
                    },
                    Part {
                        file_data: None,
                        text: Some(&request.prompt),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        };

        info!(model = %request.model, file_uri = %request.file_uri, "Calling Gemini generateContent");

        let response = self
            .client
            .post(self.generate_url(&request.model))
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let gemini_response: GeminiResponse = response.json().await?;
        Ok(gemini_response.into())
    }
}
