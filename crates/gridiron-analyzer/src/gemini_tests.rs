//! Tests for the Gemini REST client against a mock server.

use std::sync::Arc;

use gridiron_models::{response_schema, AssetState, RemoteAsset};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::gemini::GeminiConnector;
use crate::service::{ApiKey, GenerateRequest, MediaService, ServiceConnector};

// =============================================================================
// Test Helpers
// =============================================================================

const KEY: &str = "test-key";

fn client_for(server: &MockServer) -> Arc<dyn MediaService> {
    let config = AnalyzerConfig {
        api_base: server.uri(),
        ..Default::default()
    };
    GeminiConnector::new(&config)
        .unwrap()
        .connect(&ApiKey::new(KEY))
        .unwrap()
}

fn file_json(state: &str) -> Value {
    json!({
        "name": "files/abc123",
        "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
        "mimeType": "video/mp4",
        "state": state
    })
}

// =============================================================================
// File API
// =============================================================================

#[tokio::test]
async fn test_resumable_upload() {
    let server = MockServer::start().await;
    let session_url = format!("{}/upload-session/abc", server.uri());

    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .and(header("x-goog-api-key", KEY))
        .and(header("X-Goog-Upload-Protocol", "resumable"))
        .and(header("X-Goog-Upload-Command", "start"))
        .and(header("X-Goog-Upload-Header-Content-Length", "11"))
        .and(header("X-Goog-Upload-Header-Content-Type", "video/mp4"))
        .and(body_partial_json(json!({ "file": { "display_name": "play1.mp4" } })))
        .respond_with(ResponseTemplate::new(200).insert_header("x-goog-upload-url", session_url.as_str()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/upload-session/abc"))
        .and(header("X-Goog-Upload-Offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "file": file_json("PROCESSING") })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let video = dir.path().join("play1.mp4");
    std::fs::write(&video, b"hello video").unwrap();

    let asset = client_for(&server).upload_file(&video, "video/mp4").await.unwrap();
    assert_eq!(asset.name, "files/abc123");
    assert_eq!(asset.state, AssetState::Processing);
    assert!(asset.uri.is_some());

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/upload-session/abc")
        .unwrap();
    assert_eq!(upload.body, b"hello video");
}

#[tokio::test]
async fn test_upload_without_session_url_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let video = dir.path().join("play1.mp4");
    std::fs::write(&video, b"x").unwrap();

    let err = client_for(&server).upload_file(&video, "video/mp4").await.unwrap_err();
    assert!(matches!(err, AnalyzerError::Upload(_)));
}

#[tokio::test]
async fn test_invalid_key_on_upload_is_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let video = dir.path().join("play1.mp4");
    std::fs::write(&video, b"x").unwrap();

    let err = client_for(&server).upload_file(&video, "video/mp4").await.unwrap_err();
    assert!(matches!(err.in_upload(), AnalyzerError::Auth(_)));
}

#[tokio::test]
async fn test_get_file_reads_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .and(header("x-goog-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("ACTIVE")))
        .mount(&server)
        .await;

    let asset = client_for(&server).get_file("files/abc123").await.unwrap();
    assert_eq!(asset.state, AssetState::Active);
    assert_eq!(asset.mime_type, "video/mp4");
}

#[tokio::test]
async fn test_get_file_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_file("files/abc123").await.unwrap_err();
    assert!(matches!(err, AnalyzerError::Upstream { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_delete_file_tolerates_missing() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1beta/files/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_file("files/abc123").await.unwrap();
    client.delete_file("files/gone").await.unwrap();
}

// =============================================================================
// Generation
// =============================================================================

fn generate_request() -> GenerateRequest {
    let asset = RemoteAsset::new("files/abc123", "video/mp4", AssetState::Active)
        .with_uri("https://generativelanguage.googleapis.com/v1beta/files/abc123");
    GenerateRequest::new("gemini-2.0-flash", &asset, "Break down the play.", response_schema(false))
}

#[tokio::test]
async fn test_generate_content_request_shape() {
    let server = MockServer::start().await;
    let analysis = json!({ "offense": {}, "defense": {} });

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": format!("```json\n{}\n```", analysis) }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_content(&generate_request())
        .await
        .unwrap();
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
    assert!(response.text.unwrap().contains("\"offense\""));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["fileData"]["mimeType"], "video/mp4");
    assert_eq!(
        parts[0]["fileData"]["fileUri"],
        "https://generativelanguage.googleapis.com/v1beta/files/abc123"
    );
    assert_eq!(parts[1]["text"], "Break down the play.");
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
}

#[tokio::test]
async fn test_generate_blocked_prompt_has_no_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let response = client_for(&server)
        .generate_content(&generate_request())
        .await
        .unwrap();
    assert!(response.text.is_none());
    assert_eq!(response.block_reason.as_deref(), Some("SAFETY"));
}

#[tokio::test]
async fn test_generate_unauthorized_is_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthenticated"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_content(&generate_request())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::Auth(_)));
    assert!(!err.is_retryable());
}

#[test]
fn test_connect_rejects_blank_key() {
    let connector = GeminiConnector::new(&AnalyzerConfig::default()).unwrap();
    assert!(matches!(
        connector.connect(&ApiKey::new("")),
        Err(AnalyzerError::Auth(_))
    ));
    assert!(matches!(
        connector.connect(&ApiKey::new("key with spaces")),
        Err(AnalyzerError::Auth(_))
    ));
}
