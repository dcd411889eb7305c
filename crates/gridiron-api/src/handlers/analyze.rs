//! Play analysis endpoint.

use axum::extract::{Multipart, State};
use axum::Extension;
use axum::Json;
use gridiron_analyzer::{AnalysisRequest, ApiKey};
use gridiron_models::{FullPlayAnalysis, Persona};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::RequestId;
use crate::state::AppState;
use crate::upload::{multipart_error, stage_field, validate_video_name, StagedUpload};

/// Persona used when the request names none.
const DEFAULT_PERSONA: &str = "regular";

/// Pick the request credential, falling back to the server default.
fn resolve_credential(request_key: Option<&str>, default_key: Option<&str>) -> Option<String> {
    request_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or(default_key.map(str::trim).filter(|k| !k.is_empty()))
        .map(str::to_string)
}

/// Analyze an uploaded play video.
///
/// POST /analyze (multipart/form-data)
///
/// Fields: `video` (file), `api_key` (optional), `persona` (optional).
pub async fn analyze(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> ApiResult<Json<FullPlayAnalysis>> {
    let conceal = state.config.is_production();
    run_analysis(state, request_id, multipart)
        .await
        .map_err(|e| e.conceal_internal(conceal))
}

async fn run_analysis(
    state: AppState,
    request_id: Option<Extension<RequestId>>,
    mut multipart: Multipart,
) -> ApiResult<Json<FullPlayAnalysis>> {
    let mut video: Option<ApiResult<StagedUpload>> = None;
    let mut api_key: Option<String> = None;
    let mut persona_selector: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("video") if video.is_none() => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                video = Some(if file_name.trim().is_empty() {
                    Err(ApiError::missing_file("Empty file name"))
                } else if let Err(e) = validate_video_name(&file_name) {
                    Err(e)
                } else {
                    stage_field(field, &state.config.upload_dir, &file_name).await
                });
            }
            Some("api_key") => api_key = Some(field.text().await.map_err(multipart_error)?),
            Some("persona") => persona_selector = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    // Credential first: without one nothing is sent anywhere
    let credential = resolve_credential(api_key.as_deref(), state.config.default_api_key.as_deref())
        .ok_or(ApiError::MissingCredential)?;

    let staged = video.unwrap_or_else(|| Err(ApiError::missing_file("No video file provided")))?;

    let persona = Persona::parse(persona_selector.as_deref().unwrap_or(DEFAULT_PERSONA));
    let id = request_id
        .map(|Extension(RequestId(id))| id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    info!(
        analysis_id = %id,
        size_bytes = staged.size(),
        persona = %persona,
        "Starting play analysis"
    );

    let request = AnalysisRequest::new(staged.into_path(), ApiKey::new(credential), Some(persona))
        .with_id(id);

    // Detached so a client disconnect cannot skip cleanup
    let analyzer = state.analyzer.clone();
    let cancel = state.shutdown.child_token();
    let outcome = tokio::spawn(async move { analyzer.analyze(request, &cancel).await })
        .await
        .map_err(|e| ApiError::internal(format!("Analysis task failed: {}", e)))?;

    outcome.into_result().map(Json).map_err(ApiError::from)
}
