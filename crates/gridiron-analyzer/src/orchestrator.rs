//! Play analysis orchestration.
//!
//! One analysis is a linear sequence: connect, stage, generate, parse,
//! then cleanup. Cleanup of the remote asset and the local video runs on
//! every path, and no error escapes [`PlayAnalyzer::analyze`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use gridiron_models::{response_schema, AnalysisOutcome, ErrorResult, FullPlayAnalysis, Persona, RemoteAsset};
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::logging::AnalysisLogger;
use crate::metrics;
use crate::parse::parse_analysis;
use crate::prompt::build_prompt;
use crate::retry::retry_async;
use crate::service::{ApiKey, GenerateRequest, MediaService, ServiceConnector};
use crate::uploader::AssetUploader;

/// Input for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Correlation ID carried in every log line
    pub id: String,
    /// Staged local video; removed when the run finishes
    pub video_path: PathBuf,
    pub credential: ApiKey,
    /// Coaching persona; `None` leaves `coach_feedback` out entirely
    pub persona: Option<Persona>,
}

impl AnalysisRequest {
    pub fn new(video_path: impl Into<PathBuf>, credential: ApiKey, persona: Option<Persona>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            video_path: video_path.into(),
            credential,
            persona,
        }
    }

    /// Use an existing correlation ID (e.g. the HTTP request ID).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Runs play analyses against a remote service.
pub struct PlayAnalyzer {
    connector: Arc<dyn ServiceConnector>,
    config: AnalyzerConfig,
}

impl PlayAnalyzer {
    pub fn new(connector: Arc<dyn ServiceConnector>, config: AnalyzerConfig) -> Self {
        Self { connector, config }
    }

    /// Analyze one video.
    ///
    /// Always returns an outcome. The local video is removed before this
    /// returns, whether the analysis succeeded or not.
    pub async fn analyze(&self, request: AnalysisRequest, cancel: &CancellationToken) -> AnalysisOutcome {
        let logger = AnalysisLogger::new(&request.id, "play_analysis");
        let span = logger.create_span();

        async {
            let started = Instant::now();
            logger.log_start(&format!(
                "video={} persona={}",
                request.video_path.display(),
                request.persona.map(|p| p.as_str()).unwrap_or("none")
            ));

            let result = self.run(&request, cancel, &logger).await;
            remove_local_file(&request.video_path, &logger).await;

            let elapsed = started.elapsed().as_secs_f64();
            match result {
                Ok(analysis) => {
                    metrics::record_analysis("success", elapsed);
                    logger.log_completion(&format!("took {:.1}s", elapsed));
                    AnalysisOutcome::Success(analysis)
                }
                Err(e) => {
                    metrics::record_analysis(e.kind().as_str(), elapsed);
                    logger.log_error(&e.to_string());
                    AnalysisOutcome::Failure(ErrorResult::from(&e))
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
        logger: &AnalysisLogger,
    ) -> AnalyzerResult<FullPlayAnalysis> {
        let service = self.connector.connect(&request.credential)?;

        let asset = AssetUploader::new(service.as_ref(), &self.config.polling)
            .stage(&request.video_path, cancel)
            .await?;
        logger.log_progress(&format!("asset {} is active", asset.name));

        let result = self
            .generate(service.as_ref(), &asset, request.persona, cancel, logger)
            .await;

        release_asset(service.as_ref(), &asset, logger).await;
        result
    }

    async fn generate(
        &self,
        service: &dyn MediaService,
        asset: &RemoteAsset,
        persona: Option<Persona>,
        cancel: &CancellationToken,
        logger: &AnalysisLogger,
    ) -> AnalyzerResult<FullPlayAnalysis> {
        let request = GenerateRequest::new(
            &self.config.model,
            asset,
            build_prompt(persona),
            response_schema(persona.is_some()),
        );
        logger.log_progress(&format!("requesting analysis from {}", self.config.model));

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
            result = retry_async(
                &self.config.generation_retry,
                AnalyzerError::is_retryable,
                || service.generate_content(&request),
            ) => result.map_err(AnalyzerError::in_generation)?,
        };

        parse_analysis(&response, persona.is_some())
    }
}

/// Best-effort delete of the remote asset.
async fn release_asset(service: &dyn MediaService, asset: &RemoteAsset, logger: &AnalysisLogger) {
    match service.delete_file(&asset.name).await {
        Ok(()) => debug!(file = %asset.name, "Released remote asset"),
        Err(e) => {
            logger.log_warning(&format!("failed to delete remote asset {}: {}", asset.name, e));
            metrics::record_cleanup_failure("remote_asset");
        }
    }
}

/// Best-effort delete of the staged local video.
async fn remove_local_file(path: &Path, logger: &AnalysisLogger) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed staged video"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            logger.log_warning(&format!("failed to remove {}: {}", path.display(), e));
            metrics::record_cleanup_failure("local_file");
        }
    }
}
