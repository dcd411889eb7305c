//! Asset staging: upload a local video and wait until it can be used.

use std::path::Path;
use std::time::Instant;

use gridiron_models::RemoteAsset;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::metrics;
use crate::service::MediaService;

/// Default MIME type when the extension is unknown.
const DEFAULT_MIME: &str = "video/mp4";

/// Map a video file extension to its MIME type.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("mpeg") | Some("mpg") => "video/mpeg",
        Some("m4v") => "video/x-m4v",
        Some("3gp") => "video/3gpp",
        _ => DEFAULT_MIME,
    }
}

/// Uploads videos and polls them to a terminal state.
pub struct AssetUploader<'a> {
    service: &'a dyn MediaService,
    polling: &'a PollingConfig,
}

impl<'a> AssetUploader<'a> {
    pub fn new(service: &'a dyn MediaService, polling: &'a PollingConfig) -> Self {
        Self { service, polling }
    }

    /// Upload `path` and wait until the asset is `ACTIVE`.
    ///
    /// If anything fails after the upload was accepted, the asset is
    /// deleted before the error is returned.
    pub async fn stage(&self, path: &Path, cancel: &CancellationToken) -> AnalyzerResult<RemoteAsset> {
        if cancel.is_cancelled() {
            return Err(AnalyzerError::Cancelled);
        }

        let mime_type = mime_for_path(path);
        let asset = self
            .service
            .upload_file(path, mime_type)
            .await
            .map_err(AnalyzerError::in_upload)?;

        match self.wait_until_active(asset.clone(), cancel).await {
            Ok(ready) => Ok(ready),
            Err(e) => {
                if let Err(cleanup) = self.service.delete_file(&asset.name).await {
                    warn!(file = %asset.name, "Failed to delete asset after staging error: {}", cleanup);
                    metrics::record_cleanup_failure("remote_asset");
                }
                Err(e)
            }
        }
    }

    async fn wait_until_active(
        &self,
        mut asset: RemoteAsset,
        cancel: &CancellationToken,
    ) -> AnalyzerResult<RemoteAsset> {
        let started = Instant::now();
        let mut attempts = 0u32;

        while asset.state.is_pending() {
            let waited = started.elapsed();
            if attempts >= self.polling.max_attempts || waited >= self.polling.timeout {
                return Err(AnalyzerError::ProcessingTimeout {
                    asset: asset.name,
                    attempts,
                    waited,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(AnalyzerError::Cancelled),
                _ = tokio::time::sleep(self.polling.interval) => {}
            }

            attempts += 1;
            match self.service.get_file(&asset.name).await {
                Ok(current) => {
                    debug!(file = %current.name, state = %current.state, attempts, "Polled asset state");
                    // The upload's MIME type is authoritative; polls may omit it
                    let uri = current.uri.or(asset.uri.take());
                    let mime_type = std::mem::take(&mut asset.mime_type);
                    asset = RemoteAsset {
                        uri,
                        mime_type,
                        ..current
                    };
                }
                Err(e) if e.is_retryable() => {
                    warn!(file = %asset.name, attempts, "Transient error polling asset: {}", e);
                }
                Err(e) => return Err(e.in_upload()),
            }
        }

        if !asset.state.is_ready() {
            return Err(AnalyzerError::ProcessingFailed {
                asset: asset.name,
                state: asset.state,
            });
        }

        metrics::record_poll_attempts(attempts);
        info!(file = %asset.name, attempts, "Asset ready");
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("play1.mp4")), "video/mp4");
        assert_eq!(mime_for_path(Path::new("clip.MOV")), "video/quicktime");
        assert_eq!(mime_for_path(Path::new("a/b/c.mkv")), "video/x-matroska");
        assert_eq!(mime_for_path(Path::new("game.mpg")), "video/mpeg");
        assert_eq!(mime_for_path(Path::new("noext")), "video/mp4");
    }
}
