//! Staging uploaded videos on local disk.
//!
//! Uploaded file names are untrusted: only the final path component is
//! kept, reduced to a safe character set, and prefixed with a timestamp and
//! random tag so concurrent uploads never collide.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics;

/// Video extensions accepted for analysis.
pub const ALLOWED_EXTENSIONS: [&str; 9] = ["mp4", "mov", "webm", "avi", "mkv", "mpeg", "mpg", "m4v", "3gp"];

/// Maximum length of the sanitized part of a staged file name.
const MAX_FILENAME_LEN: usize = 100;

/// Lowercased extension of an uploaded file name, if any.
pub fn extension_of(file_name: &str) -> Option<String> {
    let base = base_name(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Check an uploaded file name against [`ALLOWED_EXTENSIONS`].
pub fn validate_video_name(file_name: &str) -> ApiResult<()> {
    match extension_of(file_name) {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ApiError::bad_request(format!(
            "Unsupported file type '.{}'. Allowed: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        ))),
        None => Err(ApiError::bad_request(format!(
            "File has no extension. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

fn base_name(file_name: &str) -> &str {
    file_name.rsplit(['/', '\\']).next().unwrap_or(file_name).trim()
}

/// Reduce an untrusted file name to `[A-Za-z0-9._-]`, at most 100 chars.
///
/// The extension is preserved when the stem has to be shortened.
pub fn sanitize_filename(file_name: &str) -> String {
    let cleaned: String = base_name(file_name)
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.len() <= MAX_FILENAME_LEN {
        return if cleaned.is_empty() {
            "video".to_string()
        } else {
            cleaned.to_string()
        };
    }

    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < 10 => {
            let keep = MAX_FILENAME_LEN - ext.len() - 1;
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => cleaned[..MAX_FILENAME_LEN].to_string(),
    }
}

/// Unique on-disk name: `video_{unix_ts}_{8 hex}_{sanitized}`.
pub fn staging_name(file_name: &str) -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!(
        "video_{}_{}_{}",
        Utc::now().timestamp(),
        &tag[..8],
        sanitize_filename(file_name)
    )
}

/// A video written to the staging directory.
///
/// Removes the file on drop unless ownership was handed over with
/// [`StagedUpload::into_path`].
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    size: u64,
    handed_over: bool,
}

impl StagedUpload {
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hand the file to a new owner, which becomes responsible for removing it.
    pub fn into_path(mut self) -> PathBuf {
        self.handed_over = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.handed_over {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed abandoned upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "Failed to remove abandoned upload: {}", e),
        }
    }
}

pub(crate) fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::bad_request(format!("Failed to read upload: {}", e.body_text()))
    }
}

/// Stream a multipart file field to the staging directory chunk by chunk.
pub async fn stage_field(
    mut field: Field<'_>,
    upload_dir: &Path,
    file_name: &str,
) -> ApiResult<StagedUpload> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload directory: {}", e)))?;

    let path = upload_dir.join(staging_name(file_name));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create staged file: {}", e)))?;

    // From here on the guard owns the file
    let mut staged = StagedUpload {
        path,
        size: 0,
        handed_over: false,
    };

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to write staged file: {}", e)))?;
        staged.size += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to write staged file: {}", e)))?;

    if staged.size == 0 {
        return Err(ApiError::missing_file("Uploaded video is empty"));
    }

    metrics::record_upload_bytes(staged.size);
    debug!(path = %staged.path.display(), size_bytes = staged.size, "Staged upload");
    Ok(staged)
}
