//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gridiron_models::{ErrorKind, ErrorResult};
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing API key")]
    MissingCredential,

    #[error("{0}")]
    MissingOrEmptyFile(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Uploaded video exceeds the size limit")]
    PayloadTooLarge,

    #[error("{}", .0.error)]
    Analysis(ErrorResult),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Internal failure with its details withheld from the client.
    #[error("An internal error occurred")]
    Concealed,
}

impl ApiError {
    pub fn missing_file(msg: impl Into<String>) -> Self {
        Self::MissingOrEmptyFile(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Replace internal failure details with a generic message when `conceal` is set.
    pub fn conceal_internal(self, conceal: bool) -> Self {
        if conceal && self.is_internal() {
            ApiError::Concealed
        } else {
            self
        }
    }

    /// Machine-readable code reported alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingCredential => ErrorKind::MissingCredential.as_str(),
            ApiError::MissingOrEmptyFile(_) => ErrorKind::MissingOrEmptyFile.as_str(),
            ApiError::BadRequest(_) => "bad_request",
            ApiError::PayloadTooLarge => "payload_too_large",
            ApiError::Analysis(result) => result.kind.as_str(),
            ApiError::Internal(_) | ApiError::Concealed => ErrorKind::Internal.as_str(),
        }
    }

    fn is_internal(&self) -> bool {
        match self {
            ApiError::Internal(_) | ApiError::Concealed => true,
            ApiError::Analysis(result) => result.kind == ErrorKind::Internal,
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingCredential | ApiError::MissingOrEmptyFile(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Analysis(result) => status_for_kind(result.kind),
            ApiError::Internal(_) | ApiError::Concealed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingCredential | ErrorKind::MissingOrEmptyFile => StatusCode::BAD_REQUEST,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::Upload
        | ErrorKind::ProcessingFailed
        | ErrorKind::Generation
        | ErrorKind::SchemaValidation => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ErrorResult> for ApiError {
    fn from(result: ErrorResult) -> Self {
        Self::Analysis(result)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
