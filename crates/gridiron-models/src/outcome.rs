//! Analysis outcomes.

use serde::{Deserialize, Serialize};

use crate::analysis::FullPlayAnalysis;

/// Category of a failed analysis, used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingCredential,
    MissingOrEmptyFile,
    Upload,
    ProcessingFailed,
    Auth,
    Generation,
    SchemaValidation,
    Timeout,
    Cancelled,
    #[default]
    Internal,
}

impl ErrorKind {
    /// Returns the kind as a short machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MissingOrEmptyFile => "missing_or_empty_file",
            Self::Upload => "upload",
            Self::ProcessingFailed => "processing_failed",
            Self::Auth => "auth",
            Self::Generation => "generation",
            Self::SchemaValidation => "schema_validation",
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error payload returned in place of an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    /// Human-readable message
    pub error: String,

    /// Failure category; not part of the wire format
    #[serde(skip)]
    pub kind: ErrorKind,
}

impl ErrorResult {
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind,
        }
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Success(FullPlayAnalysis),
    Failure(ErrorResult),
}

impl AnalysisOutcome {
    /// Returns true if the run produced an analysis.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the failure, if any.
    pub fn error(&self) -> Option<&ErrorResult> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<FullPlayAnalysis, ErrorResult> {
        match self {
            Self::Success(analysis) => Ok(analysis),
            Self::Failure(e) => Err(e),
        }
    }
}
