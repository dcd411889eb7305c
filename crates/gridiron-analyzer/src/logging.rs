//! Structured analysis logging.
//!
//! Every line carries the analysis ID and phase so one request can be
//! followed across upload, polling, generation and cleanup.

use tracing::{error, info, warn, Span};

/// Logger bound to one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    analysis_id: String,
    operation: String,
}

impl AnalysisLogger {
    /// Create a logger for an analysis ID and operation name
    /// (e.g. `play_analysis`, `asset_staging`).
    pub fn new(analysis_id: &str, operation: &str) -> Self {
        Self {
            analysis_id: analysis_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            analysis_id = %self.analysis_id,
            operation = %self.operation,
            "Analysis completed: {}", message
        );
    }

    /// Span that nested calls (HTTP client, retries) inherit.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            analysis_id = %self.analysis_id,
            operation = %self.operation
        )
    }
}

