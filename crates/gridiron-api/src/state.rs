//! Application state.

use std::sync::Arc;

use gridiron_analyzer::{AnalyzerConfig, AnalyzerResult, GeminiConnector, PlayAnalyzer};
use tokio_util::sync::CancellationToken;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Arc<PlayAnalyzer>,
    /// Cancelled when the server shuts down; each analysis gets a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create state backed by the Gemini REST client.
    pub fn new(config: ApiConfig, analyzer_config: AnalyzerConfig) -> AnalyzerResult<Self> {
        let connector = GeminiConnector::new(&analyzer_config)?;
        let analyzer = PlayAnalyzer::new(Arc::new(connector), analyzer_config);
        Ok(Self::with_analyzer(config, analyzer))
    }

    /// Create state around an existing analyzer.
    pub fn with_analyzer(config: ApiConfig, analyzer: PlayAnalyzer) -> Self {
        Self {
            config,
            analyzer: Arc::new(analyzer),
            shutdown: CancellationToken::new(),
        }
    }
}
