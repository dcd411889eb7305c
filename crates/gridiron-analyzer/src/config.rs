//! Analyzer configuration.

use std::time::Duration;

use crate::retry::RetryConfig;

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Readiness polling bounds for staged assets.
#[derive(Debug, Clone)]
pub struct PollingConfig {
    /// Delay between state checks
    pub interval: Duration,
    /// Maximum number of state checks after the upload
    pub max_attempts: u32,
    /// Overall deadline for the asset to leave processing
    pub timeout: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
            timeout: Duration::from_secs(300),
        }
    }
}

/// Analyzer configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Base URL of the Gemini REST API
    pub api_base: String,
    /// Model used for generation
    pub model: String,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
    /// Asset readiness polling
    pub polling: PollingConfig,
    /// Retry policy for transient generation failures
    pub generation_retry: RetryConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
            polling: PollingConfig::default(),
            generation_retry: default_generation_retry(),
        }
    }
}

fn default_generation_retry() -> RetryConfig {
    RetryConfig::new("generate_content")
        .with_max_retries(2)
        .with_base_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8))
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl AnalyzerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let retry_defaults = default_generation_retry();

        Self {
            api_base: std::env::var("GEMINI_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            model: std::env::var("GEMINI_MODEL").unwrap_or(defaults.model),
            request_timeout: Duration::from_secs(
                env_parse("GEMINI_REQUEST_TIMEOUT_SECS").unwrap_or(120),
            ),
            polling: PollingConfig {
                interval: Duration::from_millis(
                    env_parse("ASSET_POLL_INTERVAL_MS").unwrap_or(2000),
                ),
                max_attempts: env_parse("ASSET_MAX_POLL_ATTEMPTS").unwrap_or(150),
                timeout: Duration::from_secs(
                    env_parse("ASSET_PROCESSING_TIMEOUT_SECS").unwrap_or(300),
                ),
            },
            generation_retry: retry_defaults
                .clone()
                .with_max_retries(
                    env_parse("GENERATION_MAX_RETRIES").unwrap_or(retry_defaults.max_retries),
                )
                .with_base_delay(Duration::from_millis(
                    env_parse("GENERATION_RETRY_BASE_MS").unwrap_or(500),
                ))
                .with_max_delay(Duration::from_millis(
                    env_parse("GENERATION_RETRY_MAX_MS").unwrap_or(8000),
                )),
        }
    }
}
