//! Remote asset models.

use serde::{Deserialize, Serialize};

/// Processing state of an uploaded asset, as reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetState {
    /// Accepted but not yet picked up
    #[default]
    #[serde(rename = "STATE_UNSPECIFIED", alias = "PENDING")]
    Pending,
    /// Being transcoded or indexed
    Processing,
    /// Ready to be referenced in generation
    Active,
    /// Processing failed; the asset is unusable
    Failed,
    /// Any state this client does not recognize
    #[serde(other)]
    Unknown,
}

impl AssetState {
    /// Returns the state as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "STATE_UNSPECIFIED",
            Self::Processing => "PROCESSING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true while the remote side is still working on the asset.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true if the asset can be used in a generation request.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a video uploaded to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    /// Opaque resource name, e.g. `files/abc123`
    pub name: String,

    /// URI used to reference the asset in generation requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// MIME type the asset was uploaded with
    pub mime_type: String,

    /// Current processing state
    pub state: AssetState,
}

impl RemoteAsset {
    /// Create a handle for a freshly uploaded asset.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, state: AssetState) -> Self {
        Self {
            name: name.into(),
            uri: None,
            mime_type: mime_type.into(),
            state,
        }
    }

    /// Set the generation URI.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parses_wire_values() {
        let parse = |s: &str| serde_json::from_value::<AssetState>(serde_json::json!(s)).unwrap();

        assert_eq!(parse("PROCESSING"), AssetState::Processing);
        assert_eq!(parse("ACTIVE"), AssetState::Active);
        assert_eq!(parse("FAILED"), AssetState::Failed);
        assert_eq!(parse("STATE_UNSPECIFIED"), AssetState::Pending);
        assert_eq!(parse("ARCHIVED"), AssetState::Unknown);
    }

    #[test]
    fn test_state_classification() {
        assert!(AssetState::Pending.is_pending());
        assert!(AssetState::Processing.is_pending());
        assert!(!AssetState::Active.is_pending());
        assert!(AssetState::Active.is_ready());
        assert!(!AssetState::Failed.is_ready());
        assert!(!AssetState::Unknown.is_pending());
        assert!(!AssetState::Unknown.is_ready());
    }

    #[test]
    fn test_state_display_matches_wire() {
        assert_eq!(AssetState::Failed.to_string(), "FAILED");
        assert_eq!(
            serde_json::to_value(AssetState::Processing).unwrap(),
            serde_json::json!("PROCESSING")
        );
    }
}
