//! Coaching personas.
//!
//! A persona only changes the tone of `coach_feedback`; factual fields are
//! never affected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tone used for coaching feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    /// Neutral, constructive position-coach tone
    #[default]
    Standard,
    /// Demanding, old-school disciplinarian
    Strict,
    /// Calm, encouraging mentor
    Mentor,
}

impl Persona {
    /// Parse a persona selector.
    ///
    /// Never fails: unknown selectors fall back to [`Persona::Standard`].
    pub fn parse(selector: &str) -> Self {
        Self::from_known(selector).unwrap_or_default()
    }

    /// Parse a persona selector, returning `None` for unknown values.
    pub fn from_known(selector: &str) -> Option<Self> {
        let normalized = selector.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "" | "standard" | "regular" | "default" | "normal" => Some(Self::Standard),
            "strict" | "strict-disciplinarian" | "disciplinarian" | "drill-sergeant" => {
                Some(Self::Strict)
            }
            "mentor" | "calm-mentor" | "calm" => Some(Self::Mentor),
            _ => None,
        }
    }

    /// Returns the canonical selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Strict => "strict",
            Self::Mentor => "mentor",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Persona::parse("regular"), Persona::Standard);
        assert_eq!(Persona::parse("Strict-Disciplinarian"), Persona::Strict);
        assert_eq!(Persona::parse("drill_sergeant"), Persona::Strict);
        assert_eq!(Persona::parse(" calm-mentor "), Persona::Mentor);
        assert_eq!(Persona::parse(""), Persona::Standard);
    }

    #[test]
    fn test_unknown_falls_back_to_standard() {
        assert_eq!(Persona::parse("hype-man"), Persona::Standard);
        assert_eq!(Persona::from_known("hype-man"), None);
    }

    #[test]
    fn test_round_trips_canonical_name() {
        for persona in [Persona::Standard, Persona::Strict, Persona::Mentor] {
            assert_eq!(Persona::parse(persona.as_str()), persona);
        }
    }
}
