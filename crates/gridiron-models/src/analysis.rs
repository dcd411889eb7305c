//! Tactical analysis models.
//!
//! These types are both the output constraint handed to the generation
//! service (see [`crate::schema`]) and the target the raw response is
//! parsed into.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker prepended to `details` lines that lack one.
const LIST_MARKER: &str = "- ";

/// Ways a parsed analysis can fail the required shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("field '{0}' is empty")]
    BlankField(String),

    #[error("field '{0}' is required when a coaching persona is selected")]
    MissingFeedback(String),
}

/// One side's tactical read of the play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SideAnalysis {
    /// One short sentence describing what this side did on the play.
    pub summary: String,

    /// Play category, e.g. inside zone, outside run, quick pass, screen, RPO, Cover 3, blitz.
    pub play_type: String,

    /// Formation or alignment, e.g. shotgun trips right, I-form, 4-3 over, nickel.
    pub formation: String,

    /// Personnel grouping, e.g. 11 personnel, 21 personnel, base, dime.
    pub personnel: String,

    /// Players who decided the play, by position and jersey number when visible.
    pub key_players: Vec<String>,

    /// Coaching feedback written in the selected persona's tone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_feedback: Option<String>,

    /// Detailed breakdown as a bulleted list; every line starts with "- ".
    pub details: String,
}

impl SideAnalysis {
    fn validate(&self, side: &str, require_feedback: bool) -> Result<(), SchemaViolation> {
        let required = [
            ("summary", &self.summary),
            ("play_type", &self.play_type),
            ("formation", &self.formation),
            ("personnel", &self.personnel),
            ("details", &self.details),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SchemaViolation::BlankField(format!("{side}.{name}")));
            }
        }

        if let Some(idx) = self.key_players.iter().position(|p| p.trim().is_empty()) {
            return Err(SchemaViolation::BlankField(format!("{side}.key_players[{idx}]")));
        }

        if require_feedback {
            match &self.coach_feedback {
                None => {
                    return Err(SchemaViolation::MissingFeedback(format!(
                        "{side}.coach_feedback"
                    )))
                }
                Some(f) if f.trim().is_empty() => {
                    return Err(SchemaViolation::BlankField(format!("{side}.coach_feedback")))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    fn normalize(&mut self) {
        self.details = normalize_details(&self.details);
        for player in &mut self.key_players {
            let trimmed = player.trim();
            if trimmed.len() != player.len() {
                *player = trimmed.to_string();
            }
        }
    }
}

/// Offense and defense breakdown of a single play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FullPlayAnalysis {
    /// Analysis of the offensive side.
    pub offense: SideAnalysis,

    /// Analysis of the defensive side.
    pub defense: SideAnalysis,
}

impl FullPlayAnalysis {
    /// Check the fields serde cannot: blank strings and persona feedback.
    pub fn validate(&self, require_feedback: bool) -> Result<(), SchemaViolation> {
        self.offense.validate("offense", require_feedback)?;
        self.defense.validate("defense", require_feedback)
    }

    /// Coerce free-text fields into their formatting conventions.
    pub fn normalize(mut self) -> Self {
        self.offense.normalize();
        self.defense.normalize();
        self
    }
}

/// Rewrite `details` so that every non-empty line is a list item.
pub fn normalize_details(details: &str) -> String {
    details
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if has_list_marker(line) {
                line.to_string()
            } else {
                format!("{LIST_MARKER}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_list_marker(line: &str) -> bool {
    if line.starts_with(['-', '*', '•']) {
        return true;
    }

    // Numbered items: "1. " or "12)", but not decimals like "1.5"
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let mut rest = line[digits..].chars();
    digits > 0
        && matches!(rest.next(), Some('.') | Some(')'))
        && rest.next().map_or(true, char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(feedback: Option<&str>) -> SideAnalysis {
        SideAnalysis {
            summary: "Inside zone to the weak side".to_string(),
            play_type: "inside run".to_string(),
            formation: "shotgun trips right".to_string(),
            personnel: "11 personnel".to_string(),
            key_players: vec!["RB #22".to_string(), "LG #65".to_string()],
            coach_feedback: feedback.map(str::to_string),
            details: "- Double team on the 3-tech\n- RB presses the A gap".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_complete_analysis() {
        let analysis = FullPlayAnalysis {
            offense: side(None),
            defense: side(None),
        };
        assert!(analysis.validate(false).is_ok());
    }

    #[test]
    fn test_validate_reports_blank_field_path() {
        let mut defense = side(None);
        defense.formation = "   ".to_string();
        let analysis = FullPlayAnalysis {
            offense: side(None),
            defense,
        };

        assert_eq!(
            analysis.validate(false),
            Err(SchemaViolation::BlankField("defense.formation".to_string()))
        );
    }

    #[test]
    fn test_validate_requires_feedback_only_with_persona() {
        let analysis = FullPlayAnalysis {
            offense: side(Some("Finish your blocks.")),
            defense: side(None),
        };

        assert!(analysis.validate(false).is_ok());
        assert_eq!(
            analysis.validate(true),
            Err(SchemaViolation::MissingFeedback(
                "defense.coach_feedback".to_string()
            ))
        );
    }

    #[test]
    fn test_validate_rejects_blank_key_player() {
        let mut offense = side(None);
        offense.key_players.push(String::new());
        let analysis = FullPlayAnalysis {
            offense,
            defense: side(None),
        };

        assert_eq!(
            analysis.validate(false),
            Err(SchemaViolation::BlankField("offense.key_players[2]".to_string()))
        );
    }

    #[test]
    fn test_empty_key_players_is_allowed() {
        let mut offense = side(None);
        offense.key_players.clear();
        let analysis = FullPlayAnalysis {
            offense,
            defense: side(None),
        };
        assert!(analysis.validate(false).is_ok());
    }

    #[test]
    fn test_normalize_details_prefixes_prose_lines() {
        let normalized = normalize_details("Motion across the formation\n\n  QB reads the flat defender ");
        assert_eq!(
            normalized,
            "- Motion across the formation\n- QB reads the flat defender"
        );
    }

    #[test]
    fn test_normalize_details_keeps_existing_markers() {
        let input = "- one\n* two\n• three\n1. four\n2) five";
        assert_eq!(normalize_details(input), input);
    }

    #[test]
    fn test_numbers_without_delimiter_are_not_markers() {
        assert_eq!(normalize_details("11 personnel on the field"), "- 11 personnel on the field");
    }

    #[test]
    fn test_decimal_led_lines_get_a_marker() {
        assert_eq!(
            normalize_details("1.5 yards gained on the carry\n3.5 seconds to throw\n2) QB kept it"),
            "- 1.5 yards gained on the carry\n- 3.5 seconds to throw\n2) QB kept it"
        );
    }

    #[test]
    fn test_missing_field_fails_deserialization() {
        let json = r#"{
            "summary": "s", "play_type": "p", "formation": "f",
            "key_players": [], "details": "- d"
        }"#;
        assert!(serde_json::from_str::<SideAnalysis>(json).is_err());
    }

    #[test]
    fn test_feedback_is_omitted_when_absent() {
        let value = serde_json::to_value(side(None)).unwrap();
        assert!(value.get("coach_feedback").is_none());
        assert_eq!(value["key_players"][0], "RB #22");
    }
}
