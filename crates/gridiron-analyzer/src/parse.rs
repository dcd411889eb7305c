//! Turning a raw generation response into a validated analysis.

use gridiron_models::FullPlayAnalysis;
use serde_json::Value;

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::service::GenerateResponse;

/// Parse, validate and normalize a generation response.
///
/// A structured `parsed` object wins over text. Missing or non-JSON output
/// is a generation failure; JSON of the wrong shape is a schema failure.
pub fn parse_analysis(
    response: &GenerateResponse,
    require_feedback: bool,
) -> AnalyzerResult<FullPlayAnalysis> {
    let value = match &response.parsed {
        Some(parsed) => parsed.clone(),
        None => parse_text(response)?,
    };

    let analysis: FullPlayAnalysis = serde_json::from_value(value)
        .map_err(|e| AnalyzerError::schema_validation(e.to_string()))?;

    analysis
        .validate(require_feedback)
        .map_err(|e| AnalyzerError::schema_validation(e.to_string()))?;

    Ok(analysis.normalize())
}

fn parse_text(response: &GenerateResponse) -> AnalyzerResult<Value> {
    let text = response
        .text
        .as_deref()
        .map(strip_code_fence)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AnalyzerError::generation(empty_reason(response)))?;

    serde_json::from_str(text)
        .map_err(|e| AnalyzerError::generation(format!("Response was not valid JSON: {}", e)))
}

fn empty_reason(response: &GenerateResponse) -> String {
    match (&response.block_reason, &response.finish_reason) {
        (Some(block), _) => format!("No content in response (prompt blocked: {})", block),
        (None, Some(finish)) => format!("No content in response (finish reason: {})", finish),
        (None, None) => "No content in response".to_string(),
    }
}

/// Strip a surrounding Markdown code fence (```json ... ``` or ``` ... ```).
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = match rest.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn side(name: &str) -> Value {
        json!({
            "summary": format!("{name} summary"),
            "play_type": "inside zone",
            "formation": "shotgun trips right",
            "personnel": "11 personnel",
            "key_players": ["QB #12", " RB #28 "],
            "details": "- Read the backside end\nRB pressed the A gap"
        })
    }

    fn analysis_json() -> Value {
        json!({ "offense": side("offense"), "defense": side("defense") })
    }

    #[test]
    fn test_parses_fenced_text_and_normalizes() {
        let text = format!("```json\n{}\n```", analysis_json());
        let analysis = parse_analysis(&GenerateResponse::from_text(text), false).unwrap();

        assert_eq!(analysis.offense.formation, "shotgun trips right");
        assert_eq!(analysis.offense.key_players[1], "RB #28");
        assert_eq!(
            analysis.defense.details,
            "- Read the backside end\n- RB pressed the A gap"
        );
    }

    #[test]
    fn test_prefers_parsed_over_text() {
        let response = GenerateResponse {
            parsed: Some(analysis_json()),
            text: Some("not json".to_string()),
            ..Default::default()
        };
        assert!(parse_analysis(&response, false).is_ok());
    }

    #[test]
    fn test_empty_text_is_generation_error_with_reason() {
        let response = GenerateResponse {
            finish_reason: Some("SAFETY".to_string()),
            ..Default::default()
        };
        match parse_analysis(&response, false) {
            Err(AnalyzerError::Generation(msg)) => assert!(msg.contains("SAFETY")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_is_generation_error() {
        let result = parse_analysis(&GenerateResponse::from_text("{ not json"), false);
        assert!(matches!(result, Err(AnalyzerError::Generation(_))));
    }

    #[test]
    fn test_missing_side_is_schema_error() {
        let text = json!({ "offense": side("offense") }).to_string();
        let result = parse_analysis(&GenerateResponse::from_text(text), false);
        assert!(matches!(result, Err(AnalyzerError::SchemaValidation(_))));
    }

    #[test]
    fn test_blank_field_is_schema_error() {
        let mut value = analysis_json();
        value["defense"]["formation"] = json!("   ");
        match parse_analysis(&GenerateResponse::from_parsed(value), false) {
            Err(AnalyzerError::SchemaValidation(msg)) => assert!(msg.contains("defense.formation")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_feedback_required_with_persona() {
        let result = parse_analysis(&GenerateResponse::from_parsed(analysis_json()), true);
        assert!(matches!(result, Err(AnalyzerError::SchemaValidation(_))));

        let mut value = analysis_json();
        value["offense"]["coach_feedback"] = json!("Finish your blocks.");
        value["defense"]["coach_feedback"] = json!("Fit the run.");
        let analysis = parse_analysis(&GenerateResponse::from_parsed(value), true).unwrap();
        assert_eq!(analysis.defense.coach_feedback.as_deref(), Some("Fit the run."));
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_uppercase_fence_tag_parses() {
        let text = format!("```JSON\n{}\n```", analysis_json());
        let analysis = parse_analysis(&GenerateResponse::from_text(text), false).unwrap();
        assert_eq!(analysis.offense.summary, "offense summary");
        assert_eq!(strip_code_fence("```Json\n{}\n```"), "{}");
    }
}
