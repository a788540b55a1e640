//! Reply parsing for the assessment contract.
//!
//! The service is free-text and only loosely follows instructions, so the reply
//! is reduced to a JSON object by three strategies in order, then coerced
//! field by field. Missing or mistyped fields fall back to defaults.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::llm_client::LlmError;
use crate::models::{Assessment, Decision};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Builds an `Assessment` for `doc_id` from the raw reply text.
pub fn parse_assessment(doc_id: Uuid, reply: &str) -> Result<Assessment, LlmError> {
    let object = extract_json_object(reply)?;

    Ok(Assessment {
        doc_id,
        score: coerce_score(object.get("score")),
        decision: Decision::from_label(object.get("decision").and_then(Value::as_str)),
        summary: object
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        strengths: coerce_string_list(object.get("strengths")),
        missing_skills: coerce_string_list(object.get("missingSkills")),
        risks: coerce_string_list(object.get("risks")),
        raw_response: reply.to_string(),
    })
}

/// Tries, in order: a ```json fenced block, the whole trimmed reply, then the
/// slice from the first '{' to the last '}'. Only JSON objects are accepted.
pub fn extract_json_object(reply: &str) -> Result<Map<String, Value>, LlmError> {
    let trimmed = reply.trim();

    if let Some(object) = fenced_json(trimmed).and_then(parse_object) {
        return Ok(object);
    }
    if let Some(object) = parse_object(trimmed) {
        return Ok(object);
    }
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            if let Some(object) = parse_object(&trimmed[start..=end]) {
                return Ok(object);
            }
        }
    }

    Err(LlmError::ResponseFormat(
        "no JSON object found in the reply".to_string(),
    ))
}

/// Interior of the first fenced block tagged `json` (tag case-insensitive).
fn fenced_json(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let open = lowered.find(JSON_FENCE)? + JSON_FENCE.len();
    let close = open + lowered[open..].find(FENCE)?;
    Some(text[open..close].trim())
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

/// Numbers as-is, numeric strings parsed, everything else 0; clamped to [0, 100].
fn coerce_score(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

/// Arrays become string lists (non-string items rendered as JSON text); anything else is empty.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_REPLY: &str = r#"{
        "score": 82,
        "decision": "yes",
        "summary": "Solid Java profile.",
        "strengths": ["Java", "Spring"],
        "missingSkills": ["Kubernetes"],
        "risks": []
    }"#;

    #[test]
    fn test_parse_full_reply() {
        let id = Uuid::new_v4();
        let assessment = parse_assessment(id, FULL_REPLY).unwrap();
        assert_eq!(assessment.doc_id, id);
        assert_eq!(assessment.score, 82.0);
        assert_eq!(assessment.decision, Decision::Yes);
        assert_eq!(assessment.summary, "Solid Java profile.");
        assert_eq!(assessment.strengths, vec!["Java", "Spring"]);
        assert_eq!(assessment.missing_skills, vec!["Kubernetes"]);
        assert!(assessment.risks.is_empty());
        assert_eq!(assessment.raw_response, FULL_REPLY);
    }

    #[test]
    fn test_fenced_reply_equals_bare_reply() {
        let id = Uuid::new_v4();
        let fenced = format!("Here is my answer:\n```json\n{FULL_REPLY}\n```\nThanks!");
        let from_fence = parse_assessment(id, &fenced).unwrap();
        let from_bare = parse_assessment(id, FULL_REPLY).unwrap();

        assert_eq!(from_fence.score, from_bare.score);
        assert_eq!(from_fence.decision, from_bare.decision);
        assert_eq!(from_fence.summary, from_bare.summary);
        assert_eq!(from_fence.strengths, from_bare.strengths);
        assert_eq!(from_fence.missing_skills, from_bare.missing_skills);
        assert_eq!(from_fence.risks, from_bare.risks);
    }

    #[test]
    fn test_fence_tag_is_case_insensitive() {
        let reply = "```JSON\n{\"score\": 10}\n```";
        assert_eq!(parse_assessment(Uuid::new_v4(), reply).unwrap().score, 10.0);
    }

    #[test]
    fn test_slice_fallback_for_surrounding_prose() {
        let reply = "Sure! {\"score\": 55, \"decision\": \"borderline\"} Hope this helps.";
        let assessment = parse_assessment(Uuid::new_v4(), reply).unwrap();
        assert_eq!(assessment.score, 55.0);
        assert_eq!(assessment.decision, Decision::Maybe);
    }

    #[test]
    fn test_all_strategies_failing_is_format_error() {
        let reply = "```json\n{\"score\": oops}\n```\n{\"score\": 40}";
        // fence interior is invalid, whole reply is invalid, the brace slice
        // spans both objects and is invalid too
        assert!(matches!(
            parse_assessment(Uuid::new_v4(), reply),
            Err(LlmError::ResponseFormat(_))
        ));
    }

    #[test]
    fn test_non_json_reply_is_format_error() {
        for reply in ["I cannot help with that.", "", "[1, 2, 3]", "} backwards {"] {
            assert!(
                matches!(
                    parse_assessment(Uuid::new_v4(), reply),
                    Err(LlmError::ResponseFormat(_))
                ),
                "reply {reply:?} should not parse"
            );
        }
    }

    #[test]
    fn test_missing_decision_defaults_to_maybe() {
        let assessment = parse_assessment(Uuid::new_v4(), r#"{"score": 90}"#).unwrap();
        assert_eq!(assessment.decision, Decision::Maybe);
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let assessment = parse_assessment(Uuid::new_v4(), "{}").unwrap();
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.summary, "");
        assert!(assessment.strengths.is_empty());
        assert!(assessment.missing_skills.is_empty());
        assert!(assessment.risks.is_empty());
    }

    #[test]
    fn test_score_coercion_and_clamping() {
        assert_eq!(coerce_score(Some(&Value::from(150))), 100.0);
        assert_eq!(coerce_score(Some(&Value::from(-3.5))), 0.0);
        assert_eq!(coerce_score(Some(&Value::from(" 67.5 "))), 67.5);
        assert_eq!(coerce_score(Some(&Value::from("high"))), 0.0);
        assert_eq!(coerce_score(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_score(None), 0.0);
    }

    #[test]
    fn test_wrong_typed_fields_are_coerced() {
        let reply = r#"{
            "score": "75",
            "decision": 3,
            "summary": ["not", "a", "string"],
            "strengths": "Java",
            "missingSkills": [1, true, null, "Docker"],
            "risks": {"a": 1}
        }"#;
        let assessment = parse_assessment(Uuid::new_v4(), reply).unwrap();
        assert_eq!(assessment.score, 75.0);
        assert_eq!(assessment.decision, Decision::Maybe);
        assert_eq!(assessment.summary, "");
        assert!(assessment.strengths.is_empty());
        assert_eq!(assessment.missing_skills, vec!["1", "true", "null", "Docker"]);
        assert!(assessment.risks.is_empty());
    }
}
