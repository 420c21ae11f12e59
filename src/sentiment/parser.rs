//! Defensive parsing of classifier output
//!
//! Models often wrap JSON in markdown fences or add a language tag, and
//! sometimes return numbers as strings or out of range. Parsing accepts
//! all of that and rejects anything that is not a complete verdict.

use serde_json::{Map, Value};
use std::fmt;

use crate::types::{SentimentLabel, SentimentVerdict};

/// Keys every verdict object must carry
pub const REQUIRED_KEYS: [&str; 4] = ["score", "label", "emotion", "confidence"];

/// Why a classifier response could not be turned into a verdict
#[derive(Debug, Clone, PartialEq)]
pub enum ParseFailure {
    InvalidJson(String),
    NotAnObject,
    MissingKeys(Vec<&'static str>),
    NotANumber(&'static str),
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseFailure::InvalidJson(e) => write!(f, "JSON decode error: {}", e),
            ParseFailure::NotAnObject => write!(f, "response is not a JSON object"),
            ParseFailure::MissingKeys(keys) => write!(f, "missing required keys: {}", keys.join(", ")),
            ParseFailure::NotANumber(key) => write!(f, "'{}' is not a number", key),
        }
    }
}

/// Extract the JSON payload from a possibly fenced response
pub fn extract_json_segment(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }

    for part in text.split("```") {
        let mut part = part.trim();
        if let Some(rest) = part.strip_prefix("json") {
            part = rest.trim();
        }
        if part.starts_with('{') {
            return part;
        }
    }

    text
}

/// Parse a classifier response into a verdict.
///
/// `score` and `confidence` are clamped into [0, 1]; unknown labels become
/// `neutral`. Values already in range or vocabulary pass through unchanged.
pub fn parse_verdict(raw: &str) -> Result<SentimentVerdict, ParseFailure> {
    let segment = extract_json_segment(raw);
    let value: Value =
        serde_json::from_str(segment).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(ParseFailure::NotAnObject)?;

    let missing: Vec<&'static str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ParseFailure::MissingKeys(missing));
    }

    let score = number_field(object, "score")?;
    let confidence = number_field(object, "confidence")?;
    let label = match &object["label"] {
        Value::String(s) => SentimentLabel::coerce(s),
        _ => SentimentLabel::Neutral,
    };
    let emotion = match &object["emotion"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(SentimentVerdict::new(score, label, emotion, confidence))
}

fn number_field(object: &Map<String, Value>, key: &'static str) -> Result<f64, ParseFailure> {
    let parsed = match &object[key] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| !v.is_nan())
        .ok_or(ParseFailure::NotANumber(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let verdict =
            parse_verdict(r#"{"score": 0.2, "label": "frustrated", "emotion": "angry", "confidence": 0.9}"#)
                .unwrap();
        assert_eq!(verdict.score, 0.2);
        assert_eq!(verdict.label, SentimentLabel::Frustrated);
        assert_eq!(verdict.emotion, "angry");
        assert_eq!(verdict.confidence, 0.9);
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let raw = "```json\n{\"score\": 0.8, \"label\": \"positive\", \"emotion\": \"happy\", \"confidence\": 0.7}\n```";
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_fenced_json_without_tag() {
        let raw = "  ```\n{\"score\": 0.5, \"label\": \"neutral\", \"emotion\": \"neutral\", \"confidence\": 0.6}\n```  ";
        assert!(parse_verdict(raw).is_ok());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let verdict =
            parse_verdict(r#"{"score": 1.8, "label": "urgent", "emotion": "anxious", "confidence": -3}"#).unwrap();
        assert_eq!(verdict.score, 1.0);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.label, SentimentLabel::Urgent);
    }

    #[test]
    fn test_unknown_label_coerced() {
        let verdict =
            parse_verdict(r#"{"score": 0.9, "label": "elated", "emotion": "happy", "confidence": 0.8}"#).unwrap();
        assert_eq!(verdict.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let verdict =
            parse_verdict(r#"{"score": "0.25", "label": "negative", "emotion": "sad", "confidence": "0.6"}"#).unwrap();
        assert_eq!(verdict.score, 0.25);
        assert_eq!(verdict.confidence, 0.6);
    }

    #[test]
    fn test_missing_keys() {
        let err = parse_verdict(r#"{"score": 0.2, "label": "negative"}"#).unwrap_err();
        assert_eq!(err, ParseFailure::MissingKeys(vec!["emotion", "confidence"]));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_verdict("The customer seems upset."),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(parse_verdict("[1, 2, 3]").unwrap_err(), ParseFailure::NotAnObject);
    }

    #[test]
    fn test_non_numeric_score() {
        let err =
            parse_verdict(r#"{"score": "high", "label": "positive", "emotion": "happy", "confidence": 0.5}"#)
                .unwrap_err();
        assert_eq!(err, ParseFailure::NotANumber("score"));
    }

    #[test]
    fn test_extract_segment_passthrough() {
        assert_eq!(extract_json_segment("  {\"a\":1}  "), "{\"a\":1}");
    }
}
