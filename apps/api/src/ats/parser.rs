//! Result Validator/Parser — the boundary between untrusted completion text and
//! `ScoreResult`.
//!
//! `extract_object` may fail; `validate` never does. `parse_and_validate` composes
//! them and substitutes `fallback_result` for any extraction failure, so no
//! malformed response ever reaches the caller as an error.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::ats::models::{ScoreComponents, ScoreInput, ScoreResult};

pub const PARSE_FAILED_NOTE: &str = "parse-failed";

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object delimiters found")]
    NoObject,

    #[error("embedded JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses the span from the first `{` to the last `}` as a JSON object.
pub fn extract_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let start = raw.find('{').ok_or(ParseError::NoObject)?;
    let end = raw.rfind('}').ok_or(ParseError::NoObject)?;
    if end < start {
        return Err(ParseError::NoObject);
    }

    Ok(serde_json::from_str::<Map<String, Value>>(&raw[start..=end])?)
}

/// Coerces every field independently; absent or malformed fields take their default.
pub fn validate(object: &Map<String, Value>, input: &ScoreInput) -> ScoreResult {
    let score = number_or_zero(object.get("score")).round().clamp(0.0, 100.0) as u32;

    let components = object.get("components").and_then(Value::as_object);
    let component = |key: &str| number_or_zero(components.and_then(|c| c.get(key)));

    ScoreResult {
        resume_id: input.resume_id.clone(),
        score,
        components: ScoreComponents {
            similarity: component("similarity"),
            keyword_coverage: component("keywordCoverage"),
            recency: component("recency"),
            format_quality: component("formatQuality"),
        },
        matched_keywords: string_list(object.get("matchedKeywords"))
            .into_iter()
            .collect::<BTreeSet<_>>(),
        missing_must_haves: string_list(object.get("missingMustHaves")),
        notes: string_list(object.get("notes")),
    }
}

/// Never fails. Unparseable text yields `fallback_result(input)`.
pub fn parse_and_validate(raw: &str, input: &ScoreInput) -> ScoreResult {
    match extract_object(raw) {
        Ok(object) => validate(&object, input),
        Err(e) => {
            warn!(
                resume_id = %input.resume_id,
                "Scoring response unusable ({e}); using fallback result"
            );
            fallback_result(input)
        }
    }
}

pub fn fallback_result(input: &ScoreInput) -> ScoreResult {
    ScoreResult::placeholder(input, PARSE_FAILED_NOTE)
}

/// A JSON number, or a string holding one. Anything else is 0.
fn number_or_zero(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// String elements of an array; scalar elements are stringified, nested values dropped.
/// Non-array values yield an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
        .collect()
}
