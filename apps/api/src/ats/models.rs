use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::ScoringError;

/// Placeholder recency signal until resume dates are parsed.
pub const DEFAULT_RECENCY: f64 = 0.2;
/// Placeholder layout/format signal until a format heuristic exists.
pub const DEFAULT_FORMAT_QUALITY: f64 = 0.8;

/// One resume to score against one job. Built by the caller, borrowed for the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub resume_id: String,
    pub resume_text: String,
    pub job_description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub bonus_skills: Vec<String>,
}

impl ScoreInput {
    /// Rejects inputs no scanner can attribute or match against.
    /// Empty resume text is valid: it simply scores zero similarity.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.resume_id.trim().is_empty() {
            return Err(ScoringError::InvalidInput(
                "resumeId cannot be empty".to_string(),
            ));
        }
        let blank_skill = self
            .required_skills
            .iter()
            .chain(&self.bonus_skills)
            .any(|s| s.trim().is_empty());
        if blank_skill {
            return Err(ScoringError::InvalidInput(format!(
                "resume {}: skill entries cannot be blank",
                self.resume_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub similarity: f64,
    pub keyword_coverage: f64,
    pub recency: f64,
    pub format_quality: f64,
}

impl ScoreComponents {
    /// Fixed values reported when a result is a placeholder rather than a measurement.
    pub const LOW_CONFIDENCE: ScoreComponents = ScoreComponents {
        similarity: 0.4,
        keyword_coverage: 0.4,
        recency: 0.1,
        format_quality: 0.1,
    };
}

/// Score reported alongside `ScoreComponents::LOW_CONFIDENCE`.
pub const PLACEHOLDER_SCORE: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub resume_id: String,
    /// 0 – 100
    pub score: u32,
    pub components: ScoreComponents,
    /// Stemmed skill terms found in the resume.
    pub matched_keywords: BTreeSet<String>,
    /// Stemmed required skills absent from the resume, in input order.
    pub missing_must_haves: Vec<String>,
    pub notes: Vec<String>,
}

impl ScoreResult {
    /// Low-confidence result that echoes the required skills verbatim as missing.
    pub fn placeholder(input: &ScoreInput, note: &str) -> Self {
        Self {
            resume_id: input.resume_id.clone(),
            score: PLACEHOLDER_SCORE,
            components: ScoreComponents::LOW_CONFIDENCE,
            matched_keywords: BTreeSet::new(),
            missing_must_haves: input.required_skills.clone(),
            notes: vec![note.to_string()],
        }
    }
}
