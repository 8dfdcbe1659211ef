use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ats::compose::compose;
use crate::ats::coverage::coverage;
use crate::ats::models::{
    ScoreComponents, ScoreInput, ScoreResult, DEFAULT_FORMAT_QUALITY, DEFAULT_RECENCY,
};
use crate::ats::scanner::Scanner;
use crate::ats::similarity::similarity;
use crate::errors::ScoringError;

pub const BASELINE_NOTE: &str = "baseline-tfidf";

/// Placeholder signals the baseline cannot measure yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub recency: f64,
    pub format_quality: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            recency: DEFAULT_RECENCY,
            format_quality: DEFAULT_FORMAT_QUALITY,
        }
    }
}

/// Statistical scanner: TF-IDF similarity + keyword coverage, no network.
///
/// 1. similarity(resume, jd) and coverage(resume, skills), each reported to 3 decimals
/// 2. score = compose(similarity, coverage, recency, format_quality) over the reported values
pub struct BaselineScanner {
    config: BaselineConfig,
}

impl BaselineScanner {
    pub fn new(config: BaselineConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Scanner for BaselineScanner {
    async fn score(&self, input: &ScoreInput) -> Result<ScoreResult, ScoringError> {
        Ok(score_baseline(input, &self.config))
    }

    fn backend_name(&self) -> &'static str {
        "baseline"
    }
}

pub fn score_baseline(input: &ScoreInput, config: &BaselineConfig) -> ScoreResult {
    let similarity = round3(similarity(&input.resume_text, &input.job_description));
    let cov = coverage(&input.resume_text, &input.required_skills, &input.bonus_skills);
    let keyword_coverage = round3(cov.coverage);

    let score = compose(
        similarity,
        keyword_coverage,
        config.recency,
        config.format_quality,
    );

    debug!(
        resume_id = %input.resume_id,
        similarity, keyword_coverage, score, "baseline scored"
    );

    ScoreResult {
        resume_id: input.resume_id.clone(),
        score,
        components: ScoreComponents {
            similarity,
            keyword_coverage,
            recency: config.recency,
            format_quality: config.format_quality,
        },
        matched_keywords: cov.matched,
        missing_must_haves: cov.missing_required,
        notes: vec![BASELINE_NOTE.to_string()],
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
