use serde::{Deserialize, Serialize};

/// Linear blend weights for the composite score. They sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub similarity: f64,
    pub keyword_coverage: f64,
    pub recency: f64,
    pub format_quality: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            similarity: 0.5,
            keyword_coverage: 0.35,
            recency: 0.1,
            format_quality: 0.05,
        }
    }
}

/// Combines the four signals into a 0 – 100 score.
///
/// `f64::round` rounds half away from zero. The clamp holds even for
/// signals outside [0, 1].
pub fn compose(similarity: f64, coverage: f64, recency: f64, format_quality: f64) -> u32 {
    compose_with(
        &CompositeWeights::default(),
        similarity,
        coverage,
        recency,
        format_quality,
    )
}

pub fn compose_with(
    weights: &CompositeWeights,
    similarity: f64,
    coverage: f64,
    recency: f64,
    format_quality: f64,
) -> u32 {
    let blended = weights.similarity * similarity
        + weights.keyword_coverage * coverage
        + weights.recency * recency
        + weights.format_quality * format_quality;
    to_percent(blended)
}

/// Maps a [0, 1] fraction to a clamped integer percentage. NaN → 0.
pub fn to_percent(fraction: f64) -> u32 {
    let pct = (100.0 * fraction).round();
    if pct.is_nan() {
        return 0;
    }
    pct.clamp(0.0, 100.0) as u32
}
