//! Similarity Scorer — TF-IDF cosine similarity between two texts.
//!
//! Each text is its own single-document corpus, so every term has df = 1 and the
//! IDF factor is one constant per model. It is kept explicit and cancels in the
//! cosine.

use std::collections::{BTreeMap, BTreeSet};

use crate::ats::normalize::tokens;

/// Term weights of a single-document corpus.
#[derive(Debug, Clone, Default)]
pub struct TermWeights {
    weights: BTreeMap<String, f64>,
}

impl TermWeights {
    pub fn from_tokens(tokens: &[String]) -> Self {
        let mut counts: BTreeMap<String, f64> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.clone()).or_insert(0.0) += 1.0;
        }

        let idf = inverse_document_frequency(1, 1);
        let weights = counts
            .into_iter()
            .map(|(term, tf)| (term, tf * idf))
            .collect();

        Self { weights }
    }

    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Smoothed IDF: `1 + ln(n_docs / (1 + df))`.
fn inverse_document_frequency(n_docs: usize, df: usize) -> f64 {
    1.0 + (n_docs as f64 / (1.0 + df as f64)).ln()
}

/// Cosine of the angle between two weight vectors over the union of their terms.
/// Zero when either vector has zero norm.
pub fn cosine(a: &TermWeights, b: &TermWeights) -> f64 {
    let union: BTreeSet<&str> = a.terms().chain(b.terms()).collect();

    let mut dot = 0.0;
    let mut a2 = 0.0;
    let mut b2 = 0.0;
    for term in union {
        let wa = a.weight(term);
        let wb = b.weight(term);
        dot += wa * wb;
        a2 += wa * wa;
        b2 += wb * wb;
    }

    if a2 == 0.0 || b2 == 0.0 {
        return 0.0;
    }
    (dot / (a2.sqrt() * b2.sqrt())).clamp(0.0, 1.0)
}

/// Similarity of a resume to a job description in [0, 1].
pub fn similarity(resume_text: &str, job_description_text: &str) -> f64 {
    let resume = TermWeights::from_tokens(&tokens(resume_text));
    let jd = TermWeights::from_tokens(&tokens(job_description_text));
    cosine(&resume, &jd)
}
