//! Keyword Coverage Scorer — exact stemmed-token membership of skill terms.

use std::collections::{BTreeSet, HashSet};

use crate::ats::normalize::{stem_term, tokens};

/// Required matches count double relative to bonus matches.
const REQUIRED_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    /// 0.0 – 1.0
    pub coverage: f64,
    pub matched: BTreeSet<String>,
    pub missing_required: Vec<String>,
}

pub fn coverage(resume_text: &str, required_skills: &[String], bonus_skills: &[String]) -> Coverage {
    let resume_tokens: HashSet<String> = tokens(resume_text).into_iter().collect();

    let required: Vec<String> = required_skills.iter().map(|s| stem_term(s)).collect();
    let bonus: Vec<String> = bonus_skills.iter().map(|s| stem_term(s)).collect();

    let mut matched = BTreeSet::new();
    let mut missing_required = Vec::new();
    let mut matched_required = 0usize;
    for skill in &required {
        if resume_tokens.contains(skill) {
            matched_required += 1;
            matched.insert(skill.clone());
        } else {
            missing_required.push(skill.clone());
        }
    }

    let mut matched_bonus = 0usize;
    for skill in &bonus {
        if resume_tokens.contains(skill) {
            matched_bonus += 1;
            matched.insert(skill.clone());
        }
    }

    let numerator = REQUIRED_WEIGHT * matched_required as f64 + matched_bonus as f64;
    let denominator = REQUIRED_WEIGHT * required.len() as f64 + bonus.len().max(1) as f64;

    Coverage {
        coverage: (numerator / denominator).min(1.0),
        matched,
        missing_required,
    }
}
