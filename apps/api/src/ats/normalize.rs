#![allow(dead_code)]
//! Text Normalizer — the one vocabulary shared by similarity and coverage scoring.
//!
//! Lowercase → Unicode word segmentation (UAX #29) → Porter2 stemming.
//! Words carrying digits or punctuation (`node.js`, `k8s`) are technology names
//! and pass through unstemmed.

use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

fn stemmer() -> &'static Stemmer {
    static STEMMER: OnceLock<Stemmer> = OnceLock::new();
    STEMMER.get_or_init(|| Stemmer::create(Algorithm::English))
}

fn stem_word(word: &str) -> String {
    if word.chars().all(char::is_alphabetic) {
        stemmer().stem(word).into_owned()
    } else {
        word.to_string()
    }
}

/// Stemmed token stream for `text`, in reading order.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase().unicode_words().map(stem_word).collect()
}

/// Stemmed tokens joined by single spaces. Empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    tokens(text).join(" ")
}

/// Stems a single skill term (no word splitting).
pub fn stem_term(term: &str) -> String {
    stem_word(&term.trim().to_lowercase())
}
