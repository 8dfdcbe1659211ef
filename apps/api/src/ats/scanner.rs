#![allow(dead_code)]
//! Scanner — pluggable, trait-based scoring of one resume against one job.
//!
//! Default: `BaselineScanner` (pure-Rust, deterministic, no network).
//! Alternatives: `ExternalScanner` (remote scoring service) and
//! `GenerativeScanner` (text-completion backend + defensive parsing).
//!
//! `AppState` holds an `Arc<dyn Scanner>` built once from `ScannerConfig`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ats::baseline::{BaselineConfig, BaselineScanner};
use crate::ats::external::{ExternalConfig, ExternalScanner};
use crate::ats::generative::{GenerativeConfig, GenerativeScanner};
use crate::ats::models::{ScoreInput, ScoreResult};
use crate::errors::ScoringError;
use crate::llm_client::CompletionBackend;

/// The scanner contract. Implement this to add a backend without touching
/// the handler, batch runner, or caller code.
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn score(&self, input: &ScoreInput) -> Result<ScoreResult, ScoringError>;

    /// "baseline" | "external" | "generative" — reported to callers for transparency.
    fn backend_name(&self) -> &'static str;
}

/// The closed set of scanner strategies.
#[derive(Debug, Clone)]
pub enum ScannerConfig {
    Baseline(BaselineConfig),
    External(ExternalConfig),
    Generative(GenerativeConfig),
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig::Baseline(BaselineConfig::default())
    }
}

impl ScannerConfig {
    /// Constructs the scanner. The generative strategy needs a completion backend.
    pub fn build(
        &self,
        backend: Option<Arc<dyn CompletionBackend>>,
    ) -> Result<Arc<dyn Scanner>, ScoringError> {
        let scanner: Arc<dyn Scanner> = match self {
            ScannerConfig::Baseline(config) => Arc::new(BaselineScanner::new(config.clone())),
            ScannerConfig::External(config) => Arc::new(ExternalScanner::new(config.clone())?),
            ScannerConfig::Generative(config) => {
                let backend = backend.ok_or_else(|| {
                    ScoringError::InvalidInput(
                        "generative scanner requires a completion backend".to_string(),
                    )
                })?;
                Arc::new(GenerativeScanner::new(backend, config.clone()))
            }
        };
        Ok(scanner)
    }
}

/// Single entry point: validate, build the configured scanner, score.
pub async fn score(
    input: &ScoreInput,
    config: &ScannerConfig,
    backend: Option<Arc<dyn CompletionBackend>>,
) -> Result<ScoreResult, ScoringError> {
    input.validate()?;
    let scanner = config.build(backend)?;
    scanner.score(input).await
}
