use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ats::models::{ScoreInput, ScoreResult};
use crate::ats::parser::parse_and_validate;
use crate::ats::prompts::build_ats_prompt;
use crate::ats::scanner::Scanner;
use crate::errors::ScoringError;
use crate::llm_client::{CompletionBackend, CompletionRequest, DEFAULT_OLLAMA_MODEL};

/// Low temperature keeps repeated scoring of the same resume close together.
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_TOP_P: f32 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerativeConfig {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Prompts a completion backend and parses whatever comes back.
/// Only transport failures are errors; unusable text becomes a fallback result.
pub struct GenerativeScanner {
    backend: Arc<dyn CompletionBackend>,
    config: GenerativeConfig,
}

impl GenerativeScanner {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: GenerativeConfig) -> Self {
        Self { backend, config }
    }
}

#[async_trait]
impl Scanner for GenerativeScanner {
    async fn score(&self, input: &ScoreInput) -> Result<ScoreResult, ScoringError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            prompt: build_ats_prompt(input),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let raw = self.backend.complete(&request).await.map_err(|e| {
            warn!(
                resume_id = %input.resume_id,
                backend = self.backend.name(),
                "Completion backend failed: {e}"
            );
            ScoringError::from(e)
        })?;

        debug!(
            resume_id = %input.resume_id,
            backend = self.backend.name(),
            chars = raw.len(),
            "Completion received"
        );

        Ok(parse_and_validate(&raw, input))
    }

    fn backend_name(&self) -> &'static str {
        "generative"
    }
}
