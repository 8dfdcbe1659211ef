/// LLM Client — the single point of entry for all text-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a completion provider directly.
/// Scanners receive an `Arc<dyn CompletionBackend>` and only ever see the raw text.
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub mod mock;
pub mod ollama;
pub mod openrouter;
pub mod prompts;

pub use mock::MockClient;
pub use ollama::OllamaClient;
pub use openrouter::OpenRouterClient;

pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_OPENROUTER_MODEL: &str = "openrouter/auto";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing API key for provider '{0}'")]
    MissingApiKey(&'static str),
}

/// One text-completion call. Providers map this onto their own wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
}

/// A text-completion service. The returned string is untrusted free text.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Provider label for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Ollama,
    OpenRouter,
    Mock,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openrouter" => Ok(Self::OpenRouter),
            "mock" => Ok(Self::Mock),
            other => Err(format!(
                "unknown LLM provider '{other}' (expected ollama, openrouter or mock)"
            )),
        }
    }
}

/// Everything needed to construct a completion backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub provider: LlmProvider,
    pub ollama_host: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub request_timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Ollama,
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            openrouter_api_key: None,
            openrouter_base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Builds the configured provider behind the `CompletionBackend` trait.
pub fn build_backend(settings: &BackendSettings) -> Result<Arc<dyn CompletionBackend>, LlmError> {
    let backend: Arc<dyn CompletionBackend> = match settings.provider {
        LlmProvider::Ollama => Arc::new(OllamaClient::new(
            settings.ollama_host.clone(),
            settings.request_timeout,
        )?),
        LlmProvider::OpenRouter => {
            let api_key = settings
                .openrouter_api_key
                .clone()
                .ok_or(LlmError::MissingApiKey("openrouter"))?;
            Arc::new(OpenRouterClient::new(
                api_key,
                settings.openrouter_base_url.clone(),
                settings.request_timeout,
            )?)
        }
        LlmProvider::Mock => Arc::new(MockClient),
    };
    Ok(backend)
}

/// Shared reqwest client construction for the HTTP providers.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Distinguishes client-side timeouts from other transport failures.
pub(crate) fn transport_error(err: reqwest::Error, timeout: Duration) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }
    } else {
        LlmError::Http(err)
    }
}
