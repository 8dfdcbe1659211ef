use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::ats::baseline::BaselineConfig;
use crate::ats::batch::BatchOptions;
use crate::ats::external::ExternalConfig;
use crate::ats::generative::{GenerativeConfig, DEFAULT_TEMPERATURE, DEFAULT_TOP_P};
use crate::ats::models::{DEFAULT_FORMAT_QUALITY, DEFAULT_RECENCY};
use crate::ats::scanner::ScannerConfig;
use crate::llm_client::{
    BackendSettings, LlmProvider, DEFAULT_OLLAMA_HOST, DEFAULT_OLLAMA_MODEL,
    DEFAULT_OPENROUTER_BASE_URL, DEFAULT_OPENROUTER_MODEL,
};

/// Application configuration loaded from environment variables.
/// Fails at startup on malformed values or a missing variable the chosen scanner needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub scanner: ScannerConfig,
    /// Only consulted when `scanner` is generative.
    pub backend: BackendSettings,
    pub batch: BatchOptions,
    pub rate_limit_per_minute: NonZeroU32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout = Duration::from_secs(parse_or(&var, "ATS_TIMEOUT_SECS", 60u64)?);
        let batch = BatchOptions {
            max_concurrency: parse_or(&var, "ATS_MAX_CONCURRENCY", 4usize)?.max(1),
            timeout,
        };

        let provider: LlmProvider = parse_or(&var, "LLM_PROVIDER", LlmProvider::Ollama)?;
        let backend = BackendSettings {
            provider,
            ollama_host: var("OLLAMA_HOST").unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string()),
            openrouter_api_key: var("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty()),
            openrouter_base_url: var("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            request_timeout: timeout,
        };

        let kind = var("ATS_SCANNER").unwrap_or_else(|| "baseline".to_string());
        let scanner = match kind.trim().to_ascii_lowercase().as_str() {
            "baseline" => ScannerConfig::Baseline(BaselineConfig {
                recency: parse_fraction(&var, "ATS_RECENCY", DEFAULT_RECENCY)?,
                format_quality: parse_fraction(&var, "ATS_FORMAT_QUALITY", DEFAULT_FORMAT_QUALITY)?,
            }),
            "external" => {
                let mut external = if parse_bool(&var, "EXTERNAL_ATS_DISABLED", false)? {
                    ExternalConfig::disabled()
                } else {
                    ExternalConfig::new(require(&var, "EXTERNAL_ATS_ENDPOINT")?)
                };
                external.timeout = timeout;
                ScannerConfig::External(external)
            }
            "generative" => {
                if provider == LlmProvider::OpenRouter {
                    require(&var, "OPENROUTER_API_KEY")?;
                }
                ScannerConfig::Generative(GenerativeConfig {
                    model: default_model(&var, provider),
                    temperature: parse_or(&var, "LLM_TEMPERATURE", DEFAULT_TEMPERATURE)?,
                    top_p: parse_or(&var, "LLM_TOP_P", DEFAULT_TOP_P)?,
                })
            }
            other => {
                return Err(anyhow!(
                    "ATS_SCANNER must be baseline, external or generative (got '{other}')"
                ))
            }
        };

        Ok(Config {
            port: parse_or(&var, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scanner,
            backend,
            batch,
            rate_limit_per_minute: NonZeroU32::new(parse_or(&var, "RATE_LIMIT_PER_MINUTE", 60u32)?)
                .context("RATE_LIMIT_PER_MINUTE must be at least 1")?,
        })
    }
}

fn default_model<F>(var: &F, provider: LlmProvider) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match provider {
        LlmProvider::Ollama => var("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
        LlmProvider::OpenRouter => {
            var("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string())
        }
        LlmProvider::Mock => "mock".to_string(),
    }
}

fn require<F>(var: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses `key` when set, else returns `default`. A set but malformed value is an error.
fn parse_or<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value '{raw}' for {key}: {e}")),
        None => Ok(default),
    }
}

fn parse_fraction<F>(var: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(var, key, default)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(anyhow!("{key} must be between 0 and 1 (got {value})"));
    }
    Ok(value)
}

fn parse_bool<F>(var: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(anyhow!("{key} must be a boolean (got '{v}')")),
        },
    }
}
