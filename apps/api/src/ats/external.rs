//! External scanner — delegates scoring to a remote ATS service.
//!
//! Wire contract: `POST {endpoint}` with the `ScoreInput` JSON; the service answers
//! with a `ScoreResult`-shaped JSON body. The body goes through the same defensive
//! parser as model output, so a half-valid answer still yields a usable result.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::ats::models::{ScoreInput, ScoreResult};
use crate::ats::parser::parse_and_validate;
use crate::ats::scanner::Scanner;
use crate::errors::ScoringError;

pub const EXTERNAL_DISABLED_NOTE: &str = "external-adapter-disabled";

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalConfig {
    pub endpoint: Option<String>,
    /// Disabled deployments answer with a placeholder and never call out.
    pub disabled: bool,
    pub timeout: Duration,
}

impl ExternalConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            disabled: false,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn disabled() -> Self {
        Self {
            endpoint: None,
            disabled: true,
            timeout: Duration::from_secs(30),
        }
    }
}

pub struct ExternalScanner {
    client: Client,
    config: ExternalConfig,
}

impl ExternalScanner {
    pub fn new(config: ExternalConfig) -> Result<Self, ScoringError> {
        if !config.disabled && config.endpoint.as_deref().map_or(true, |e| e.trim().is_empty()) {
            return Err(ScoringError::InvalidInput(
                "external scanner requires an endpoint unless disabled".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScoringError::BackendUnavailable(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn transport_error(&self, err: reqwest::Error) -> ScoringError {
        if err.is_timeout() {
            ScoringError::Timeout {
                after_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            ScoringError::BackendUnavailable(err.to_string())
        }
    }
}

#[async_trait]
impl Scanner for ExternalScanner {
    async fn score(&self, input: &ScoreInput) -> Result<ScoreResult, ScoringError> {
        let endpoint = match (&self.config.endpoint, self.config.disabled) {
            (Some(endpoint), false) => endpoint,
            _ => return Ok(ScoreResult::placeholder(input, EXTERNAL_DISABLED_NOTE)),
        };

        let response = self
            .client
            .post(endpoint)
            .json(input)
            .send()
            .await
            .map_err(|e| {
                warn!(resume_id = %input.resume_id, "External ATS unreachable: {e}");
                self.transport_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("External ATS returned {}: {}", status, body);
            return Err(ScoringError::BackendUnavailable(format!(
                "external ATS returned status {}",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(resume_id = %input.resume_id, bytes = body.len(), "External ATS answered");

        Ok(parse_and_validate(&body, input))
    }

    fn backend_name(&self) -> &'static str {
        "external"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::parser::PARSE_FAILED_NOTE;
    use crate::test_support::{dead_url, sample_input, spawn_server};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_disabled_returns_placeholder_without_calling_out() {
        let scanner = ExternalScanner::new(ExternalConfig::disabled()).unwrap();
        let input = sample_input();
        let result = scanner.score(&input).await.unwrap();
        assert_eq!(result.score, 50);
        assert_eq!(result.notes, vec![EXTERNAL_DISABLED_NOTE]);
        assert_eq!(result.missing_must_haves, input.required_skills);
        assert!(result.matched_keywords.is_empty());
    }

    #[test]
    fn test_enabled_without_endpoint_is_rejected() {
        let config = ExternalConfig {
            endpoint: None,
            disabled: false,
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            ExternalScanner::new(config),
            Err(ScoringError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_backend_unavailable() {
        let scanner = ExternalScanner::new(ExternalConfig::new(dead_url().await)).unwrap();
        let err = scanner.score(&sample_input()).await.unwrap_err();
        assert!(matches!(err, ScoringError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn test_error_status_is_backend_unavailable() {
        let app = Router::new().route(
            "/score",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(app).await;

        let scanner = ExternalScanner::new(ExternalConfig::new(format!("{base}/score"))).unwrap();
        let err = scanner.score(&sample_input()).await.unwrap_err();
        assert!(matches!(err, ScoringError::BackendUnavailable(msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_posts_input_and_validates_answer() {
        let app = Router::new().route(
            "/score",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["resumeId"], "r1");
                assert_eq!(body["requiredSkills"], json!(["Node.js", "PostgreSQL"]));
                Json(json!({
                    "resumeId": "r1",
                    "score": 140,
                    "components": {"similarity": 0.9, "keywordCoverage": 1.0},
                    "matchedKeywords": ["node.js"],
                    "notes": ["remote"]
                }))
            }),
        );
        let base = spawn_server(app).await;

        let scanner = ExternalScanner::new(ExternalConfig::new(format!("{base}/score"))).unwrap();
        let result = scanner.score(&sample_input()).await.unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.components.similarity, 0.9);
        assert_eq!(result.components.recency, 0.0);
        assert!(result.matched_keywords.contains("node.js"));
        assert_eq!(result.notes, vec!["remote"]);
    }

    #[tokio::test]
    async fn test_garbage_body_degrades_to_fallback() {
        let app = Router::new().route("/score", post(|| async { "<html>gateway</html>" }));
        let base = spawn_server(app).await;

        let scanner = ExternalScanner::new(ExternalConfig::new(format!("{base}/score"))).unwrap();
        let result = scanner.score(&sample_input()).await.unwrap();
        assert_eq!(result.notes, vec![PARSE_FAILED_NOTE]);
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/score",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                "{}"
            }),
        );
        let base = spawn_server(app).await;

        let mut config = ExternalConfig::new(format!("{base}/score"));
        config.timeout = Duration::from_millis(100);
        let scanner = ExternalScanner::new(config).unwrap();
        let err = scanner.score(&sample_input()).await.unwrap_err();
        assert!(matches!(err, ScoringError::Timeout { after_ms: 100 }));
    }
}
