use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::ats::batch::{score_batch, ResumeOutcome};
use crate::ats::models::{ScoreInput, ScoreResult};
use crate::errors::{AppError, ScoringError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDoc {
    pub resume_id: String,
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBatchRequest {
    pub job_description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub bonus_skills: Vec<String>,
    pub resumes: Vec<ResumeDoc>,
    /// Shortlist cut-off on the 0 – 100 scale.
    pub threshold: Option<f64>,
}

impl ScoreBatchRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.resumes.is_empty() {
            return Err(AppError::Validation("resumes cannot be empty".to_string()));
        }
        if let Some(t) = self.threshold {
            if !t.is_finite() || !(0.0..=100.0).contains(&t) {
                return Err(AppError::Validation(
                    "threshold must be between 0 and 100".to_string(),
                ));
            }
        }
        // Skills are shared by every resume, so a blank one fails the whole request.
        let blank_skill = self
            .required_skills
            .iter()
            .chain(&self.bonus_skills)
            .any(|s| s.trim().is_empty());
        if blank_skill {
            return Err(AppError::Validation(
                "skill entries cannot be blank".to_string(),
            ));
        }
        Ok(())
    }

    fn into_inputs(self) -> Vec<ScoreInput> {
        let ScoreBatchRequest {
            job_description,
            required_skills,
            bonus_skills,
            resumes,
            ..
        } = self;
        resumes
            .into_iter()
            .map(|doc| ScoreInput {
                resume_id: doc.resume_id,
                resume_text: doc.resume_text,
                job_description: job_description.clone(),
                required_skills: required_skills.clone(),
                bonus_skills: bonus_skills.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredOutcome {
    #[serde(flatten)]
    pub result: ScoreResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortlisted: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct OutcomeError {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedOutcome {
    pub resume_id: String,
    pub error: OutcomeError,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OutcomeBody {
    Scored(ScoredOutcome),
    Failed(FailedOutcome),
}

impl OutcomeBody {
    fn from_outcome(outcome: ResumeOutcome, threshold: Option<f64>) -> Self {
        match outcome.result {
            Ok(result) => {
                let shortlisted = threshold.map(|t| f64::from(result.score) >= t);
                OutcomeBody::Scored(ScoredOutcome {
                    result,
                    shortlisted,
                })
            }
            Err(e) => OutcomeBody::Failed(FailedOutcome {
                resume_id: outcome.resume_id,
                error: OutcomeError {
                    code: error_code(&e),
                    message: e.to_string(),
                },
            }),
        }
    }
}

fn error_code(err: &ScoringError) -> &'static str {
    match err {
        ScoringError::InvalidInput(_) => "VALIDATION_ERROR",
        ScoringError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
        ScoringError::Timeout { .. } => "SCORING_TIMEOUT",
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBatchResponse {
    pub batch_id: Uuid,
    pub scored_at: DateTime<Utc>,
    pub scanner: &'static str,
    pub results: Vec<OutcomeBody>,
}

/// Rate-limit key for the caller: first `x-forwarded-for` hop, else "anon".
fn client_key(headers: &HeaderMap) -> String {
    let client = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anon");
    format!("ats:{client}")
}

/// POST /api/v1/ats/score
pub async fn handle_score_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ScoreBatchRequest>, JsonRejection>,
) -> Result<Json<ScoreBatchResponse>, AppError> {
    if !state.rate_limiter.check(&client_key(&headers)) {
        return Err(AppError::RateLimited);
    }
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    req.validate()?;

    let batch_id = Uuid::new_v4();
    let threshold = req.threshold;
    let inputs = req.into_inputs();
    info!(%batch_id, resumes = inputs.len(), scanner = state.scanner.backend_name(), "Scoring batch");

    let outcomes = score_batch(state.scanner.clone(), inputs, state.batch).await;
    let results = outcomes
        .into_iter()
        .map(|o| OutcomeBody::from_outcome(o, threshold))
        .collect();

    Ok(Json(ScoreBatchResponse {
        batch_id,
        scored_at: Utc::now(),
        scanner: state.scanner.backend_name(),
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU32;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::ats::baseline::{BaselineConfig, BaselineScanner};
    use crate::ats::batch::BatchOptions;
    use crate::rate_limit::RateLimiter;
    use crate::routes::build_router;

    fn state(limit: u32) -> AppState {
        AppState {
            scanner: Arc::new(BaselineScanner::new(BaselineConfig::default())),
            batch: BatchOptions::default(),
            rate_limiter: Arc::new(RateLimiter::per_minute(NonZeroU32::new(limit).unwrap())),
        }
    }

    fn request_body(threshold: Option<f64>) -> Value {
        let mut body = json!({
            "jobDescription": "Looking for Node.js and PostgreSQL developer",
            "requiredSkills": ["Node.js", "PostgreSQL"],
            "bonusSkills": ["TypeScript"],
            "resumes": [
                {"resumeId": "r1", "resumeText": "Experienced in Node.js, TypeScript and PostgreSQL"},
                {"resumeId": "r2", "resumeText": "Java and Spring Boot"}
            ]
        });
        if let Some(t) = threshold {
            body["threshold"] = json!(t);
        }
        body
    }

    async fn post(app: axum::Router, body: Value, forwarded: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/ats/score")
            .header("content-type", "application/json");
        if let Some(ip) = forwarded {
            builder = builder.header("x-forwarded-for", ip);
        }
        let resp = app
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_scores_batch_in_order() {
        let (status, body) = post(build_router(state(60)), request_body(None), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scanner"], "baseline");
        assert!(body["batchId"].as_str().unwrap().parse::<Uuid>().is_ok());
        assert!(body["scoredAt"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());

        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["status"], "scored");
        assert_eq!(results[0]["resumeId"], "r1");
        assert_eq!(results[0]["score"], 66);
        assert_eq!(results[0]["components"]["keywordCoverage"], 1.0);
        assert!(results[0].get("shortlisted").is_none());
        assert_eq!(results[1]["resumeId"], "r2");
        assert_eq!(
            results[1]["missingMustHaves"],
            json!(["node.js", "postgresql"])
        );
    }

    #[tokio::test]
    async fn test_threshold_marks_shortlist() {
        let (status, body) = post(build_router(state(60)), request_body(Some(60.0)), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["shortlisted"], true);
        assert_eq!(body["results"][1]["shortlisted"], false);
    }

    #[tokio::test]
    async fn test_blank_resume_id_fails_only_that_resume() {
        let mut body = request_body(None);
        body["resumes"][1]["resumeId"] = json!("  ");
        let (status, body) = post(build_router(state(60)), body, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["status"], "scored");
        assert_eq!(body["results"][1]["status"], "failed");
        assert_eq!(body["results"][1]["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_empty_resumes_is_rejected() {
        let mut body = request_body(None);
        body["resumes"] = json!([]);
        let (status, body) = post(build_router(state(60)), body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        for (content_type, raw) in [
            ("application/json", "{\"jobDescription\": "),
            ("application/json", "{\"jobDescription\": \"x\"}"),
            ("text/plain", "{}"),
        ] {
            let req = Request::builder()
                .method("POST")
                .uri("/api/v1/ats/score")
                .header("content-type", content_type)
                .body(Body::from(raw))
                .unwrap();
            let resp = build_router(state(60)).oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {raw:?}");
            let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_out_of_range_threshold_is_rejected() {
        let (status, _) = post(build_router(state(60)), request_body(Some(120.0)), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_skill_is_rejected() {
        let mut body = request_body(None);
        body["requiredSkills"] = json!(["Node.js", ""]);
        let (status, _) = post(build_router(state(60)), body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_client() {
        let app = build_router(state(1));
        let (first, _) = post(app.clone(), request_body(None), Some("10.0.0.1")).await;
        assert_eq!(first, StatusCode::OK);

        let (second, body) = post(app.clone(), request_body(None), Some("10.0.0.1")).await;
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"]["code"], "RATE_LIMITED");

        let (other, _) = post(app, request_body(None), Some("10.0.0.2, 172.16.0.1")).await;
        assert_eq!(other, StatusCode::OK);
    }

    #[test]
    fn test_client_key_defaults_to_anon() {
        assert_eq!(client_key(&HeaderMap::new()), "ats:anon");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", " 203.0.113.7 , 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers), "ats:203.0.113.7");
    }

    #[test]
    fn test_failed_outcome_shape() {
        let outcome = ResumeOutcome {
            resume_id: "r7".into(),
            result: Err(ScoringError::Timeout { after_ms: 1000 }),
        };
        let value = serde_json::to_value(OutcomeBody::from_outcome(outcome, Some(50.0))).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["resumeId"], "r7");
        assert_eq!(value["error"]["code"], "SCORING_TIMEOUT");
    }
}
