//! Batch scoring — N resumes against one job, bounded fan-out, per-resume outcomes.
//!
//! One resume failing (backend down, timeout, bad input) never aborts the batch.
//! Output order always matches input order.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::ats::models::{ScoreInput, ScoreResult};
use crate::ats::scanner::Scanner;
use crate::errors::ScoringError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchOptions {
    /// Maximum scoring calls in flight at once. Values below 1 are treated as 1.
    pub max_concurrency: usize,
    /// Per-resume deadline.
    pub timeout: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
pub struct ResumeOutcome {
    pub resume_id: String,
    pub result: Result<ScoreResult, ScoringError>,
}

pub async fn score_batch(
    scanner: Arc<dyn Scanner>,
    inputs: Vec<ScoreInput>,
    options: BatchOptions,
) -> Vec<ResumeOutcome> {
    let total = inputs.len();
    let fan_out = options.max_concurrency.max(1);
    let timeout = options.timeout;
    info!(
        "Scoring {} resumes with {} scanner (fan-out {})",
        total,
        scanner.backend_name(),
        fan_out
    );

    let outcomes: Vec<ResumeOutcome> = stream::iter(inputs)
        .map(|input| {
            let scanner = Arc::clone(&scanner);
            async move {
                let result = score_one(scanner.as_ref(), &input, timeout).await;
                if let Err(e) = &result {
                    warn!(resume_id = %input.resume_id, "Resume not scored: {e}");
                }
                ResumeOutcome {
                    resume_id: input.resume_id,
                    result,
                }
            }
        })
        .buffered(fan_out)
        .collect()
        .await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!("Batch complete: {} scored, {} failed", total - failed, failed);
    outcomes
}

async fn score_one(
    scanner: &dyn Scanner,
    input: &ScoreInput,
    timeout: Duration,
) -> Result<ScoreResult, ScoringError> {
    input.validate()?;
    tokio::time::timeout(timeout, scanner.score(input))
        .await
        .map_err(|_| ScoringError::Timeout {
            after_ms: timeout.as_millis() as u64,
        })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ats::baseline::{BaselineConfig, BaselineScanner};
    use crate::test_support::sample_input;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn inputs(ids: &[&str]) -> Vec<ScoreInput> {
        ids.iter()
            .map(|id| ScoreInput {
                resume_id: id.to_string(),
                ..sample_input()
            })
            .collect()
    }

    /// Sleeps per call, fails for "down", and records peak concurrency.
    struct CountingScanner {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl CountingScanner {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Scanner for CountingScanner {
        async fn score(&self, input: &ScoreInput) -> Result<ScoreResult, ScoringError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if input.resume_id == "down" {
                return Err(ScoringError::BackendUnavailable("connection refused".into()));
            }
            Ok(ScoreResult::placeholder(input, "counting"))
        }

        fn backend_name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_baseline_batch_preserves_order() {
        let scanner = Arc::new(BaselineScanner::new(BaselineConfig::default()));
        let outcomes = score_batch(scanner, inputs(&["a", "b", "c"]), BatchOptions::default()).await;
        let ids: Vec<&str> = outcomes.iter().map(|o| o.resume_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_abort_batch() {
        let scanner = CountingScanner::new(Duration::from_millis(10));
        let outcomes = score_batch(scanner, inputs(&["a", "down", "c"]), BatchOptions::default()).await;
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(
            outcomes[1].result,
            Err(ScoringError::BackendUnavailable(_))
        ));
        assert!(outcomes[2].result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_is_bounded() {
        let scanner = CountingScanner::new(Duration::from_millis(50));
        let options = BatchOptions {
            max_concurrency: 2,
            timeout: Duration::from_secs(5),
        };
        let outcomes = score_batch(
            scanner.clone(),
            inputs(&["1", "2", "3", "4", "5", "6"]),
            options,
        )
        .await;
        assert_eq!(outcomes.len(), 6);
        assert!(scanner.peak.load(Ordering::SeqCst) <= 2);
        assert!(scanner.peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_concurrency_still_makes_progress() {
        let scanner = CountingScanner::new(Duration::from_millis(1));
        let options = BatchOptions {
            max_concurrency: 0,
            timeout: Duration::from_secs(1),
        };
        let outcomes = score_batch(scanner.clone(), inputs(&["a", "b"]), options).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(scanner.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let scanner = CountingScanner::new(Duration::from_secs(30));
        let options = BatchOptions {
            max_concurrency: 4,
            timeout: Duration::from_secs(1),
        };
        let outcomes = score_batch(scanner, inputs(&["slow"]), options).await;
        assert!(matches!(
            outcomes[0].result,
            Err(ScoringError::Timeout { after_ms: 1000 })
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_reported_per_resume() {
        let scanner = Arc::new(BaselineScanner::new(BaselineConfig::default()));
        let outcomes = score_batch(scanner, inputs(&["ok", " "]), BatchOptions::default()).await;
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(ScoringError::InvalidInput(_))));
    }
}
