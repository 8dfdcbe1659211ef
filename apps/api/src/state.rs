use std::sync::Arc;

use crate::ats::batch::BatchOptions;
use crate::ats::scanner::Scanner;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable scanner built once from `ScannerConfig`. Default: BaselineScanner.
    pub scanner: Arc<dyn Scanner>,
    pub batch: BatchOptions,
    pub rate_limiter: Arc<RateLimiter>,
}
