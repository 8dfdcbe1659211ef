use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};

use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DashMapStateStore,
    Quota,
};

type KeyedLimiter<C> =
    governor::RateLimiter<String, DashMapStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Idle keys are swept once every this many checks.
const RETAIN_EVERY: u64 = 1024;

/// Per-client request limiter (GCRA via `governor`).
///
/// A key may burst up to the quota, then refills evenly over the minute. Keys whose
/// state has fully refilled are dropped on the periodic sweep, so spoofed client
/// keys cannot grow the store without bound.
pub struct RateLimiter<C: Clock = DefaultClock> {
    inner: KeyedLimiter<C>,
    checks: AtomicU64,
}

impl RateLimiter {
    pub fn per_minute(limit: NonZeroU32) -> Self {
        Self::with_clock(Quota::per_minute(limit), &DefaultClock::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(quota: Quota, clock: &C) -> Self {
        Self {
            inner: governor::RateLimiter::dashmap_with_clock(quota, clock),
            checks: AtomicU64::new(0),
        }
    }

    /// Records a hit for `key`. Returns false when the key is over its quota.
    pub fn check(&self, key: &str) -> bool {
        let n = self.checks.fetch_add(1, Ordering::Relaxed) + 1;
        if n % RETAIN_EVERY == 0 {
            self.inner.retain_recent();
        }
        self.inner.check_key(&key.to_string()).is_ok()
    }

    /// Number of keys currently held.
    pub fn tracked_keys(&self) -> usize {
        self.inner.len()
    }
}
