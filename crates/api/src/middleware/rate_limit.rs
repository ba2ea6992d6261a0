//! Rate limiting middleware.
//!
//! Per-client-IP limits for the public form endpoints.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter as GovRateLimiter,
};
use std::{
    num::NonZeroU32,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::client_ip;

/// Key used when the client address cannot be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Idle keys are dropped every this many checks.
const SWEEP_INTERVAL: u64 = 1024;

/// Rate limiter state shared across all requests, keyed by client IP.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    checks: AtomicU64,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is zero (limiting disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: GovRateLimiter::keyed(Quota::per_minute(per_minute)),
            checks: AtomicU64::new(0),
            rate_limit_per_minute,
        })
    }

    /// Ok if allowed, otherwise the number of seconds to wait (at least 1).
    pub fn check(&self, key: &str) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == SWEEP_INTERVAL - 1 {
            self.sweep();
        }

        match self.limiter.check_key(&key.to_string()) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(DefaultClock::default().now());
                Err(wait_time.as_secs().max(1))
            }
        }
    }

    /// Forgets clients whose quota has fully replenished.
    pub fn sweep(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}

/// Middleware that applies rate limiting per client IP.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(rate_limiter) = &state.rate_limiter {
        let key = client_ip(
            req.headers(),
            req.extensions(),
            state.config.security.trust_forwarded_for,
        )
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

        if let Err(retry_after) = rate_limiter.check(&key) {
            tracing::warn!(client = %key, retry_after = retry_after, "Rate limit exceeded");
            return ApiError::RateLimited { retry_after }.into_response();
        }
    }

    next.run(req).await
}
