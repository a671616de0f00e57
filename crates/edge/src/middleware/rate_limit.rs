//! Rate limiting middleware using a token bucket

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use guzellestir_common::config::RateLimitConfig;
use guzellestir_common::errors::AppError;
use std::num::NonZeroU32;
use std::sync::Arc;

pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

#[derive(Clone)]
pub struct RateLimitState {
    limiter: Arc<GlobalRateLimiter>,
    requests_per_second: u32,
    enabled: bool,
}

impl RateLimitState {
    pub fn new(config: &RateLimitConfig) -> Self {
        let rps = NonZeroU32::new(config.requests_per_second.max(1)).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.burst.max(1)).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(rps).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            requests_per_second: config.requests_per_second,
            enabled: config.enabled,
        }
    }
}

/// Rate limiting middleware
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.enabled {
        return Ok(next.run(request).await);
    }

    match state.limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            Err(AppError::RateLimited {
                limit: state.requests_per_second,
            })
        }
    }
}
