//! Pacing for calls to the shared verification service

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;

/// Gate awaited before every verification call
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Wait until the next call may start
    async fn until_ready(&self);
}

/// Token bucket of size one, refilled once per settle delay
///
/// Consecutive calls start at least one settle delay apart. The first call
/// goes through immediately.
pub struct SettleDelay {
    delay: Duration,
    limiter: DefaultDirectRateLimiter,
}

impl SettleDelay {
    /// Returns `None` for a zero delay
    pub fn new(delay: Duration) -> Option<Self> {
        let quota = Quota::with_period(delay)?;
        Some(Self {
            delay,
            limiter: RateLimiter::direct(quota),
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl RateLimit for SettleDelay {
    async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }
}

/// No pacing at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

#[async_trait]
impl RateLimit for Unlimited {
    async fn until_ready(&self) {}
}

/// Pick a limiter for the given settle delay
pub fn limiter_for(delay: Duration) -> Arc<dyn RateLimit> {
    match SettleDelay::new(delay) {
        Some(settle) => Arc::new(settle),
        None => Arc::new(Unlimited),
    }
}
