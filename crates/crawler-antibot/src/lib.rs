//! Anti-bot middleware: composes the token-bucket rate limiter with a
//! post-acquire delay and jitter, per-engine-run (not global).
//!
//! Grounded on `riptide-stealth::rate_limiter`'s per-domain delay
//! composition, simplified to the spec's fixed two-knob model — no
//! adaptive speed-up/slow-down on success/failure, since that's outside
//! what this middleware is named to do.

use crawler_ratelimit::RateLimiter;
use rand::Rng;
use std::time::Duration;

pub struct AntiBot {
    rate_limiter: Option<RateLimiter>,
    delay: Duration,
    jitter: bool,
}

impl AntiBot {
    pub fn new(qps: Option<f64>, delay_secs: f64, jitter: bool) -> Self {
        Self {
            rate_limiter: qps.map(RateLimiter::new),
            delay: Duration::from_secs_f64(delay_secs.max(0.0)),
            jitter,
        }
    }

    /// Applies rate limiting (if configured) then the post-acquire delay,
    /// plus uniform jitter in `[0, 5*delay)` when enabled.
    pub async fn before_request(&self) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        if self.jitter && self.delay > Duration::ZERO {
            let max_jitter = self.delay.as_secs_f64() * 5.0;
            let jitter_secs = rand::thread_rng().gen_range(0.0..max_jitter);
            tokio::time::sleep(Duration::from_secs_f64(jitter_secs)).await;
        }
    }

    /// Reserved for future response inspection; a no-op today.
    pub async fn after_request(&self) {}
}
