//! Token-bucket rate limiter enforcing a per-site QPS ceiling.
//!
//! `acquire()` suspends the caller until exactly one token is available,
//! computing the precise refill wait rather than polling, so concurrent
//! waiters drain in the FIFO order tokio's mutex hands out its lock.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared token bucket for one engine run. Capacity equals `qps` (or 1 if
/// `qps < 1`); tokens refill continuously at `qps` tokens/second.
pub struct RateLimiter {
    qps: f64,
    capacity: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(qps: f64) -> Self {
        let capacity = if qps < 1.0 { 1.0 } else { qps };
        Self {
            qps,
            capacity,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Suspend until a token is available, then consume it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.qps).min(self.capacity);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    None
                } else {
                    let deficit = 1.0 - bucket.tokens;
                    Some(Duration::from_secs_f64(deficit / self.qps))
                }
            };

            match wait {
                None => return,
                Some(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
}
