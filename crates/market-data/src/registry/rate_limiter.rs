//! Token bucket rate limiter for a single price source.
//!
//! Each source gate owns one bucket. The bucket refills continuously at the
//! source's requests-per-minute rate and allows a small burst.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::models::SourceId;
use crate::provider::RateLimit;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
    /// Tokens per second.
    rate: f64,
    capacity: f64,
}

impl Bucket {
    fn new(requests_per_minute: u32, capacity: f64) -> Self {
        let capacity = capacity.max(1.0);
        Self {
            tokens: capacity,
            last_update: Instant::now(),
            rate: (requests_per_minute.max(1)) as f64 / 60.0,
            capacity,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Token bucket limiting how often one source is called.
pub struct RateLimiter {
    source: SourceId,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Bucket sized from the source's rate limit.
    ///
    /// Burst capacity equals the source's concurrency so that every permit
    /// holder can start immediately.
    pub fn new(source: SourceId, limit: &RateLimit) -> Self {
        Self {
            source,
            bucket: Mutex::new(Bucket::new(
                limit.requests_per_minute,
                limit.max_concurrency as f64,
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.bucket.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter for '{}' was poisoned, recovering", self.source);
            poisoned.into_inner()
        })
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.lock();
                if bucket.try_acquire() {
                    return;
                }
                bucket.time_until_available()
            };

            if wait > Duration::ZERO {
                debug!("Rate limiter: waiting {:?} for '{}'", wait, self.source);
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        self.lock().try_acquire()
    }

    pub fn remaining_tokens(&self) -> f64 {
        let mut bucket = self.lock();
        bucket.refill();
        bucket.tokens
    }
}
