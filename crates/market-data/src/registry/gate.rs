//! Per-source call gate.
//!
//! Every call to a source passes through its gate: a semaphore bounding
//! in-flight requests, a token bucket bounding request rate, and a fixed
//! pause held after the call before the permit is released.
//!
//! One gate exists per configured source for the life of the process, so
//! overlapping triggers share its limits. Triggers that want a different
//! pause pass it per call.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::sync::Semaphore;

use crate::errors::SourceError;
use crate::models::{ItemLookup, RawObservation, SourceId};
use crate::provider::{PriceSource, SourceCapabilities};

use super::rate_limiter::RateLimiter;

pub struct SourceGate {
    source: Arc<dyn PriceSource>,
    permits: Semaphore,
    limiter: RateLimiter,
    delay: Duration,
}

impl SourceGate {
    /// Gate using the source's own rate limit and delay.
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        let limit = source.rate_limit();
        let permits = Semaphore::new(limit.max_concurrency.max(1));
        let limiter = RateLimiter::new(source.id(), &limit);
        Self {
            source,
            permits,
            limiter,
            delay: limit.min_delay,
        }
    }

    pub fn id(&self) -> SourceId {
        self.source.id()
    }

    pub fn capabilities(&self) -> SourceCapabilities {
        self.source.capabilities()
    }

    /// Default post-call pause.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch observations for `lookup` under this source's limits.
    pub async fn fetch(&self, lookup: &ItemLookup) -> Result<Vec<RawObservation>, SourceError> {
        self.fetch_with_delay(lookup, None).await
    }

    /// Like [`fetch`](Self::fetch), with the post-call pause replaced when
    /// `delay` is set. Concurrency and rate limits are unaffected.
    pub async fn fetch_with_delay(
        &self,
        lookup: &ItemLookup,
        delay: Option<Duration>,
    ) -> Result<Vec<RawObservation>, SourceError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SourceError::RateLimited {
                source_id: self.id().to_string(),
            })?;
        self.limiter.acquire().await;

        let result = self.source.fetch_observations(lookup).await;
        match &result {
            Ok(observations) => debug!(
                "{} returned {} observations for {}",
                self.id(),
                observations.len(),
                lookup.item_id
            ),
            Err(e) => debug!("{} failed for {}: {}", self.id(), lookup.item_id, e),
        }

        let delay = delay.unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{RateLimit, SupportedGames};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    struct CountingSource {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for CountingSource {
        fn id(&self) -> SourceId {
            SourceId::Ebay
        }

        fn capabilities(&self) -> SourceCapabilities {
            SourceCapabilities {
                games: SupportedGames::All,
                structured_identifiers: false,
                graded_games: &[],
            }
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                requests_per_minute: 60_000,
                max_concurrency: 1,
                min_delay: Duration::from_millis(20),
            }
        }

        async fn fetch_observations(
            &self,
            _lookup: &ItemLookup,
        ) -> Result<Vec<RawObservation>, SourceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_gate_serializes_and_delays_calls() {
        let source = Arc::new(CountingSource {
            in_flight: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let gate = Arc::new(SourceGate::new(source.clone()));
        let lookup = ItemLookup::default();

        let start = Instant::now();
        let (a, b) = tokio::join!(gate.fetch(&lookup), gate.fetch(&lookup));
        assert!(a.is_ok() && b.is_ok());

        assert_eq!(source.max_seen.load(Ordering::SeqCst), 1);
        // Two calls, each followed by the 20ms pause while holding the permit.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_per_call_delay_override() {
        let source = Arc::new(CountingSource {
            in_flight: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let gate = SourceGate::new(source);
        assert_eq!(gate.delay(), Duration::from_millis(20));
        assert_eq!(gate.id(), SourceId::Ebay);

        let start = Instant::now();
        gate.fetch_with_delay(&ItemLookup::default(), Some(Duration::from_millis(60)))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(gate.delay(), Duration::from_millis(20));
    }
}
