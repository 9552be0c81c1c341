//! Manual price source.
//!
//! Observations are supplied by the caller (an operator posting prices
//! through the ingestion endpoint) instead of fetched from a remote API.
//! The source holds them keyed by catalog item id and hands them out on
//! lookup.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SourceError;
use crate::models::{ItemLookup, RawObservation, SourceId};
use crate::provider::{PriceSource, RateLimit, SourceCapabilities, SupportedGames};

/// In-memory source backed by operator-supplied observations.
#[derive(Default)]
pub struct ManualSource {
    observations: HashMap<String, Vec<RawObservation>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from observations grouped by item id.
    pub fn from_observations(observations: HashMap<String, Vec<RawObservation>>) -> Self {
        Self { observations }
    }

    pub fn insert(&mut self, item_id: impl Into<String>, observation: RawObservation) {
        self.observations
            .entry(item_id.into())
            .or_default()
            .push(observation);
    }

    pub fn is_empty(&self) -> bool {
        self.observations.values().all(Vec::is_empty)
    }
}

#[async_trait]
impl PriceSource for ManualSource {
    fn id(&self) -> SourceId {
        SourceId::Manual
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            games: SupportedGames::All,
            structured_identifiers: true,
            graded_games: &[],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 6_000,
            max_concurrency: 8,
            min_delay: Duration::ZERO,
        }
    }

    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> Result<Vec<RawObservation>, SourceError> {
        Ok(self
            .observations
            .get(&lookup.item_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_returns_observations_for_item() {
        let mut source = ManualSource::new();
        assert!(source.is_empty());
        source.insert("item-1", RawObservation::sale("Charizard", dec!(50), "USD"));

        let lookup = ItemLookup {
            item_id: "item-1".to_string(),
            ..Default::default()
        };
        let observations = source.fetch_observations(&lookup).await.unwrap();
        assert_eq!(observations.len(), 1);

        let other = ItemLookup {
            item_id: "item-2".to_string(),
            ..Default::default()
        };
        assert!(source.fetch_observations(&other).await.unwrap().is_empty());
    }
}
