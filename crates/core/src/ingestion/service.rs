//! Price event ingestion.
//!
//! For each selected catalog item: backfill its canonical key, fetch raw
//! observations through the source gate, score and flag each observation,
//! upsert it as a price event and route it by confidence:
//!
//! ```text
//! confidence >= auto_match, not outlier  -> candidate for the validator
//! review_min <= confidence < auto_match  -> review queue
//! confidence < review_min                -> recorded only
//! ```
//!
//! The candidate price for an item is the median of its qualifying
//! observations from the source.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use cardprice_market_data::{GradedPrice, ManualSource, RawObservation, SourceGate, SourceId};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use uuid::Uuid;

use super::model::{IngestionRequest, IngestionResult, ItemIngestion, ItemOutcome, ManualObservation};
use crate::catalog::{CatalogRepositoryTrait, ItemFilter, MarketItem};
use crate::config::{EngineConfig, IngestionConfig, MatchThresholds};
use crate::errors::Result;
use crate::matching::{exact_number_match, MatchScorer, PositionalScorer};
use crate::price_events::{
    aggregate_prices, generate_event_id, OutlierDetector, PriceEvent, PriceEventRepositoryTrait,
};
use crate::pricing::{PriceCandidate, PriceValidator, ValidationOutcome};
use crate::review::ReviewQueueManager;
use crate::sources::SourceProvider;

/// A stored event together with its routing inputs.
struct RecordedObservation {
    event: PriceEvent,
    grades: Vec<GradedPrice>,
}

pub struct PriceEventIngestor {
    catalog: Arc<dyn CatalogRepositoryTrait>,
    events: Arc<dyn PriceEventRepositoryTrait>,
    review: Arc<ReviewQueueManager>,
    validator: Arc<PriceValidator>,
    sources: Arc<dyn SourceProvider>,
    scorer: Arc<dyn MatchScorer>,
    outliers: OutlierDetector,
    thresholds: MatchThresholds,
    config: IngestionConfig,
}

impl PriceEventIngestor {
    pub fn new(
        catalog: Arc<dyn CatalogRepositoryTrait>,
        events: Arc<dyn PriceEventRepositoryTrait>,
        review: Arc<ReviewQueueManager>,
        validator: Arc<PriceValidator>,
        sources: Arc<dyn SourceProvider>,
        config: &EngineConfig,
    ) -> Result<Self> {
        Ok(Self {
            catalog,
            events,
            review,
            validator,
            sources,
            scorer: Arc::new(PositionalScorer),
            outliers: OutlierDetector::new(&config.outliers.blocklist)?,
            thresholds: config.matching.clone(),
            config: config.ingestion.clone(),
        })
    }

    /// Replace the name scorer.
    pub fn with_scorer(mut self, scorer: Arc<dyn MatchScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Run one ingestion trigger.
    ///
    /// A missing credential for the requested source fails before any item
    /// is selected. Every other failure is per item and reported in the
    /// result.
    pub async fn ingest(&self, request: IngestionRequest) -> Result<IngestionResult> {
        let remote_gate = match request.source {
            SourceId::Manual => None,
            id => Some(self.sources.gate(id)?),
        };

        let observed_ids = (request.market_item_ids.is_none()
            && request.source == SourceId::Manual
            && !request.observations.is_empty())
        .then(|| {
            let mut seen = HashSet::new();
            request
                .observations
                .iter()
                .filter(|o| seen.insert(o.market_item_id.clone()))
                .map(|o| o.market_item_id.clone())
                .collect::<Vec<_>>()
        });

        // Items named by observations are all selected unless a limit is given.
        let limit = match (&observed_ids, request.limit) {
            (_, Some(limit)) => limit,
            (Some(ids), None) => ids.len(),
            (None, None) => self.config.default_limit,
        };
        let filter = ItemFilter {
            category: request.category.clone(),
            ids: request.market_item_ids.clone().or(observed_ids),
            limit,
        };
        let items = self.catalog.list_items(&filter)?;

        let mut result = IngestionResult::new(request.source);
        let gate = match remote_gate {
            Some(gate) => gate,
            None => {
                let (source, unknown) = manual_source(&request.observations, &items);
                for id in unknown {
                    result.errors.push(format!("{}: unknown market item id", id));
                }
                Arc::new(SourceGate::new(Arc::new(source)))
            }
        };

        info!(
            "Ingesting {} items from {} (limit {})",
            items.len(),
            request.source,
            filter.limit
        );

        let pending: Vec<_> = items.iter().map(|item| self.process_item(item, &gate, None)).collect();
        let outcomes: Vec<ItemIngestion> = stream::iter(pending)
            .buffer_unordered(self.config.max_concurrent_items.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            result.add_item(outcome);
        }

        info!(
            "Ingestion from {} done: {} items, {} events, {} updated, {} rejected, {} queued, {} errors",
            result.source,
            result.items_processed,
            result.events_recorded,
            result.prices_updated,
            result.prices_rejected,
            result.queued_for_review,
            result.errors.len()
        );
        Ok(result)
    }

    /// Ingest one item from one source.
    ///
    /// `delay` replaces the gate's post-call pause for this fetch. Never
    /// returns an error: failures are recorded on the returned value so that
    /// one item cannot affect another.
    pub async fn process_item(
        &self,
        item: &MarketItem,
        gate: &SourceGate,
        delay: Option<Duration>,
    ) -> ItemIngestion {
        let source = gate.id();
        let mut outcome = ItemIngestion::new(&item.id, source);

        self.ensure_canonical_key(item, &mut outcome).await;

        let observations = match gate.fetch_with_delay(&item.lookup(), delay).await {
            Ok(observations) => observations,
            Err(e) => {
                let kind = e.failure_kind();
                if kind.is_failure() {
                    warn!("{} fetch failed for {}: {}", source, item.id, e);
                } else {
                    debug!("{} not applicable to {}: {}", source, item.id, e);
                }
                outcome.outcome = ItemOutcome::FetchFailed {
                    kind,
                    message: e.to_string(),
                };
                return outcome;
            }
        };

        let mut persist_failed = false;
        let mut qualifying: Vec<RecordedObservation> = Vec::new();

        for observation in observations {
            let recorded = match self.record_observation(item, source, observation).await {
                Ok(recorded) => recorded,
                Err(e) => {
                    warn!("Failed to store {} event for {}: {}", source, item.id, e);
                    outcome.errors.push(format!("{}: {}", item.id, e));
                    persist_failed = true;
                    continue;
                }
            };
            outcome.events_recorded += 1;

            let is_outlier = recorded.event.is_outlier;
            let confidence = recorded.event.match_confidence;
            if is_outlier {
                outcome.outliers += 1;
            }

            if confidence >= self.thresholds.auto_match {
                outcome.matched = true;
                if !is_outlier {
                    qualifying.push(recorded);
                }
            } else if confidence >= self.thresholds.review_min {
                match self.review.enqueue(&recorded.event, &item.id, confidence).await {
                    Ok(true) => outcome.queued_for_review += 1,
                    Ok(false) => {}
                    Err(e) => {
                        outcome.errors.push(format!("{}: {}", item.id, e));
                        persist_failed = true;
                    }
                }
            }
        }

        let Some(candidate) = build_candidate(item, source, &qualifying) else {
            if persist_failed {
                outcome.outcome = ItemOutcome::PersistFailed;
            }
            return outcome;
        };

        outcome.outcome = match self.validator.validate(item, &candidate).await {
            Ok(ValidationOutcome::Updated(entry)) => ItemOutcome::Updated { price: entry.price },
            Ok(ValidationOutcome::Rejected { reason }) => ItemOutcome::Rejected { reason },
            Err(e) => {
                warn!("Failed to apply price for {}: {}", item.id, e);
                outcome.errors.push(format!("{}: {}", item.id, e));
                ItemOutcome::PersistFailed
            }
        };
        outcome
    }

    async fn ensure_canonical_key(&self, item: &MarketItem, outcome: &mut ItemIngestion) {
        if item.canonical_key.is_some() {
            return;
        }
        let Some(key) = item.derive_canonical_key() else {
            debug!("No canonical key derivable for {}", item.id);
            return;
        };
        match self.catalog.set_canonical_key(&item.id, &key).await {
            Ok(true) => debug!("Canonical key {} set for {}", key, item.id),
            Ok(false) => {}
            Err(e) => {
                warn!("Failed to store canonical key for {}: {}", item.id, e);
                outcome.errors.push(format!("{}: {}", item.id, e));
            }
        }
    }

    async fn record_observation(
        &self,
        item: &MarketItem,
        source: SourceId,
        observation: RawObservation,
    ) -> Result<RecordedObservation> {
        let now = Utc::now();
        let exact = exact_number_match(item, &observation);
        let confidence = self.scorer.score(&observation.title, &item.name, exact);
        let outlier_reason = self
            .outliers
            .check(&observation.title, observation.description.as_deref());

        let source_event_id = observation
            .source_event_id
            .clone()
            .unwrap_or_else(|| generate_event_id(now));

        let event = PriceEvent {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            source_event_id,
            payload: observation.payload.clone(),
            title: observation.title.clone(),
            price: observation.price,
            currency: observation.currency.clone(),
            event_type: observation.event_type,
            observed_at: observation.observed_at,
            market_item_id: (confidence >= self.thresholds.auto_match).then(|| item.id.clone()),
            match_confidence: confidence,
            is_outlier: outlier_reason.is_some(),
            outlier_reason,
            created_at: now,
            updated_at: now,
        };

        let stored = self.events.upsert_event(event).await?;
        debug!(
            "Recorded {}:{} for {} at {} (confidence {:.2}, outlier {})",
            stored.source,
            stored.source_event_id,
            item.id,
            stored.price,
            confidence,
            stored.is_outlier
        );

        Ok(RecordedObservation {
            event: stored,
            grades: observation.grades,
        })
    }
}

/// Median of the qualifying prices, with the grade set of the observation
/// carrying the most grades.
fn build_candidate(
    item: &MarketItem,
    source: SourceId,
    qualifying: &[RecordedObservation],
) -> Option<PriceCandidate> {
    let aggregate = aggregate_prices(qualifying.iter().map(|r| &r.event))?;
    let grades = qualifying
        .iter()
        .rev()
        .max_by_key(|r| r.grades.len())
        .map(|r| r.grades.clone())
        .unwrap_or_default();
    let currency = qualifying
        .first()
        .map(|r| r.event.currency.clone())
        .unwrap_or_else(|| item.currency.clone());

    Some(PriceCandidate {
        market_item_id: item.id.clone(),
        source,
        price: aggregate.median,
        currency,
        grades,
    })
}

/// Build the manual source for a trigger.
///
/// Missing titles default to the item name. Returns the ids that match no
/// selected item.
fn manual_source(
    observations: &[ManualObservation],
    items: &[MarketItem],
) -> (ManualSource, Vec<String>) {
    let names: HashMap<&str, &str> = items
        .iter()
        .map(|item| (item.id.as_str(), item.name.as_str()))
        .collect();

    let mut source = ManualSource::new();
    let mut unknown = Vec::new();
    for manual in observations {
        let Some(name) = names.get(manual.market_item_id.as_str()) else {
            unknown.push(manual.market_item_id.clone());
            continue;
        };
        let title = manual.title.clone().unwrap_or_else(|| name.to_string());
        let currency = manual.currency.clone().unwrap_or_else(|| "USD".to_string());
        let mut observation = RawObservation::sale(title, manual.price, currency);
        observation.source_event_id = manual.source_event_id.clone();
        observation.card_number = manual.card_number.clone();
        observation.observed_at = manual.observed_at;
        observation.payload = serde_json::json!({
            "marketItemId": manual.market_item_id,
            "price": manual.price.to_string(),
        });
        source.insert(manual.market_item_id.clone(), observation);
    }
    (source, unknown)
}
