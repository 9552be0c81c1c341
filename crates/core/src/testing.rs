//! In-memory fakes shared by the service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use cardprice_market_data::errors::SourceError;
use cardprice_market_data::{
    EventType, Game, Grade, ItemLookup, PriceSource, RateLimit, RawObservation,
    SourceCapabilities, SourceGate, SourceId, SupportedGames,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::audit::{AuditLogEntry, AuditLogRepositoryTrait};
use crate::catalog::{CatalogRepositoryTrait, ItemFilter, MarketItem, MarketItemGrade, RefreshFilter};
use crate::config::EngineConfig;
use crate::errors::{DatabaseError, Result};
use crate::ingestion::PriceEventIngestor;
use crate::matching::MatchScorer;
use crate::price_events::{PriceEvent, PriceEventRepositoryTrait};
use crate::pricing::{
    PriceHistoryEntry, PriceUpdate, PriceValidator, PriceWrite, PricingRepositoryTrait,
};
use crate::review::{MatchReviewEntry, ReviewQueueManager, ReviewRepositoryTrait, ReviewStatus};
use crate::scheduler::{RunLease, RunLeaseStore};
use crate::sources::SourceProvider;

#[derive(Default)]
struct State {
    items: BTreeMap<String, MarketItem>,
    events: Vec<PriceEvent>,
    history: Vec<PriceHistoryEntry>,
    grades: BTreeMap<(String, Grade), MarketItemGrade>,
    reviews: Vec<MatchReviewEntry>,
    audit: Vec<AuditLogEntry>,
    leases: HashMap<String, RunLease>,
    failing_price_items: HashSet<String>,
    fail_audit: bool,
}

/// Every repository trait over one shared in-memory state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_item(&self, item: MarketItem) {
        self.state().items.insert(item.id.clone(), item);
    }

    pub fn item(&self, id: &str) -> Option<MarketItem> {
        self.state().items.get(id).cloned()
    }

    pub fn events(&self) -> Vec<PriceEvent> {
        self.state().events.clone()
    }

    pub fn reviews(&self) -> Vec<MatchReviewEntry> {
        self.state().reviews.clone()
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.state().audit.clone()
    }

    /// Make every price write for `item_id` fail.
    pub fn fail_price_updates_for(&self, item_id: &str) {
        self.state().failing_price_items.insert(item_id.to_string());
    }

    pub fn fail_audit_writes(&self) {
        self.state().fail_audit = true;
    }

    /// Install a lease held by someone else until `expires_at`.
    pub fn hold_lease(&self, name: &str, holder: &str, expires_at: DateTime<Utc>) {
        self.state().leases.insert(
            name.to_string(),
            RunLease {
                name: name.to_string(),
                holder: holder.to_string(),
                expires_at,
            },
        );
    }
}

fn staleness_order(a: &MarketItem, b: &MarketItem) -> std::cmp::Ordering {
    a.price_updated_at
        .cmp(&b.price_updated_at)
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl CatalogRepositoryTrait for InMemoryStore {
    fn get_item(&self, item_id: &str) -> Result<Option<MarketItem>> {
        Ok(self.item(item_id))
    }

    fn list_items(&self, filter: &ItemFilter) -> Result<Vec<MarketItem>> {
        Ok(self
            .state()
            .items
            .values()
            .filter(|item| {
                filter
                    .category
                    .as_ref()
                    .map_or(true, |c| item.category.eq_ignore_ascii_case(c))
            })
            .filter(|item| filter.ids.as_ref().map_or(true, |ids| ids.contains(&item.id)))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    fn select_for_refresh(&self, filter: &RefreshFilter, limit: usize) -> Result<Vec<MarketItem>> {
        let state = self.state();
        let mut items: Vec<MarketItem> = state
            .items
            .values()
            .filter(|item| match filter {
                RefreshFilter::Priced => item.current_price.is_some_and(|p| p > Decimal::ZERO),
                RefreshFilter::InDemand { min_views } => {
                    item.is_trending || item.recent_view_count >= *min_views
                }
                RefreshFilter::ActivelyListed => item.active_listing_count > 0,
                RefreshFilter::StaleSince { cutoff } => {
                    item.price_updated_at.map_or(true, |at| at < *cutoff)
                }
                RefreshFilter::All => true,
            })
            .cloned()
            .collect();
        match filter {
            RefreshFilter::All => {
                items.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)))
            }
            _ => items.sort_by(staleness_order),
        }
        items.truncate(limit);
        Ok(items)
    }

    async fn set_canonical_key(&self, item_id: &str, key: &str) -> Result<bool> {
        let mut state = self.state();
        match state.items.get_mut(item_id) {
            Some(item) if item.canonical_key.is_none() => {
                item.canonical_key = Some(key.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn upsert_items(&self, items: Vec<MarketItem>) -> Result<usize> {
        let count = items.len();
        let mut state = self.state();
        for item in items {
            state.items.insert(item.id.clone(), item);
        }
        Ok(count)
    }
}

#[async_trait]
impl PriceEventRepositoryTrait for InMemoryStore {
    async fn upsert_event(&self, mut event: PriceEvent) -> Result<PriceEvent> {
        let mut state = self.state();
        if let Some(existing) = state
            .events
            .iter_mut()
            .find(|e| e.source == event.source && e.source_event_id == event.source_event_id)
        {
            event.id = existing.id.clone();
            event.created_at = existing.created_at;
            *existing = event.clone();
            return Ok(event);
        }
        state.events.push(event.clone());
        Ok(event)
    }

    fn get_by_source_event(
        &self,
        source: &str,
        source_event_id: &str,
    ) -> Result<Option<PriceEvent>> {
        Ok(self
            .state()
            .events
            .iter()
            .find(|e| e.source == source && e.source_event_id == source_event_id)
            .cloned())
    }

    fn list_for_item(&self, market_item_id: &str) -> Result<Vec<PriceEvent>> {
        let mut events: Vec<PriceEvent> = self
            .state()
            .events
            .iter()
            .filter(|e| e.market_item_id.as_deref() == Some(market_item_id))
            .cloned()
            .collect();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }
}

#[async_trait]
impl PricingRepositoryTrait for InMemoryStore {
    async fn apply_price_update(&self, update: &PriceUpdate) -> Result<PriceWrite> {
        let mut state = self.state();
        if state.failing_price_items.contains(&update.market_item_id) {
            return Err(DatabaseError::TransactionFailed("injected failure".to_string()).into());
        }
        let item = state
            .items
            .get_mut(&update.market_item_id)
            .ok_or_else(|| DatabaseError::NotFound(update.market_item_id.clone()))?;
        if item.current_price.filter(|p| *p > Decimal::ZERO) != update.previous_price {
            return Ok(PriceWrite::Stale {
                current: item.current_price,
            });
        }
        item.current_price = Some(update.new_price);
        item.currency = update.currency.clone();
        item.price_source = Some(update.source.clone());
        item.price_updated_at = Some(update.updated_at);
        item.updated_at = update.updated_at;

        let entry = PriceHistoryEntry {
            id: Uuid::new_v4().to_string(),
            market_item_id: update.market_item_id.clone(),
            price: update.new_price,
            previous_price: update.previous_price,
            percent_change: update.percent_change,
            currency: update.currency.clone(),
            source: update.source.clone(),
            recorded_at: update.updated_at,
        };
        state.history.push(entry.clone());

        for graded in &update.grades {
            state.grades.insert(
                (update.market_item_id.clone(), graded.grade),
                MarketItemGrade {
                    market_item_id: update.market_item_id.clone(),
                    grade: graded.grade,
                    price: graded.price,
                    currency: update.currency.clone(),
                    source: update.source.clone(),
                    updated_at: update.updated_at,
                },
            );
        }
        Ok(PriceWrite::Applied(entry))
    }

    fn history_for_item(&self, market_item_id: &str) -> Result<Vec<PriceHistoryEntry>> {
        Ok(self
            .state()
            .history
            .iter()
            .filter(|h| h.market_item_id == market_item_id)
            .cloned()
            .collect())
    }

    fn grades_for_item(&self, market_item_id: &str) -> Result<Vec<MarketItemGrade>> {
        Ok(self
            .state()
            .grades
            .values()
            .filter(|g| g.market_item_id == market_item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewRepositoryTrait for InMemoryStore {
    async fn insert_if_absent(&self, entry: MatchReviewEntry) -> Result<bool> {
        let mut state = self.state();
        if state
            .reviews
            .iter()
            .any(|r| r.price_event_id == entry.price_event_id)
        {
            return Ok(false);
        }
        state.reviews.push(entry);
        Ok(true)
    }

    fn list_pending(&self, limit: usize) -> Result<Vec<MatchReviewEntry>> {
        Ok(self
            .state()
            .reviews
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogRepositoryTrait for InMemoryStore {
    async fn insert_entry(&self, entry: AuditLogEntry) -> Result<()> {
        let mut state = self.state();
        if state.fail_audit {
            return Err(DatabaseError::QueryFailed("injected failure".to_string()).into());
        }
        state.audit.push(entry);
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>> {
        Ok(self.state().audit.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl RunLeaseStore for InMemoryStore {
    async fn try_acquire(&self, name: &str, holder: &str, ttl: chrono::Duration) -> Result<bool> {
        let now = Utc::now();
        let mut state = self.state();
        if let Some(lease) = state.leases.get(name) {
            if lease.holder != holder && !lease.is_expired(now) {
                return Ok(false);
            }
        }
        state.leases.insert(
            name.to_string(),
            RunLease {
                name: name.to_string(),
                holder: holder.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn release(&self, name: &str, holder: &str) -> Result<()> {
        let mut state = self.state();
        if state.leases.get(name).is_some_and(|l| l.holder == holder) {
            state.leases.remove(name);
        }
        Ok(())
    }

    fn current(&self, name: &str) -> Result<Option<RunLease>> {
        let now = Utc::now();
        Ok(self
            .state()
            .leases
            .get(name)
            .filter(|l| !l.is_expired(now))
            .cloned())
    }
}

/// Stored event with neutral defaults.
pub fn sample_event(source: &str, source_event_id: &str) -> PriceEvent {
    let now = Utc::now();
    PriceEvent {
        id: Uuid::new_v4().to_string(),
        source: source.to_string(),
        source_event_id: source_event_id.to_string(),
        payload: serde_json::json!({ "id": source_event_id }),
        title: "Charizard".to_string(),
        price: Decimal::new(5000, 2),
        currency: "USD".to_string(),
        event_type: EventType::Sale,
        observed_at: None,
        market_item_id: None,
        match_confidence: 0.8,
        is_outlier: false,
        outlier_reason: None,
        created_at: now,
        updated_at: now,
    }
}

/// Sale observation with a stable source event id.
pub fn observation(source_event_id: &str, title: &str, price: Decimal) -> RawObservation {
    let mut observation = RawObservation::sale(title, price, "USD");
    observation.source_event_id = Some(source_event_id.to_string());
    observation
}

enum Reply {
    Observations(Vec<RawObservation>),
    Status(u16),
    MissingIdentifiers,
}

/// Scriptable price source counting its calls.
pub struct MockSource {
    id: SourceId,
    games: SupportedGames,
    default_reply: Reply,
    replies: HashMap<String, Reply>,
    max_concurrency: usize,
    latency: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockSource {
    /// Source serving every game with no observations.
    pub fn new(id: SourceId) -> Self {
        Self {
            id,
            games: SupportedGames::All,
            default_reply: Reply::Observations(Vec::new()),
            replies: HashMap::new(),
            max_concurrency: 8,
            latency: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Declared concurrency limit, enforced by the gate.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Time each call takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn for_games(mut self, games: &'static [Game]) -> Self {
        self.games = SupportedGames::Only(games);
        self
    }

    /// Observations returned for every item without a specific reply.
    pub fn returning(mut self, observations: Vec<RawObservation>) -> Self {
        self.default_reply = Reply::Observations(observations);
        self
    }

    pub fn returning_for(mut self, item_id: &str, observations: Vec<RawObservation>) -> Self {
        self.replies
            .insert(item_id.to_string(), Reply::Observations(observations));
        self
    }

    /// Fail every call with the given HTTP status.
    pub fn failing(mut self, status: u16) -> Self {
        self.default_reply = Reply::Status(status);
        self
    }

    pub fn missing_identifiers(mut self) -> Self {
        self.default_reply = Reply::MissingIdentifiers;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls seen in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSource for MockSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities {
            games: self.games.clone(),
            structured_identifiers: false,
            graded_games: &[],
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60_000,
            max_concurrency: self.max_concurrency,
            min_delay: Duration::ZERO,
        }
    }

    async fn fetch_observations(
        &self,
        lookup: &ItemLookup,
    ) -> std::result::Result<Vec<RawObservation>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.replies.get(&lookup.item_id).unwrap_or(&self.default_reply) {
            Reply::Observations(observations) => Ok(observations.clone()),
            Reply::Status(status) => Err(SourceError::Http {
                source_id: self.id.to_string(),
                status: *status,
            }),
            Reply::MissingIdentifiers => Err(SourceError::InsufficientIdentifiers {
                source_id: self.id.to_string(),
                message: "no set code".to_string(),
            }),
        }
    }
}

/// Provider over a fixed set of sources; any other id is unconfigured.
#[derive(Default)]
pub struct StaticSources {
    gates: HashMap<SourceId, Arc<SourceGate>>,
}

impl StaticSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: PriceSource + 'static>(mut self, source: Arc<S>) -> Self {
        self.gates.insert(source.id(), Arc::new(SourceGate::new(source)));
        self
    }
}

impl SourceProvider for StaticSources {
    fn gate(&self, id: SourceId) -> std::result::Result<Arc<SourceGate>, SourceError> {
        self.gates
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::MissingCredential {
                source_id: id.to_string(),
                key: format!("CP_{}_KEY", id.as_str().to_uppercase()),
            })
    }
}

/// Scorer returning the same confidence for every pair.
pub struct FixedScorer(pub f64);

impl MatchScorer for FixedScorer {
    fn score(&self, _external_name: &str, _internal_name: &str, _exact_number: bool) -> f64 {
        self.0
    }
}

/// Ingestor wired to `store` with default thresholds.
pub fn ingestor(store: &InMemoryStore, sources: Arc<dyn SourceProvider>) -> PriceEventIngestor {
    ingestor_with_config(store, sources, &EngineConfig::default())
}

pub fn ingestor_with_config(
    store: &InMemoryStore,
    sources: Arc<dyn SourceProvider>,
    config: &EngineConfig,
) -> PriceEventIngestor {
    let shared = Arc::new(store.clone());
    let review = Arc::new(ReviewQueueManager::new(shared.clone()));
    let validator = Arc::new(PriceValidator::new(
        config.price_bounds.clone(),
        shared.clone(),
    ));
    PriceEventIngestor::new(shared.clone(), shared, review, validator, sources, config).unwrap()
}
